use crate::cli::InspectArgs;
use crate::error::Result;
use itertools::Itertools;
use nanoscout::core::io::dataset;
use nanoscout::core::models::composition::Composition;
use nanoscout::core::models::conductivity::Conductivity;
use nanoscout::core::models::record::{RawRecord, dedup_records};
use nanoscout::core::vocabulary::ElementVocabulary;
use nanoscout::engine::error::EngineError;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Inspecting dataset '{}'.", args.dataset.display());

    let records = dataset::read_records(&args.dataset).map_err(EngineError::from)?;
    let rows_read = records.len();
    let records = dedup_records(records);
    let vocabulary = ElementVocabulary::extract(&records).map_err(EngineError::from)?;

    print!("{}", format_report(rows_read, &records, &vocabulary));
    Ok(())
}

fn format_report(rows_read: usize, records: &[RawRecord], vocabulary: &ElementVocabulary) -> String {
    let mut lines = vec![
        format!("Rows read:      {}", rows_read),
        format!("Unique rows:    {}", records.len()),
        format!(
            "Vocabulary ({}): {}",
            vocabulary.len(),
            vocabulary.elements().join(", ")
        ),
    ];

    lines.push(String::new());
    lines.push("Element frequency:".to_string());
    for element in vocabulary.elements() {
        let occurrences = records
            .iter()
            .filter(|r| {
                Composition::parse(&r.composition)
                    .map(|c| c.contains(element))
                    .unwrap_or(false)
            })
            .count();
        lines.push(format!("  {:<6} {}", element, occurrences));
    }

    lines.push(String::new());
    lines.push("Crystal structures:".to_string());
    for (label, count) in category_counts(records.iter().map(|r| r.crystal_structure.as_deref())) {
        lines.push(format!("  {:<14} {}", label, count));
    }

    lines.push(String::new());
    lines.push("Conductivity:".to_string());
    for (label, count) in category_counts(records.iter().map(|r| r.conductivity.as_deref())) {
        let marker = if label == MISSING_LABEL || Conductivity::from_name(&label).is_some() {
            ""
        } else {
            " (unrecognized)"
        };
        lines.push(format!("  {:<14} {}{}", label, count, marker));
    }

    lines.push(String::new());
    lines.push("Missing values:".to_string());
    let missing = [
        ("Temperature", records.iter().filter(|r| r.temperature.is_none()).count()),
        ("Pressure", records.iter().filter(|r| r.pressure.is_none()).count()),
        (
            "Lattice Parameter",
            records.iter().filter(|r| r.lattice_parameter.is_none()).count(),
        ),
        ("Band Gap", records.iter().filter(|r| r.band_gap.is_none()).count()),
    ];
    for (column, count) in missing {
        lines.push(format!("  {:<18} {}", column, count));
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

const MISSING_LABEL: &str = "(missing)";

fn category_counts<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<(String, usize)> {
    values
        .map(|v| v.map(str::trim).unwrap_or(MISSING_LABEL).to_string())
        .counts()
        .into_iter()
        .sorted_by(|(a_label, a_count), (b_label, b_count)| {
            b_count.cmp(a_count).then_with(|| a_label.cmp(b_label))
        })
        .collect()
}
