use crate::error::{CliError, Result};
use nanoscout::core::models::prediction::PredictionRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct PredictionRow<'a> {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Compound Composition")]
    composition: String,
    #[serde(rename = "Crystal Structure")]
    crystal_structure: &'a str,
    #[serde(rename = "Temperature")]
    temperature: f64,
    #[serde(rename = "Pressure")]
    pressure: f64,
    #[serde(rename = "Lattice Parameter")]
    lattice_parameter: f64,
    #[serde(rename = "Band Gap")]
    band_gap: f64,
    #[serde(rename = "Conductivity Value")]
    conductivity_value: f64,
    #[serde(rename = "Conductivity")]
    conductivity: &'a str,
    #[serde(rename = "Score")]
    score: f64,
}

impl<'a> PredictionRow<'a> {
    fn new(rank: usize, prediction: &'a PredictionRecord) -> Self {
        Self {
            rank,
            composition: prediction.composition.to_string(),
            crystal_structure: prediction.structure.label(),
            temperature: prediction.conditions.temperature,
            pressure: prediction.conditions.pressure,
            lattice_parameter: prediction.conditions.lattice_parameter,
            band_gap: prediction.band_gap,
            conductivity_value: prediction.conductivity_value,
            conductivity: prediction.conductivity.as_str(),
            score: prediction.score,
        }
    }
}

/// Renders the ranked predictions as a fixed-width text table.
pub fn format_ranking(predictions: &[PredictionRecord], top: Option<usize>) -> String {
    let limit = top.unwrap_or(predictions.len()).min(predictions.len());
    let composition_width = predictions
        .iter()
        .take(limit)
        .map(|p| p.composition.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Composition".len());

    let mut lines = vec![format!(
        "{:>4}  {:<cw$}  {:<12}  {:>13}  {:<12}  {:>8}",
        "Rank",
        "Composition",
        "Structure",
        "Band Gap (eV)",
        "Conductivity",
        "Score",
        cw = composition_width
    )];
    lines.extend(predictions.iter().take(limit).enumerate().map(|(index, prediction)| {
        format!(
            "{:>4}  {:<cw$}  {:<12}  {:>13.3}  {:<12}  {:>8.3}",
            index + 1,
            prediction.composition.to_string(),
            prediction.structure.label(),
            prediction.band_gap,
            prediction.conductivity.as_str(),
            prediction.score,
            cw = composition_width
        )
    }));
    if limit < predictions.len() {
        lines.push(format!("... {} more", predictions.len() - limit));
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Writes every ranked prediction to a CSV file using the dataset's column names.
pub fn write_predictions_csv(path: &Path, predictions: &[PredictionRecord]) -> Result<()> {
    let to_output_error = |source: csv::Error| CliError::Output {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(to_output_error)?;
    for (index, prediction) in predictions.iter().enumerate() {
        writer
            .serialize(PredictionRow::new(index + 1, prediction))
            .map_err(to_output_error)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} prediction(s) to '{}'.",
        predictions.len(),
        path.display()
    );
    Ok(())
}
