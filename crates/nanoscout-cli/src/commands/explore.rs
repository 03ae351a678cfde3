use crate::cli::ExploreArgs;
use crate::config::PartialExplorationConfig;
use crate::error::Result;
use crate::output;
use crate::utils::progress::CliProgressHandler;
use nanoscout::engine::progress::ProgressReporter;
use nanoscout::workflows;
use tracing::{info, warn};

pub fn run(args: ExploreArgs) -> Result<()> {
    info!("Starting exploration on '{}'.", args.dataset.display());

    let partial = match &args.config {
        Some(path) => PartialExplorationConfig::from_file(path)?,
        None => PartialExplorationConfig::default(),
    };
    let config = partial.merge_with_cli(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = workflows::explore::run(&args.dataset, &config, &reporter)?;

    let summary = &result.summary;
    println!(
        "Trained on {} unique row(s) ({} read), {} element(s), {} feature(s).",
        summary.unique_rows, summary.rows_read, summary.vocabulary_size, summary.feature_width
    );
    println!(
        "Training ran {} epoch(s); best loss {:.5} at epoch {}{}.",
        result.history.epochs_run(),
        result.history.best_loss,
        result.history.best_epoch + 1,
        if result.history.stopped_early {
            " (stopped early)"
        } else {
            ""
        }
    );
    println!(
        "Conditions: T = {:.1}, P = {:.3}, lattice = {:.3}",
        result.conditions.temperature,
        result.conditions.pressure,
        result.conditions.lattice_parameter
    );
    println!();
    print!("{}", output::format_ranking(&result.predictions, args.top));

    if result.skipped > 0 {
        warn!(
            "{} composition(s) had no valid structure hypothesis and were skipped.",
            result.skipped
        );
    }

    if let Some(path) = &args.output {
        output::write_predictions_csv(path, &result.predictions)?;
        println!("\nPredictions written to '{}'.", path.display());
    }

    Ok(())
}
