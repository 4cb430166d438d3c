//! End-to-end run: load → index → merge → train → expand → project.
//!
//! Stages run strictly in order and the first failure ends the run. Both
//! quote tables are written only after they are fully computed, so an
//! error never leaves a truncated CSV behind.

use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::data::{DistanceIndex, load_tabular, merge, write_tabular};
use crate::error::{Error, Result, Stage};
use crate::quotes::{expand, project};
use crate::training::{GradientBoostedTrees, TrainingReport, train};
use crate::types::QuoteRecord;

/// Everything a run produced, besides the files it wrote.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub model: GradientBoostedTrees,
    pub report: TrainingReport,
    pub historical_quotes: Vec<QuoteRecord>,
    pub projected_quotes: Vec<QuoteRecord>,
}

/// Run the whole pipeline described by `config`.
pub fn run(config: &Config) -> Result<PipelineOutput> {
    let start = Instant::now();

    let freight = load_tabular(&config.freight_costs)?;
    let distances = load_tabular(&config.distances)?;
    tracing::info!(
        stage = Stage::Load.as_str(),
        freight_rows = freight.len(),
        distance_rows = distances.len(),
        elapsed = ?start.elapsed(),
        "loaded inputs"
    );

    let index = DistanceIndex::build(&distances);
    tracing::info!(
        stage = Stage::Load.as_str(),
        lanes = index.len(),
        origins = index.origins().len(),
        "built distance index"
    );

    let modeling = merge(&freight, &index);

    let train_start = Instant::now();
    let (model, report) = train(&modeling, &config.trainer)?;
    tracing::info!(
        stage = Stage::Training.as_str(),
        elapsed = ?train_start.elapsed(),
        "training finished"
    );

    let historical_quotes = expand(&model, &index, &config.target_destinations)?;
    write_output(&historical_quotes, &config.historical_quotes)?;

    let projected_quotes = project(&model, &historical_quotes, &index, config.horizon)?;
    write_output(&projected_quotes, &config.projected_quotes)?;

    tracing::info!(elapsed = ?start.elapsed(), "pipeline finished");

    Ok(PipelineOutput {
        model,
        report,
        historical_quotes,
        projected_quotes,
    })
}

/// Write a quote table, creating its directory first.
fn write_output(quotes: &[QuoteRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            stage: Stage::Write,
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_tabular(quotes, path)?;
    tracing::info!(
        stage = Stage::Write.as_str(),
        rows = quotes.len(),
        path = %path.display(),
        "wrote quotes"
    );
    Ok(())
}
