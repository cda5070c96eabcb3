//! Subcommand implementations.

use crate::config::CliConfig;
use crate::error::CliError;
use indicatif::{ProgressBar, ProgressStyle};
use macbeth::factor_runs;
use macbeth_data::{AssetReturnTable, ConsumptionFactors, NationalAccounts, read_asset_returns};
use macbeth_estimation::{Study, StudyReport};
use macbeth_output::{
    ExportFormat, PruningAnimation, ReportBuilder, ScatterConfig, SecondPassScatter, StudyExport,
    StudySummary,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths of the three national-accounts files.
#[derive(Debug, Clone)]
pub(crate) struct NipaPaths {
    pub(crate) consumption: PathBuf,
    pub(crate) population: PathBuf,
    pub(crate) price_index: PathBuf,
}

/// Where and how to write results.
#[derive(Debug, Clone)]
pub(crate) struct OutputOptions {
    pub(crate) dir: Option<PathBuf>,
    pub(crate) format: ExportFormat,
    pub(crate) markdown: bool,
}

fn load_factors(paths: &NipaPaths, config: &CliConfig) -> Result<ConsumptionFactors, CliError> {
    let accounts = NationalAccounts::from_csv(
        &paths.consumption,
        &paths.population,
        &paths.price_index,
        &config.columns,
    )?;
    Ok(accounts.factors(config.omega)?)
}

/// `macbeth factors`: print the consumption growth table.
pub(crate) fn factors(
    paths: &NipaPaths,
    config: &CliConfig,
    rows: usize,
    json: bool,
) -> Result<(), CliError> {
    let factors = load_factors(paths, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&factors)?);
        return Ok(());
    }

    println!();
    print!("{}", factors.head_table(rows));
    match factors.mean_filtered_growth() {
        Some(mean) => println!("\nAverage filtered growth rate: {mean:.6}"),
        None => println!("\nAverage filtered growth rate: n/a"),
    }
    Ok(())
}

/// `macbeth run`: the full study.
pub(crate) fn run(
    assets_path: &Path,
    paths: &NipaPaths,
    config: &CliConfig,
    output: &OutputOptions,
) -> Result<(), CliError> {
    let assets = read_asset_returns(assets_path)?;
    let factors = load_factors(paths, config)?;
    info!(
        assets = assets.n_assets(),
        periods = assets.n_periods(),
        years = factors.years.len(),
        omega = factors.omega,
        "inputs loaded"
    );

    let runs = factor_runs(&factors, &config.runs);
    let study = Study::new(config.study.clone());

    let pb = ProgressBar::new(runs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut reports = Vec::with_capacity(runs.len());
    for run in &runs {
        pb.set_message(run.label.clone());
        reports.push(study.run_one(&assets, run)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = StudyReport {
        config: config.study.clone(),
        runs: reports,
    };
    let summary = StudySummary::from_report(&report);
    if output.markdown {
        println!("{}", summary.to_markdown());
    } else {
        println!("{}", summary.to_ascii_table());
    }

    if let Some(dir) = &output.dir {
        let written = write_outputs(
            dir,
            output.format,
            &assets,
            &factors,
            &report,
            config,
        )?;
        for path in &written {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Plot data of one run.
#[derive(Debug, Serialize)]
struct RunPlots {
    label: String,
    second_pass: SecondPassScatter,
    ransac: SecondPassScatter,
    pruning: PruningAnimation,
}

impl RunPlots {
    fn from_report(
        report: &StudyReport,
        assets: &AssetReturnTable,
        config: &ScatterConfig,
    ) -> Vec<Self> {
        report
            .runs
            .iter()
            .map(|run| Self {
                label: run.label.clone(),
                second_pass: SecondPassScatter::from_premia(
                    &run.label,
                    &run.betas(),
                    assets,
                    &run.premia,
                    config,
                ),
                ransac: SecondPassScatter::from_robust(&run.robust, config),
                pruning: PruningAnimation::from_frames(&run.pruning, config),
            })
            .collect()
    }
}

fn write_outputs(
    dir: &Path,
    format: ExportFormat,
    assets: &AssetReturnTable,
    factors: &ConsumptionFactors,
    report: &StudyReport,
    config: &CliConfig,
) -> Result<Vec<PathBuf>, CliError> {
    let mut written = StudyExport::from_report(report).write_all(dir, format)?;

    let plots = RunPlots::from_report(report, assets, &config.scatter);
    let plots_path = dir.join("plots.json");
    std::fs::write(&plots_path, serde_json::to_string_pretty(&plots)?)?;
    written.push(plots_path);

    let envelope = ReportBuilder::new(report)
        .name("consumption-capm")
        .factors(factors)
        .build();
    let report_path = dir.join("report.json");
    envelope.write(&report_path)?;
    written.push(report_path);
    Ok(written)
}
