// Phase 11: ジョブ単位: 設定 -> ジェネレータ構築 -> バッチ実行 -> サマリ出力

use std::path::PathBuf;

use tracing::info;

use crate::config::merged::MergedConfig;
use crate::content::catalog::CatalogSource;
use crate::font::FontBook;
use crate::pipeline::batch::{BatchReport, BatchRequest, run_batch};
use crate::pipeline::generator::{GeneratorOptions, ReceiptGenerator};
use crate::pipeline::writer::ReceiptWriter;

/// Result of running a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub output_dir: PathBuf,
    pub report: BatchReport,
}

/// Run one job: generate `config.count` receipts into `config.output`.
///
/// Per-receipt failures end up in the report; only configuration and
/// summary I/O errors fail the job itself.
pub fn run_job(config: &MergedConfig, fonts: &FontBook) -> crate::error::Result<JobResult> {
    config.validate()?;

    let source = CatalogSource {
        currency_symbol: config.currency_symbol.clone(),
        ..CatalogSource::default()
    };
    let generator = ReceiptGenerator::new(GeneratorOptions::from(config), fonts, &source)?;
    let writer = ReceiptWriter::new(&config.output, config.export_formats.clone());

    info!(
        output = %config.output.display(),
        count = config.count,
        seed = config.seed,
        "starting job"
    );

    let request = BatchRequest {
        count: config.count,
        global_seed: config.seed,
        store_mix: config.store_mix.clone(),
        parallel_workers: config.parallel_workers,
    };
    let report = run_batch(&generator, &request, |receipt| {
        writer.write(receipt).map(|_| ())
    })?;
    writer.write_summary(&report)?;

    Ok(JobResult {
        output_dir: config.output.clone(),
        report,
    })
}

/// Run multiple jobs, collecting results.
/// One job failure does NOT prevent other jobs from running.
pub fn run_all_jobs(
    jobs: &[MergedConfig],
    fonts: &FontBook,
) -> Vec<crate::error::Result<JobResult>> {
    jobs.iter().map(|job| run_job(job, fonts)).collect()
}
