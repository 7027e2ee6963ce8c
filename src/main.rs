use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use receipt_synth::config::merged::MergedConfig;
use receipt_synth::config::{self};
use receipt_synth::font::FontBook;
use receipt_synth::pipeline::job_runner::run_all_jobs;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: receipt_synth <jobs.yaml>...");
        eprintln!("  Generate synthetic receipt images with token bounding boxes.");
        eprintln!("  settings.yaml next to each job file is loaded if present.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("receipt_synth {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut jobs: Vec<MergedConfig> = Vec::new();
    let mut system_fonts = false;

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file = match config::load_job_file(job_file_path) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        for job in &job_file.jobs {
            let mut merged = MergedConfig::new(&settings, job);
            merged.output = resolve_path(&job_dir, &job.output);
            if let Err(e) = merged.validate() {
                eprintln!("ERROR: Job {}: {e}", merged.output.display());
                return ExitCode::FAILURE;
            }
            system_fonts |= merged.system_fonts;
            jobs.push(merged);
        }
    }

    // フォント解決はプロセスで1回だけ
    let fonts = if system_fonts {
        FontBook::system()
    } else {
        FontBook::dot_matrix_only()
    };

    let results = run_all_jobs(&jobs, &fonts);

    let mut has_error = false;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(job_result) => {
                let report = &job_result.report;
                eprintln!(
                    "OK: {} ({} generated, {} failed)",
                    job_result.output_dir.display(),
                    report.generated.len(),
                    report.failures.len()
                );
                for failure in &report.failures {
                    eprintln!(
                        "  FAILED receipt {} [{}]: {}",
                        failure.index, failure.kind, failure.message
                    );
                }
                if !report.is_success() {
                    has_error = true;
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}: {e}", jobs[i].output.display());
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
