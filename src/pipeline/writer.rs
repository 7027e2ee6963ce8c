// Phase 10: 出力: レシート単位のディレクトリをステージングしてからrenameで確定

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::export::annotation::{bbox_json, ground_truth_json};
use crate::export::{ExportFormat, export};
use crate::pipeline::batch::BatchReport;
use crate::pipeline::generator::GeneratedReceipt;

pub const IMAGE_FILE: &str = "image.png";
pub const GROUND_TRUTH_FILE: &str = "ground_truth.json";
pub const BBOX_FILE: &str = "bboxes.json";
pub const SUMMARY_FILE: &str = "generation_summary.json";

/// Writes receipts under `<output>/receipts/<receipt_id>/`.
#[derive(Debug, Clone)]
pub struct ReceiptWriter {
    output_dir: PathBuf,
    formats: Vec<ExportFormat>,
}

impl ReceiptWriter {
    pub fn new(output_dir: impl Into<PathBuf>, formats: Vec<ExportFormat>) -> Self {
        Self {
            output_dir: output_dir.into(),
            formats,
        }
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.output_dir.join("receipts")
    }

    pub fn receipt_dir(&self, receipt_id: &str) -> PathBuf {
        self.receipts_dir().join(receipt_id)
    }

    /// Write every file of one receipt. Either all files appear or none.
    ///
    /// Files are written into a hidden staging directory and renamed into
    /// place. An existing directory for the same id is moved aside first and
    /// deleted only once the new one is in place, so the id never goes
    /// missing.
    pub fn write(&self, receipt: &GeneratedReceipt) -> crate::error::Result<PathBuf> {
        let receipts_dir = self.receipts_dir();
        fs::create_dir_all(&receipts_dir)?;

        let id = receipt.record.receipt_id();
        let staging = receipts_dir.join(format!(".{id}.partial"));
        let retired = receipts_dir.join(format!(".{id}.old"));
        let target = receipts_dir.join(&id);

        for leftover in [&staging, &retired] {
            if leftover.exists() {
                fs::remove_dir_all(leftover)?;
            }
        }
        fs::create_dir(&staging)?;

        if let Err(e) = self.write_files(&staging, receipt) {
            // 部分的な出力は残さない
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        let replacing = target.exists();
        if replacing {
            fs::rename(&target, &retired)?;
        }
        if let Err(e) = fs::rename(&staging, &target) {
            // 旧ディレクトリを元に戻す
            if replacing {
                let _ = fs::rename(&retired, &target);
            }
            let _ = fs::remove_dir_all(&staging);
            return Err(e.into());
        }
        if replacing {
            fs::remove_dir_all(&retired)?;
        }
        debug!(receipt = %id, dir = %target.display(), replaced = replacing, "wrote receipt");
        Ok(target)
    }

    fn write_files(&self, dir: &Path, receipt: &GeneratedReceipt) -> crate::error::Result<()> {
        receipt
            .image
            .save_with_format(dir.join(IMAGE_FILE), image::ImageFormat::Png)?;
        fs::write(dir.join(GROUND_TRUTH_FILE), ground_truth_json(&receipt.record)?)?;
        fs::write(dir.join(BBOX_FILE), bbox_json(&receipt.record)?)?;
        for format in &self.formats {
            fs::write(dir.join(format.file_name()), export(&receipt.record, *format)?)?;
        }
        Ok(())
    }

    /// Write `generation_summary.json` at the output root.
    pub fn write_summary(&self, report: &BatchReport) -> crate::error::Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(SUMMARY_FILE);
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        Ok(path)
    }
}
