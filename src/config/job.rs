use serde::Deserialize;

use crate::error::ReceiptError;
use crate::export::ExportFormat;
use crate::style::ReceiptStyle;
use crate::style::store::StoreType;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub output: String,
    pub count: usize,
    pub seed: u64,
    #[serde(default, deserialize_with = "deserialize_store_mix")]
    pub store_mix: StoreMix,
    /// Fixed printer style; `None` samples a style per receipt.
    #[serde(default, deserialize_with = "deserialize_style")]
    pub style: Option<ReceiptStyle>,
    pub rotation_degrees: Option<f64>,
    pub perspective: Option<f64>,
    /// `false` disables every augmentation effect for this job.
    pub augment: Option<bool>,
    pub export_formats: Option<Vec<ExportFormat>>,
}

/// Requested proportions of store types, as integer weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMix {
    pub weights: Vec<(StoreType, u32)>,
}

impl Default for StoreMix {
    /// Equal weights for every store type.
    fn default() -> Self {
        Self {
            weights: StoreType::ALL.iter().map(|&t| (t, 1)).collect(),
        }
    }
}

impl StoreMix {
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|&(_, w)| w as u64).sum()
    }
}

/// ストア構成文字列をパースする。
///
/// 形式: `"grocery:70, restaurant:20, retail:10"`。重みは整数で、合計が
/// 100である必要はない。同じストア種別の重複は加算される。
pub fn parse_store_mix(s: &str) -> crate::error::Result<StoreMix> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ReceiptError::config("Store mix cannot be empty"));
    }

    let mut weights: Vec<(StoreType, u32)> = Vec::new();
    for part in trimmed.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, weight_str) = part.split_once(':').ok_or_else(|| {
            ReceiptError::config(format!("Store mix entry '{part}' must look like 'grocery:70'"))
        })?;
        let store_type: StoreType = name.parse()?;
        let weight: u32 = weight_str.trim().parse().map_err(|_| {
            ReceiptError::config(format!("Invalid store mix weight: '{weight_str}'"))
        })?;

        match weights.iter_mut().find(|(t, _)| *t == store_type) {
            Some((_, w)) => *w = w.saturating_add(weight),
            None => weights.push((store_type, weight)),
        }
    }

    let mix = StoreMix { weights };
    if mix.total_weight() == 0 {
        return Err(ReceiptError::config(
            "Store mix weights must not all be zero",
        ));
    }
    Ok(mix)
}

/// serdeのdeserialize_withで使用するストア構成デシリアライザ
fn deserialize_store_mix<'de, D>(deserializer: D) -> Result<StoreMix, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_store_mix(&s).map_err(serde::de::Error::custom)
}

/// `dot-matrix` / `dot_matrix` の両表記を受け付けるスタイルデシリアライザ
fn deserialize_style<'de, D>(deserializer: D) -> Result<Option<ReceiptStyle>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|name| name.parse().map_err(serde::de::Error::custom))
        .transpose()
}
