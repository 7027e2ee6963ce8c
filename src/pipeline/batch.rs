// Phase 9: バッチ単位: ストア種別の割り当て -> rayon並列生成 -> レポート集計

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::job::StoreMix;
use crate::error::ReceiptError;
use crate::pipeline::generator::{GeneratedReceipt, ReceiptGenerator};
use crate::seed::{batch_seed, receipt_rng, seed_for};
use crate::style::ReceiptStyle;
use crate::style::store::StoreType;

/// What to generate.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub count: usize,
    pub global_seed: u64,
    pub store_mix: StoreMix,
    /// 0 uses rayon's global pool.
    pub parallel_workers: usize,
}

/// One successfully generated receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub index: u64,
    pub receipt_id: String,
    pub seed: u64,
    pub store_type: StoreType,
    pub style: ReceiptStyle,
    pub width: u32,
    pub height: u32,
    pub tokens: usize,
    pub truncations: usize,
    pub digest: String,
}

/// One receipt that failed; the rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub index: u64,
    pub store_type: StoreType,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub global_seed: u64,
    pub requested: usize,
    /// Store types as allocated up front, before generation.
    pub allocated: BTreeMap<StoreType, usize>,
    /// Store types of the receipts that were generated.
    pub generated_by_store: BTreeMap<StoreType, usize>,
    pub generated: Vec<ReceiptSummary>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Assign a store type to each of `count` receipts.
///
/// 最大剰余法で整数の割り当て数を決め(同率はミックスの記述順)、その後
/// バッチシードでシャッフルする。実行順序に依存せず、割り当て数は正確。
pub fn allocate_store_types(
    mix: &StoreMix,
    count: usize,
    global_seed: u64,
) -> crate::error::Result<Vec<StoreType>> {
    let total = mix.total_weight() as u128;
    if total == 0 {
        return Err(ReceiptError::config("Store mix weights must not all be zero"));
    }

    let n = count as u128;
    let mut quotas: Vec<(StoreType, usize, u128)> = mix
        .weights
        .iter()
        .map(|&(t, w)| {
            let exact = n * w as u128;
            (t, (exact / total) as usize, exact % total)
        })
        .collect();

    let assigned: usize = quotas.iter().map(|q| q.1).sum();
    let mut leftover = count - assigned;

    let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
    // sort_by_key is stable: equal remainders keep mix order
    by_remainder.sort_by_key(|&i| std::cmp::Reverse(quotas[i].2));
    for i in by_remainder {
        if leftover == 0 {
            break;
        }
        if quotas[i].2 > 0 {
            quotas[i].1 += 1;
            leftover -= 1;
        }
    }

    let mut types: Vec<StoreType> = Vec::with_capacity(count);
    for (t, k, _) in &quotas {
        types.extend(std::iter::repeat_n(*t, *k));
    }

    let mut rng = receipt_rng(batch_seed(global_seed));
    types.shuffle(&mut rng);
    Ok(types)
}

/// Generate `request.count` receipts in parallel and hand each to `sink`.
///
/// Receipt `i` is generated from `seed_for(global_seed, i)`, so output does
/// not depend on scheduling. A failing receipt (generation or sink) is
/// recorded in the report and does not abort the batch.
pub fn run_batch<F>(
    generator: &ReceiptGenerator<'_>,
    request: &BatchRequest,
    sink: F,
) -> crate::error::Result<BatchReport>
where
    F: Fn(&GeneratedReceipt) -> crate::error::Result<()> + Sync,
{
    let store_types = allocate_store_types(&request.store_mix, request.count, request.global_seed)?;

    let produce = |index: usize| -> crate::error::Result<ReceiptSummary> {
        let index = index as u64;
        let store_type = store_types[index as usize];
        let local_seed = seed_for(request.global_seed, index);
        let receipt = generator.generate(index, local_seed, store_type)?;
        sink(&receipt)?;
        Ok(ReceiptSummary {
            index,
            receipt_id: receipt.record.receipt_id(),
            seed: local_seed,
            store_type,
            style: receipt.record.style,
            width: receipt.record.width,
            height: receipt.record.height,
            tokens: receipt.record.boxes.len(),
            truncations: receipt.record.truncations.len(),
            digest: receipt.digest()?,
        })
    };

    let results: Vec<crate::error::Result<ReceiptSummary>> = if request.parallel_workers > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(request.parallel_workers)
            .build()
            .map_err(|e| ReceiptError::config(format!("Failed to build thread pool: {e}")))?;
        pool.install(|| (0..request.count).into_par_iter().map(produce).collect())
    } else {
        (0..request.count).into_par_iter().map(produce).collect()
    };

    let mut report = BatchReport {
        global_seed: request.global_seed,
        requested: request.count,
        ..BatchReport::default()
    };
    for t in &store_types {
        *report.allocated.entry(*t).or_default() += 1;
    }

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(summary) => {
                *report.generated_by_store.entry(summary.store_type).or_default() += 1;
                report.generated.push(summary);
            }
            Err(e) => {
                warn!(index, kind = e.kind(), error = %e, "receipt failed");
                report.failures.push(BatchFailure {
                    index: index as u64,
                    store_type: store_types[index],
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        requested = report.requested,
        generated = report.generated.len(),
        failed = report.failures.len(),
        "batch finished"
    );
    Ok(report)
}
