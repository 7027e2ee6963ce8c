// Per-receipt seed derivation: SHA-256(global seed || index) -> u64
//
// Every receipt in a batch owns an independent generator seeded from a pure
// function of the global seed and its index, so results do not depend on the
// order in which rayon schedules the work.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Random generator used for every sampling decision of a single receipt.
pub type ReceiptRng = ChaCha8Rng;

/// Domain tag mixed into the hash so that seeds derived here never collide
/// with other SHA-256 uses in the crate (receipt digests).
const SEED_DOMAIN: &[u8] = b"receipt_synth/seed/v1";

/// Derive the local seed of receipt `index` from the batch `global_seed`.
///
/// ハッシュ入力: `domain || global_seed (LE) || index (LE)`。
/// 先頭8バイトをリトルエンディアンの u64 として返す。
pub fn seed_for(global_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(SEED_DOMAIN);
    hasher.update(global_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

/// Build the generator for a local seed.
pub fn receipt_rng(local_seed: u64) -> ReceiptRng {
    ChaCha8Rng::seed_from_u64(local_seed)
}

/// Seed reserved for batch-level decisions (store type shuffling).
///
/// Uses `u64::MAX` as the index, which no receipt can have because batch
/// indices are bounded by `usize` counts far below it.
pub fn batch_seed(global_seed: u64) -> u64 {
    seed_for(global_seed, u64::MAX)
}
