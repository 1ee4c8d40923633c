//! Seed digest canonicalization
//!
//! Computes stable SHA256 digests of seeds so re-imports can be recognized

use crate::seed::format::TaxonomySeed;
use sha2::{Digest, Sha256};

/// SHA256 over the canonical JSON form of the seed
///
/// YAML formatting and comments do not affect the digest; child order does.
pub fn compute_seed_digest(seed: &TaxonomySeed) -> String {
    let canonical = serde_json::to_vec(seed).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hex::encode(hasher.finalize())
}
