//! Two distinct notions of "hash" used across the engine: a 64-bit
//! parameter fingerprint for in-process sub-result caching (§5), and a
//! SHA-256 content hash for on-disk file reproducibility (§6). Conflating
//! them would make the cache pay SHA-256 cost on every Jacobian lookup and
//! would make file provenance depend on hash-map iteration order, so they
//! stay separate.

use dsge_model::ParameterSet;
use sha2::{Digest, Sha256};
use std::hash::{Hash, Hasher};

/// 64-bit hash of a canonical (sorted-by-name) serialization of a parameter
/// set, used as the key into the sub-result cache (e.g. Jacobians evaluated
/// at a given parameter vector).
pub fn parameter_fingerprint(set: &ParameterSet) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for (name, parameter) in set.iter() {
        name.hash(&mut hasher);
        parameter.value.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// SHA-256 hex digest of raw file content, used to content-address
/// parameter and equation files for reproducibility (§6).
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsge_model::{Parameter, ParameterCategory};

    #[test]
    fn fingerprint_is_order_independent() {
        let mut a = ParameterSet::default();
        a.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));
        a.insert("alpha", Parameter::new(0.3, ParameterCategory::Technology));

        let mut b = ParameterSet::default();
        b.insert("alpha", Parameter::new(0.3, ParameterCategory::Technology));
        b.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));

        assert_eq!(parameter_fingerprint(&a), parameter_fingerprint(&b));
    }

    #[test]
    fn fingerprint_changes_with_value() {
        let mut a = ParameterSet::default();
        a.insert("beta", Parameter::new(0.995, ParameterCategory::Preference));
        let mut b = ParameterSet::default();
        b.insert("beta", Parameter::new(0.990, ParameterCategory::Preference));

        assert_ne!(parameter_fingerprint(&a), parameter_fingerprint(&b));
    }

    #[test]
    fn content_hash_is_deterministic_and_sensitive() {
        let h1 = content_hash(b"parameters.yaml contents");
        let h2 = content_hash(b"parameters.yaml contents");
        let h3 = content_hash(b"different contents");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 64);
    }
}
