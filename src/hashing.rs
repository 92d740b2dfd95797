//! Hashing System - SHA-256 over canonical JSON
//!
//! Same bundle, same hash, regardless of map ordering.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::artifacts::ArtifactBundle;

pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}

/// Sorted keys, no whitespace
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    serde_json::to_string(&sort_value(v))
}

fn sort_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_value(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

pub fn compute_bundle_hash(bundle: &ArtifactBundle) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(bundle)?.as_bytes()))
}

/// job_hash = sha256(artifact_name:registry_version:canonical_payload:engine_version)
pub fn compute_job_hash(
    artifact_name: &str,
    registry_version: &str,
    payload: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!(
        "{}:{}:{}:{}",
        artifact_name,
        registry_version,
        canonical_json(payload)?,
        engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Artifact, ArtifactKind};
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let canonical = canonical_json(&json!({"z": 1, "a": {"y": 2, "b": 3}})).unwrap();
        assert_eq!(canonical, r#"{"a":{"b":3,"y":2},"z":1}"#);
    }

    #[test]
    fn test_bundle_hash_tracks_content() {
        let mut bundle = ArtifactBundle {
            markup: Some(Artifact::new(ArtifactKind::Markup, "Chip", "<span></span>")),
            ..Default::default()
        };
        let before = compute_bundle_hash(&bundle).unwrap();
        assert_eq!(before, compute_bundle_hash(&bundle.clone()).unwrap());

        bundle.update(ArtifactKind::Markup, |_| "<b></b>".to_string());
        assert_ne!(before, compute_bundle_hash(&bundle).unwrap());
        assert_eq!(before.len(), 64);
    }
}
