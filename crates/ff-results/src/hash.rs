//! Content-based hashing for run IDs.

use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn compute_run_id<S: Serialize>(
    network: &str,
    day: u16,
    run_type: &crate::types::RunType,
    settings: &S,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(network.as_bytes());
    hasher.update(day.to_le_bytes());

    let run_type_json = serde_json::to_string(run_type).unwrap_or_default();
    hasher.update(run_type_json.as_bytes());

    let settings_json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(settings_json.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

/// RFC 3339 timestamp for manifests.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunType;

    #[derive(Serialize)]
    struct Settings {
        base_frequency: f64,
    }

    #[test]
    fn hash_stability() {
        let run_type = RunType::Daily { steps: 48 };
        let settings = Settings { base_frequency: 50.0 };

        let hash1 = compute_run_id("Network_3_Urban_HPK11", 17, &run_type, &settings);
        let hash2 = compute_run_id("Network_3_Urban_HPK11", 17, &run_type, &settings);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let settings = Settings { base_frequency: 50.0 };
        let daily = RunType::Daily { steps: 48 };
        let snapshot = RunType::Snapshot {
            time: "15:30".to_string(),
        };

        let base = compute_run_id("Network_1_Rural_SMR8", 1, &daily, &settings);
        assert_ne!(base, compute_run_id("Network_1_Rural_SMR8", 2, &daily, &settings));
        assert_ne!(base, compute_run_id("Network_1_Rural_SMR8", 1, &snapshot, &settings));
        assert_ne!(
            base,
            compute_run_id("Network_1_Rural_SMR8", 1, &daily, &Settings { base_frequency: 60.0 })
        );
    }
}
