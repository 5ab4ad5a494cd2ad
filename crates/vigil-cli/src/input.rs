// crates/vigil-cli/src/input.rs
//
// Loading of schema, statistics, metrics and rule documents from disk.
// `.yaml`/`.yml` files are read as YAML, everything else as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {role} document {path}: {source}")]
    Read {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {role} document {path}: {detail}")]
    Parse {
        role: &'static str,
        path: PathBuf,
        detail: String,
    },
}

/// Identifies one input document in a report envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDigest {
    pub role: &'static str,
    pub path: String,
    /// Hex-encoded SHA-256 of the raw file bytes.
    pub sha256: String,
}

/// A parsed document together with its digest.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub digest: InputDigest,
}

/// Read and parse the document at `path`.
pub fn load<T: DeserializeOwned>(role: &'static str, path: &Path) -> Result<Loaded<T>, InputError> {
    let bytes = fs::read(path).map_err(|source| InputError::Read {
        role,
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |detail: String| InputError::Parse {
        role,
        path: path.to_path_buf(),
        detail,
    };
    let value = if is_yaml(path) {
        serde_yaml::from_slice(&bytes).map_err(|e| parse_error(e.to_string()))?
    } else {
        serde_json::from_slice(&bytes).map_err(|e| parse_error(e.to_string()))?
    };

    let digest = InputDigest {
        role,
        path: path.display().to_string(),
        sha256: hex::encode(Sha256::digest(&bytes)),
    };
    tracing::debug!(role, path = %digest.path, sha256 = %digest.sha256, "loaded input");

    Ok(Loaded { value, digest })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{FeatureType, Schema};

    fn temp_path(label: &str, extension: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vigil_input_{}_{}.{}", label, uuid::Uuid::now_v7(), extension))
    }

    #[test]
    fn test_json_and_yaml_load_the_same_schema() {
        let json_path = temp_path("schema", "json");
        fs::write(
            &json_path,
            r#"{"features": [{"name": "age", "feature_type": "numeric", "presence": {"required": true}}]}"#,
        )
        .unwrap();

        let yaml_path = temp_path("schema", "yaml");
        fs::write(
            &yaml_path,
            "features:\n  - name: age\n    feature_type: numeric\n    presence:\n      required: true\n",
        )
        .unwrap();

        let from_json: Loaded<Schema> = load("schema", &json_path).unwrap();
        let from_yaml: Loaded<Schema> = load("schema", &yaml_path).unwrap();
        assert_eq!(from_json.value, from_yaml.value);
        assert_eq!(from_json.value.feature("age").unwrap().feature_type, FeatureType::Numeric);

        fs::remove_file(&json_path).unwrap();
        fs::remove_file(&yaml_path).unwrap();
    }

    #[test]
    fn test_digest_is_sha256_of_bytes() {
        let path = temp_path("digest", "json");
        fs::write(&path, "[]").unwrap();
        let loaded: Loaded<Vec<u32>> = load("rules", &path).unwrap();
        assert_eq!(
            loaded.digest.sha256,
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
        assert_eq!(loaded.digest.role, "rules");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_reports_role_and_path() {
        let path = temp_path("absent", "json");
        let err = load::<Schema>("schema", &path).unwrap_err();
        assert!(matches!(err, InputError::Read { role: "schema", .. }));
        assert!(err.to_string().contains("schema document"));
    }

    #[test]
    fn test_parse_failure() {
        let path = temp_path("broken", "json");
        fs::write(&path, "{not json").unwrap();
        let err = load::<Schema>("schema", &path).unwrap_err();
        assert!(matches!(err, InputError::Parse { .. }));
        fs::remove_file(&path).unwrap();
    }
}
