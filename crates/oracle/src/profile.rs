use crate::error::ProfileError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_GENERAL: &str = include_str!("../../../profiles/general.json");
const BUILTIN_STRICT_API: &str = include_str!("../../../profiles/strict-api.json");
const BUILTIN_DATA_PIPELINE: &str = include_str!("../../../profiles/data-pipeline.json");
const BUILTIN_LIBRARY: &str = include_str!("../../../profiles/library.json");

pub const BUILTIN_PROFILE_NAMES: [&str; 4] = ["general", "strict-api", "data-pipeline", "library"];

const ALLOWED_KEYS: [&str; 4] = [
    "name",
    "description",
    "system_prompt_addendum",
    "strict_drift_severity",
];

type Result<T> = std::result::Result<T, ProfileError>;

/// Analysis policy: prompt guidance plus whether drift is escalated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub system_prompt_addendum: String,
    pub strict_drift_severity: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    name: Option<String>,
    description: Option<String>,
    system_prompt_addendum: Option<String>,
    strict_drift_severity: Option<bool>,
}

impl Profile {
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        let source = match name {
            "general" => BUILTIN_GENERAL,
            "strict-api" => BUILTIN_STRICT_API,
            "data-pipeline" => BUILTIN_DATA_PIPELINE,
            "library" => BUILTIN_LIBRARY,
            _ => return None,
        };
        match Self::from_bytes(name, source.as_bytes()) {
            Ok(profile) => Some(profile),
            Err(err) => {
                log::error!("Bundled profile {name} is malformed: {err}");
                None
            }
        }
    }

    /// Every bundled profile, in listing order.
    pub fn builtins() -> Vec<Self> {
        BUILTIN_PROFILE_NAMES
            .iter()
            .filter_map(|name| Self::builtin(name))
            .collect()
    }

    /// The name defaults to the file stem when the file does not set one.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let fallback = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("custom");
        Self::from_bytes(fallback, &bytes)
    }

    /// Parses JSON, falling back to TOML.
    pub fn from_bytes(fallback_name: &str, bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(fallback_name, bytes)?;
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        Ok(Self {
            name,
            description: raw.description.unwrap_or_default(),
            system_prompt_addendum: raw.system_prompt_addendum.unwrap_or_default(),
            strict_drift_severity: raw.strict_drift_severity.unwrap_or(false),
        })
    }
}

/// Resolves a builtin name, or else a path to a profile file.
pub fn load_profile(name_or_path: &str) -> Result<Profile> {
    if let Some(profile) = Profile::builtin(name_or_path) {
        return Ok(profile);
    }
    let path = Path::new(name_or_path);
    if path.is_file() {
        let profile = Profile::from_file(path)?;
        log::debug!("Loaded profile '{}' from {}", profile.name, path.display());
        return Ok(profile);
    }
    Err(ProfileError::Unknown {
        name: name_or_path.to_string(),
    })
}

fn parse_raw(name: &str, bytes: &[u8]) -> Result<RawProfile> {
    let malformed = |reason: String| ProfileError::Malformed {
        name: name.to_string(),
        reason,
    };
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 =
                std::str::from_utf8(bytes).map_err(|err| malformed(format!("{json_err}; {err}")))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                malformed(format!("{json_err}; TOML parse error: {toml_err}"))
            })?;
            serde_json::to_value(toml_value).map_err(|err| malformed(err.to_string()))?
        }
    };

    let serde_json::Value::Object(root) = &value else {
        return Err(malformed("profile must be an object".to_string()));
    };
    let unknown: Vec<String> = root
        .keys()
        .filter(|key| !ALLOWED_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ProfileError::UnknownKeys {
            name: name.to_string(),
            keys: unknown,
        });
    }

    serde_json::from_value(value).map_err(|err| malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn every_builtin_parses() {
        let profiles = Profile::builtins();
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, BUILTIN_PROFILE_NAMES.to_vec());
        for profile in &profiles {
            assert!(!profile.system_prompt_addendum.is_empty(), "{}", profile.name);
        }
    }

    #[test]
    fn escalation_flags() {
        let strict: Vec<bool> = Profile::builtins()
            .iter()
            .map(|p| p.strict_drift_severity)
            .collect();
        assert_eq!(strict, vec![false, true, true, false]);
    }

    #[test]
    fn unknown_name_lists_the_builtins() {
        let err = load_profile("paranoid").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"unknown profile "paranoid" (available: general, strict-api, data-pipeline, library)"#
        );
    }

    #[test]
    fn loads_toml_files_with_stem_as_default_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("team.toml");
        std::fs::write(
            &path,
            "system_prompt_addendum = \"Flag new cron jobs.\"\nstrict_drift_severity = true\n",
        )
        .unwrap();

        let profile = load_profile(path.to_str().unwrap()).unwrap();
        assert_eq!(profile.name, "team");
        assert_eq!(profile.system_prompt_addendum, "Flag new cron jobs.");
        assert!(profile.strict_drift_severity);
    }

    #[test]
    fn rejects_unknown_keys() {
        let bytes = br#"{ "name": "x", "strict": true, "addendum": "..." }"#;
        let err = Profile::from_bytes("x", bytes).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("addendum"), "{msg}");
        assert!(msg.contains("strict"), "{msg}");
    }

    #[test]
    fn rejects_garbage() {
        let err = Profile::from_bytes("x", b"[not valid").unwrap_err();
        assert!(matches!(err, ProfileError::Malformed { .. }), "{err}");

        let err = Profile::from_bytes("x", b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("must be an object"), "{err}");
    }
}
