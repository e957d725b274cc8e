use std::path::PathBuf;
use std::str::FromStr;

/// Tunables of the matching pipeline, loaded from `FACEMATCH_*` environment
/// variables with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding the Pulumi project (default: iac).
    pub iac_dir: PathBuf,
    pub reference_prefix: String,
    pub input_prefix: String,
    /// Faces indexed per reference image; only the most prominent is kept.
    pub reference_max_faces: i32,
    pub input_max_faces: i32,
    /// Minimum similarity (0-100) for a detected face to match an indexed one.
    pub face_match_threshold: f32,
    /// Minimum similarity (0-100) for a matched face to resolve to a user.
    pub user_match_threshold: f32,
    pub association_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            iac_dir: PathBuf::from("iac"),
            reference_prefix: "reference/".to_string(),
            input_prefix: "input/".to_string(),
            reference_max_faces: 1,
            input_max_faces: 10,
            face_match_threshold: 90.0,
            user_match_threshold: 75.0,
            association_threshold: 75.0,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            iac_dir: lookup("FACEMATCH_IAC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.iac_dir),
            reference_prefix: lookup("FACEMATCH_REFERENCE_PREFIX")
                .unwrap_or(defaults.reference_prefix),
            input_prefix: lookup("FACEMATCH_INPUT_PREFIX").unwrap_or(defaults.input_prefix),
            reference_max_faces: positive(&lookup, "FACEMATCH_REFERENCE_MAX_FACES", defaults.reference_max_faces),
            input_max_faces: positive(&lookup, "FACEMATCH_INPUT_MAX_FACES", defaults.input_max_faces),
            face_match_threshold: parsed(&lookup, "FACEMATCH_FACE_MATCH_THRESHOLD", defaults.face_match_threshold),
            user_match_threshold: parsed(&lookup, "FACEMATCH_USER_MATCH_THRESHOLD", defaults.user_match_threshold),
            association_threshold: parsed(&lookup, "FACEMATCH_ASSOCIATION_THRESHOLD", defaults.association_threshold),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// The service refuses a face cap below 1.
fn positive(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: i32) -> i32 {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .filter(|n: &i32| *n >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        assert_eq!(Settings::from_lookup(|_| None), Settings::default());
    }

    #[test]
    fn overrides_and_bad_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FACEMATCH_INPUT_MAX_FACES", "5"),
            ("FACEMATCH_FACE_MATCH_THRESHOLD", "high"),
            ("FACEMATCH_IAC_DIR", "/srv/iac"),
        ]);
        let settings = Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.input_max_faces, 5);
        assert_eq!(settings.face_match_threshold, 90.0);
        assert_eq!(settings.iac_dir, PathBuf::from("/srv/iac"));
        assert_eq!(settings.reference_prefix, "reference/");
    }

    #[test]
    fn face_caps_must_be_positive() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FACEMATCH_REFERENCE_MAX_FACES", "0"),
            ("FACEMATCH_INPUT_MAX_FACES", "-3"),
        ]);
        let settings = Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.reference_max_faces, 1);
        assert_eq!(settings.input_max_faces, 10);
    }
}
