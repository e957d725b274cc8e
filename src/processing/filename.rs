use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error parsing filename {key}: expected {prefix}<lowercase letters>_...")]
pub struct FilenameParseError {
    pub key: String,
    pub prefix: String,
}

/// Extracts the identity label from a reference image key.
///
/// The key must start with `prefix` (normally `reference/`), followed by one
/// or more lowercase ASCII letters and an underscore. Whatever follows the
/// underscore is ignored.
pub fn identity_from_key<'k>(key: &'k str, prefix: &str) -> Result<&'k str, FilenameParseError> {
    let fail = || FilenameParseError {
        key: key.to_string(),
        prefix: prefix.to_string(),
    };

    let rest = key.strip_prefix(prefix).ok_or_else(fail)?;
    let label_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_lowercase())
        .count();
    if label_len == 0 || rest.as_bytes().get(label_len) != Some(&b'_') {
        return Err(fail());
    }
    Ok(&rest[..label_len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("reference/alice_01.jpg", "alice")]
    #[case("reference/bob_1.png", "bob")]
    #[case("reference/carol_", "carol")]
    #[case("reference/dave_with_more_underscores.jpeg", "dave")]
    #[case("reference/x_Y.JPG", "x")]
    fn parses_label(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(identity_from_key(key, "reference/").unwrap(), expected);
    }

    #[rstest]
    #[case("reference/Bob_01.jpg")]
    #[case("input/alice_01.jpg")]
    #[case("reference/alice01.jpg")]
    #[case("reference/_01.jpg")]
    #[case("reference/ali3ce_01.jpg")]
    #[case("reference/")]
    #[case("")]
    #[case("nested/reference/alice_01.jpg")]
    #[case("reference/élodie_01.jpg")]
    fn rejects_key(#[case] key: &str) {
        let err = identity_from_key(key, "reference/").unwrap_err();
        assert_eq!(err.key, key);
    }

    #[test]
    fn error_names_the_key() {
        let err = identity_from_key("input/alice_01.jpg", "reference/").unwrap_err();
        assert!(err.to_string().contains("input/alice_01.jpg"));
    }

    #[test]
    fn follows_configured_prefix() {
        assert_eq!(identity_from_key("refs/alice_1.jpg", "refs/").unwrap(), "alice");
        let err = identity_from_key("reference/alice_1.jpg", "refs/").unwrap_err();
        assert_eq!(err.prefix, "refs/");
        assert!(err.to_string().contains("expected refs/"));
    }
}
