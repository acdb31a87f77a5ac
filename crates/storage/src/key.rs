//! Object key validation.
//!
//! Object stores address objects by `/`-separated string keys regardless of
//! the host platform, so keys are validated as strings rather than through
//! [`std::path::Path`] components.

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a namespace (a `/`-separated key prefix).
///
/// Empty segments and `.` are dropped, `..` pops the previous segment but may
/// never escape the bucket root, and NUL bytes are rejected. The namespace
/// must contain at least one segment.
///
/// # Examples
///
/// ```
/// use vitrine_storage::validate_namespace;
/// assert_eq!(validate_namespace("files").unwrap(), "files");
/// assert_eq!(validate_namespace("/media//demos/").unwrap(), "media/demos");
/// assert_eq!(validate_namespace("media/../files").unwrap(), "files");
/// assert!(validate_namespace("../files").is_err());
/// assert!(validate_namespace("").is_err());
/// ```
pub fn validate_namespace(namespace: impl AsRef<str>) -> Result<String> {
    let raw = namespace.as_ref();
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidKey(raw.to_string()));
                }
            },
            s if s.contains('\0') => exn::bail!(ErrorKind::InvalidKey(raw.to_string())),
            s => segments.push(s),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidKey(raw.to_string())),
        false => Ok(segments.join("/")),
    }
}

/// Validates an object name: a single, non-empty key segment.
///
/// Names are used verbatim as the join key for display slots, so they are
/// never normalized; anything that would need normalizing is rejected.
pub fn validate_name(name: impl AsRef<str>) -> Result<String> {
    let name = name.as_ref();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        exn::bail!(ErrorKind::InvalidKey(name.to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("files", "files")]
    #[case("files/", "files")]
    #[case("/files", "files")]
    #[case("a//b//c", "a/b/c")]
    #[case("a/./b/./c", "a/b/c")]
    #[case("a/b/..", "a")]
    #[case("wrong/../still-wrong/.././correct//./demos/", "correct/demos")]
    fn test_valid_namespaces(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_namespace(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("./")]
    #[case("//")]
    #[case("..")]
    #[case("../files")]
    #[case("a/../../b")]
    #[case("a\0b")]
    fn test_invalid_namespaces(#[case] input: &str) {
        let err = validate_namespace(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidKey(_)));
    }

    #[rstest]
    #[case("Rabasorsogon.mp4")]
    #[case("demo a.mp4")]
    #[case(".hidden")]
    fn test_valid_names(#[case] input: &str) {
        assert_eq!(validate_name(input).unwrap(), input);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("nested/a.mp4")]
    #[case("a\0.mp4")]
    fn test_invalid_names(#[case] input: &str) {
        assert!(validate_name(input).is_err());
    }
}
