//! Templates embedded into the binary at compile time using
//! [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;

/// Name of the template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "page.html";

#[derive(Embed)]
#[folder = "../../assets/templates/"]
pub struct Builtins;
impl Builtins {
    /// Template source for a builtin template by name.
    pub fn load(name: impl AsRef<str>) -> Result<String> {
        let name = name.as_ref().trim().trim_start_matches("builtin:");
        let data = Self::get(name)
            .map(|f| f.data)
            .ok_or_raise(|| ErrorKind::TemplateNotFound(format!("builtin:{name}")))?;
        String::from_utf8(data.into_owned()).or_raise(|| ErrorKind::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_default_template() {
        let source = Builtins::load(DEFAULT_TEMPLATE).unwrap();
        assert!(source.contains("<html"));
        assert_eq!(Builtins::load("builtin:page.html").unwrap(), source);
    }

    #[test]
    fn test_missing_builtin() {
        let err = Builtins::load("nope.html").unwrap_err();
        assert_eq!(*err, ErrorKind::TemplateNotFound("builtin:nope.html".into()));
    }
}
