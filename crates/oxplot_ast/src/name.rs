//! Qualified names of tags and attributes.
use std::fmt::Display;

use crate::error::Error;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
/// A qualified name used for the names of tags and attributes.
pub struct QualName {
    /// The prefix (e.g. `xlink` of `xlink:href`) of a qualified name.
    prefix: Option<String>,
    /// The local name (e.g. the `href` of `xlink:href`) of a qualified name.
    local: String,
}

impl QualName {
    /// Creates a qualified name from a string, optionally seperating the
    /// prefix from a local-name with a `:`
    ///
    /// # Errors
    /// When either part is not a valid markup name
    pub fn parse(value: &str) -> Result<Self, Error> {
        let invalid = |reason| Error::InvalidElement {
            name: value.to_string(),
            reason,
        };
        let mut parts = value.split(':');
        let prefix_or_local = parts.next().unwrap_or_default();
        let maybe_local = parts.next();
        if parts.next().is_some() {
            return Err(invalid("more than one `:` was found"));
        }

        check_part(prefix_or_local).map_err(invalid)?;
        match maybe_local {
            Some(local) => {
                check_part(local).map_err(invalid)?;
                Ok(Self {
                    prefix: Some(prefix_or_local.to_string()),
                    local: local.to_string(),
                })
            }
            None => Ok(Self {
                prefix: None,
                local: prefix_or_local.to_string(),
            }),
        }
    }

    /// Returns the local part of the qualified name.
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Returns the prefix of the qualified name.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns whether the name is equal to the given `prefix:local` string, without allocating
    pub fn matches(&self, name: &str) -> bool {
        match &self.prefix {
            Some(prefix) => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local),
            None => name == self.local,
        }
    }
}

fn check_part(part: &str) -> Result<(), &'static str> {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return Err("names cannot be empty");
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err("names must start with a letter or `_`");
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))) {
        return Err("names may only contain letters, digits, `-`, `_`, or `.`");
    }
    Ok(())
}

impl Display for QualName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{p}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[test]
fn parse() -> Result<(), Error> {
    let href = QualName::parse("xlink:href")?;
    assert_eq!(href.prefix(), Some("xlink"));
    assert_eq!(href.local_name(), "href");
    assert_eq!(href.to_string(), "xlink:href");
    assert!(href.matches("xlink:href"));
    assert!(!href.matches("href"));
    assert!(!href.matches("xlinkhref"));

    let stroke = QualName::parse("stroke-width")?;
    assert_eq!(stroke.prefix(), None);
    assert!(stroke.matches("stroke-width"));
    Ok(())
}

#[test]
fn parse_rejects_malformed() {
    for name in ["", "1x", "a:b:c", "x:", "fill color", "<g>", "π"] {
        assert!(
            matches!(QualName::parse(name), Err(Error::InvalidElement { .. })),
            "`{name}` should be rejected"
        );
    }
}
