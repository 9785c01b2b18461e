//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern shared by instance names, aliases, organizations and image names.
pub const IDENTIFIER_PATTERN: &str = "[a-z0-9]+(?:-[a-z0-9]+)*";

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{IDENTIFIER_PATTERN}$")).expect("identifier pattern compiles")
    })
}

/// Returns true when `value` is a well-formed identifier.
#[must_use]
pub fn is_identifier(value: &str) -> bool {
    identifier_regex().is_match(value)
}

/// Name of a running (or to-be-started) instance - newtype for type safety.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceName(String);

impl InstanceName {
    /// Create a new `InstanceName` from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the instance name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name given to a dependency started on behalf of this instance.
    #[must_use]
    pub fn dependency(&self, alias: &Alias) -> Self {
        Self(format!("{}-{}", self.0, alias.as_str()))
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstanceName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for InstanceName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Local name an image gives to one of its declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alias(String);

impl Alias {
    /// Create a new `Alias` from a string.
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    /// Get the alias as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Alias {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Alias {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::borrow::Borrow<str> for Alias {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_accept_kebab_case() {
        assert!(is_identifier("hr"));
        assert!(is_identifier("people-hr-inst"));
        assert!(is_identifier("v2"));
    }

    #[test]
    fn identifiers_reject_other_shapes() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("-hr"));
        assert!(!is_identifier("hr-"));
        assert!(!is_identifier("Hr"));
        assert!(!is_identifier("hr_inst"));
        assert!(!is_identifier("a..b"));
    }

    #[test]
    fn dependency_name_joins_parent_and_alias() {
        let parent = InstanceName::new("hr-inst");
        assert_eq!(
            parent.dependency(&Alias::new("employee")).as_str(),
            "hr-inst-employee"
        );
    }
}
