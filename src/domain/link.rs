//! Parsing of user-supplied dependency links and environment variables.
//!
//! Links take the form `[<owner-instance>.]<alias>:<dependency-instance>` and
//! environment variables `[<instance>:]<key>=<value>`. A missing owner or
//! target prefix means the root instance being started.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::error::DomainError;
use super::id::{Alias, InstanceName, IDENTIFIER_PATTERN};

const LINK_FORMAT: &str = "dependency links in the format [<parent-instance>.]<alias>:<dependency-instance>";
const ENV_FORMAT: &str = "environment variables in the format [<instance>:]<key>=<value>";

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?:(?P<owner>{id})\.)?(?P<alias>{id}):(?P<target>{id})$",
            id = IDENTIFIER_PATTERN
        );
        Regex::new(&pattern).expect("link pattern compiles")
    })
}

fn env_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?s)^(?:(?P<instance>{id}):)?(?P<key>[^=]+)=(?P<value>.*)$",
            id = IDENTIFIER_PATTERN
        );
        Regex::new(&pattern).expect("environment variable pattern compiles")
    })
}

/// Binding of a dependency alias to a concrete instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLink {
    /// Owning instance; `None` means the root instance.
    pub owner: Option<InstanceName>,
    pub alias: Alias,
    pub target: InstanceName,
}

impl DependencyLink {
    /// Parse a single link string.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedArgument`] when the string does not match.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let caps = link_regex()
            .captures(value)
            .ok_or_else(|| DomainError::MalformedArgument {
                argument: value.to_string(),
                expected: LINK_FORMAT,
            })?;

        Ok(Self {
            owner: caps.name("owner").map(|m| InstanceName::new(m.as_str())),
            alias: Alias::new(&caps["alias"]),
            target: InstanceName::new(&caps["target"]),
        })
    }

    /// Whether this link is owned by the root instance.
    #[must_use]
    pub fn is_root_owned(&self) -> bool {
        self.owner.is_none()
    }

    /// The owner, resolving `None` to `root`.
    #[must_use]
    pub fn owner_or<'a>(&'a self, root: &'a InstanceName) -> &'a InstanceName {
        self.owner.as_ref().unwrap_or(root)
    }
}

impl fmt::Display for DependencyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(owner) = &self.owner {
            write!(f, "{owner}.")?;
        }
        write!(f, "{}:{}", self.alias, self.target)
    }
}

/// Environment variable destined for one instance of the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVariable {
    /// Target instance; `None` means the root instance.
    pub instance: Option<InstanceName>,
    pub key: String,
    pub value: String,
}

impl EnvironmentVariable {
    /// Parse a single `[<instance>:]<key>=<value>` string.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedArgument`] when the string does not match.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let caps = env_regex()
            .captures(value)
            .ok_or_else(|| DomainError::MalformedArgument {
                argument: value.to_string(),
                expected: ENV_FORMAT,
            })?;

        Ok(Self {
            instance: caps.name("instance").map(|m| InstanceName::new(m.as_str())),
            key: caps["key"].to_string(),
            value: caps["value"].to_string(),
        })
    }
}

/// Parse every link, normalizing root-owned links and rejecting conflicts.
///
/// Nothing is returned unless every string parses. Identical duplicates are
/// collapsed onto the first occurrence; the output keeps input order.
///
/// # Errors
///
/// [`DomainError::MalformedArgument`] for the first malformed string, or
/// [`DomainError::ConflictingLink`] when an `(owner, alias)` pair is bound
/// to two different targets.
pub fn parse_links<S: AsRef<str>>(
    links: &[S],
    root: &InstanceName,
) -> Result<Vec<DependencyLink>, DomainError> {
    let mut parsed: Vec<DependencyLink> = Vec::with_capacity(links.len());

    for raw in links {
        let mut link = DependencyLink::parse(raw.as_ref())?;
        if link.owner.as_ref() == Some(root) {
            link.owner = None;
        }

        let existing = parsed
            .iter()
            .find(|l| l.owner == link.owner && l.alias == link.alias);
        match existing {
            Some(prev) if prev.target == link.target => continue,
            Some(prev) => {
                return Err(DomainError::ConflictingLink {
                    owner: link.owner_or(root).clone(),
                    alias: link.alias.clone(),
                    first: prev.target.clone(),
                    second: link.target.clone(),
                });
            }
            None => parsed.push(link),
        }
    }

    Ok(parsed)
}

/// Parse every environment variable, keeping input order.
///
/// A target prefix equal to `root` is normalized to the root scope.
///
/// # Errors
///
/// [`DomainError::MalformedArgument`] for the first malformed string.
pub fn parse_env_vars<S: AsRef<str>>(
    vars: &[S],
    root: &InstanceName,
) -> Result<Vec<EnvironmentVariable>, DomainError> {
    vars.iter()
        .map(|raw| {
            let mut var = EnvironmentVariable::parse(raw.as_ref())?;
            if var.instance.as_ref() == Some(root) {
                var.instance = None;
            }
            Ok(var)
        })
        .collect()
}
