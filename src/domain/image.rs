//! Image references and the dependency metadata packaged inside images.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{Alias, IDENTIFIER_PATTERN};

/// Registry used when an image reference does not name one.
pub const DEFAULT_REGISTRY: &str = "registry.hub.cellmesh.io";

const IMAGE_FORMAT: &str = "[<registry>/]<organization>/<image-name>:<version>";

fn image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?:(?P<registry>[a-z0-9]+(?:[-.][a-z0-9]+)*(?::[0-9]+)?)/)?(?P<org>{id})/(?P<name>{id}):(?P<version>[0-9]+\.[0-9]+\.[0-9]+)$",
            id = IDENTIFIER_PATTERN
        );
        Regex::new(&pattern).expect("image pattern compiles")
    })
}

/// Fully-qualified reference to a packaged image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    registry: String,
    organization: String,
    name: String,
    version: String,
}

impl ImageReference {
    /// Parse `[<registry>/]<organization>/<image-name>:<version>`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedArgument`] when the string does not match.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let caps = image_regex()
            .captures(value)
            .ok_or_else(|| DomainError::MalformedArgument {
                argument: value.to_string(),
                expected: IMAGE_FORMAT,
            })?;

        Ok(Self {
            registry: caps
                .name("registry")
                .map_or(DEFAULT_REGISTRY, |m| m.as_str())
                .to_string(),
            organization: caps["org"].to_string(),
            name: caps["name"].to_string(),
            version: caps["version"].to_string(),
        })
    }

    /// Reference to an image by identity in the default registry.
    #[must_use]
    pub fn from_identity(identity: &ImageIdentity) -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            organization: identity.organization.clone(),
            name: identity.name.clone(),
            version: identity.version.clone(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &str {
        &self.registry
    }

    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The `(organization, name, version)` triple of this reference.
    #[must_use]
    pub fn identity(&self) -> ImageIdentity {
        ImageIdentity::new(&self.organization, &self.name, &self.version)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}:{}",
            self.registry, self.organization, self.name, self.version
        )
    }
}

impl FromStr for ImageReference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Registry-independent identity of an image.
///
/// Two instances running the same identity are equivalent for sharing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageIdentity {
    #[serde(rename = "org")]
    pub organization: String,
    pub name: String,
    pub version: String,
}

impl ImageIdentity {
    pub fn new(
        organization: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.organization, self.name, self.version)
    }
}

/// Dependency metadata packaged inside an image (`metadata.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(rename = "org")]
    pub organization: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<Alias, ImageMetadata>,
}

impl ImageMetadata {
    #[must_use]
    pub fn identity(&self) -> ImageIdentity {
        ImageIdentity::new(&self.organization, &self.name, &self.version)
    }

    /// Whether the image declares a dependency under `alias`.
    #[must_use]
    pub fn declares(&self, alias: &Alias) -> bool {
        self.dependencies.contains_key(alias)
    }
}
