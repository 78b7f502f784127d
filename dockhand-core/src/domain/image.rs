//! Image reference domain type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag used when the invoker does not supply one
pub const DEFAULT_TAG: &str = "latest";

/// A registry-qualified image name and its tag
///
/// The tag is taken as given; no validation is performed on its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub name: String,
    pub tag: String,
}

impl ImageRef {
    /// Creates an image reference, defaulting the tag to `latest`
    ///
    /// # Arguments
    /// * `name` - Registry-qualified image name (e.g. `registry.example.com/team/app`)
    /// * `tag` - Optional tag supplied by the invoker
    pub fn new(name: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.unwrap_or_else(|| DEFAULT_TAG.to_string()),
        }
    }

    /// Full `name:tag` reference as passed to the container engine
    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// Error returned when a `name[:tag]` string has no name part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseImageRefError(String);

impl fmt::Display for ParseImageRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid image reference '{}': missing name", self.0)
    }
}

impl std::error::Error for ParseImageRefError {}

impl FromStr for ImageRef {
    type Err = ParseImageRefError;

    /// Parses `name[:tag]`
    ///
    /// A colon before the last `/` belongs to a registry port, so
    /// `localhost:5000/app` parses as name `localhost:5000/app`, tag `latest`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let path_start = input.rfind('/').map(|i| i + 1).unwrap_or(0);

        let (name, tag) = match input[path_start..].rfind(':') {
            Some(i) => {
                let split = path_start + i;
                (&input[..split], Some(input[split + 1..].to_string()))
            }
            None => (input, None),
        };

        if name.is_empty() {
            return Err(ParseImageRefError(input.to_string()));
        }

        Ok(Self::new(name, tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_defaults_to_latest() {
        let image = ImageRef::new("registry.example.com/app", None);
        assert_eq!(image.tag, "latest");
        assert_eq!(image.reference(), "registry.example.com/app:latest");
    }

    #[test]
    fn test_explicit_tag_is_kept_verbatim() {
        let image = ImageRef::new("app", Some("v2".to_string()));
        assert_eq!(image.to_string(), "app:v2");

        // No validation of tag content
        let odd = ImageRef::new("app", Some("not a valid tag!".to_string()));
        assert_eq!(odd.reference(), "app:not a valid tag!");
    }

    #[test]
    fn test_parse_name_and_tag() {
        let image: ImageRef = "ghcr.io/org/server:v2".parse().unwrap();
        assert_eq!(image.name, "ghcr.io/org/server");
        assert_eq!(image.tag, "v2");
    }

    #[test]
    fn test_parse_registry_port_is_not_a_tag() {
        let image: ImageRef = "localhost:5000/server".parse().unwrap();
        assert_eq!(image.name, "localhost:5000/server");
        assert_eq!(image.tag, "latest");

        let tagged: ImageRef = "localhost:5000/server:dev".parse().unwrap();
        assert_eq!(tagged.name, "localhost:5000/server");
        assert_eq!(tagged.tag, "dev");
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        assert!("".parse::<ImageRef>().is_err());
        assert!(":v1".parse::<ImageRef>().is_err());
    }
}
