//! Newtype domain identifiers.
//!
//! Every naming concept in a generation run is represented as a distinct newtype
//! wrapping a `String`. This prevents accidentally interchanging, for example,
//! a [`RegistrableName`] (a storage-path segment) with an [`ArtifactBaseName`]
//! (a class identifier) even though both are strings under the hood.
//!
//! Constructors validate the invariant of each identifier and return `None`
//! when it does not hold, so an invalid value can never reach the
//! specification builder or the storage layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self> after `$check`, as_str(),
// Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident, $check:expr
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value violates
            /// the identifier's invariant.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let check: fn(&str) -> bool = $check;
                if check(&v) { Some(Self(v)) } else { None }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value.clone())
                    .ok_or_else(|| format!("invalid {}: {value:?}", stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

/// Role token appended to every derived page-abstraction class name.
pub const PAGE_ROLE_SUFFIX: &str = "Page";

fn is_registrable(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

fn is_class_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn is_member_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_relative_path(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('/')
}

// ---------------------------------------------------------------------------
// Identifiers — run correlation
// ---------------------------------------------------------------------------

/// Identifies a single generation run (one invocation of the orchestrator).
///
/// Generated fresh for every run; recorded on the run span and in the
/// [`crate::RunReport`] so all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — naming inputs
// ---------------------------------------------------------------------------

string_id! {
    /// The sanitized host portion of a target address (e.g. `"example.com"`).
    ///
    /// Only `[A-Za-z0-9._-]` may appear; it is used verbatim as a directory
    /// segment under both storage roles.
    RegistrableName, is_registrable
}

string_id! {
    /// PascalCase class name of a page-abstraction artifact
    /// (e.g. `"ExampleComPage"`).
    ///
    /// Letters and digits only, non-empty, starts with a letter.
    ArtifactBaseName, is_class_identifier
}

impl ArtifactBaseName {
    /// Returns the name with the trailing [`PAGE_ROLE_SUFFIX`] removed, if present.
    pub fn stem(&self) -> &str {
        self.0.strip_suffix(PAGE_ROLE_SUFFIX).unwrap_or(&self.0)
    }
}

string_id! {
    /// Name of a public asynchronous operation exposed by a page-abstraction
    /// artifact (e.g. `"enterUsername"`).
    CapabilityName, is_member_identifier
}

string_id! {
    /// A file-system path relative to the output root
    /// (e.g. `"pages/example.com/ExampleComPage.ts"`).
    ArtifactPath, is_relative_path
}

impl ArtifactPath {
    /// Joins path segments with `/`. Callers pass a non-empty first segment.
    pub(crate) fn from_segments(segments: &[&str]) -> Self {
        Self(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_base_name_rejects_non_identifiers() {
        assert!(ArtifactBaseName::new("ExampleComPage").is_some());
        assert!(ArtifactBaseName::new("").is_none());
        assert!(ArtifactBaseName::new("1Page").is_none());
        assert!(ArtifactBaseName::new("Example-Page").is_none());
        assert!(ArtifactBaseName::new("ExampléPage").is_none());
    }

    #[test]
    fn stem_strips_only_the_role_suffix() {
        let name = ArtifactBaseName::new("ExampleComPage").unwrap();
        assert_eq!(name.stem(), "ExampleCom");

        let bare = ArtifactBaseName::new("Landing").unwrap();
        assert_eq!(bare.stem(), "Landing");
    }

    #[test]
    fn capability_name_accepts_member_identifiers() {
        assert!(CapabilityName::new("enterUsername").is_some());
        assert!(CapabilityName::new("_private").is_some());
        assert!(CapabilityName::new("2fa").is_none());
        assert!(CapabilityName::new("submit()").is_none());
    }

    #[test]
    fn registrable_name_rejects_path_separators() {
        assert!(RegistrableName::new("meitav.viewtrade.com").is_some());
        assert!(RegistrableName::new("example.com/login").is_none());
        assert!(RegistrableName::new("").is_none());
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let ok: Result<CapabilityName, _> = serde_json::from_str("\"submit\"");
        assert!(ok.is_ok());
        let bad: Result<CapabilityName, _> = serde_json::from_str("\"not valid\"");
        assert!(bad.is_err());
    }
}
