//! Shared value types for the generation pipeline domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the data flowing between stages: snapshots, specifications, generated
//! artifacts, and the outcome of persisting them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ArtifactPath, CapabilityName, PipelineRunId, RegistrableName};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The two kinds of generated artifact, each with its own storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    /// The page-abstraction class, stored under `pages/`.
    PageAbstraction,
    /// The test suite exercising the page abstraction, stored under `tests/`.
    TestSuite,
}

impl ArtifactRole {
    /// Literal top-level directory segment for this role.
    pub fn storage_root(self) -> &'static str {
        match self {
            Self::PageAbstraction => "pages",
            Self::TestSuite => "tests",
        }
    }
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageAbstraction => write!(f, "page abstraction"),
            Self::TestSuite => write!(f, "test suite"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Serialized structure of the rendered target page.
///
/// May be empty when capture failed; every consumer must accept that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSnapshot(String);

impl StructuralSnapshot {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// The degraded snapshot substituted after a capture failure.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// ---------------------------------------------------------------------------
// Specifications
// ---------------------------------------------------------------------------

/// Which builder produced a [`Specification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecificationKind {
    /// Produces the page-abstraction source.
    Artifact,
    /// Produces a test suite from a closed list of capability names.
    CapabilitySuite,
    /// Produces a test suite from free-form operator intent.
    InstructionSuite,
}

impl SpecificationKind {
    /// The artifact role the generated response will fill.
    pub fn produces(self) -> ArtifactRole {
        match self {
            Self::Artifact => ArtifactRole::PageAbstraction,
            Self::CapabilitySuite | Self::InstructionSuite => ArtifactRole::TestSuite,
        }
    }
}

/// A single text payload sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    kind: SpecificationKind,
    text: String,
}

impl Specification {
    pub(crate) fn new(kind: SpecificationKind, text: String) -> Self {
        Self { kind, text }
    }

    pub fn kind(&self) -> SpecificationKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free capability names recovered from a page abstraction.
///
/// Order is that of first appearance in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityNameSet(Vec<CapabilityName>);

impl CapabilityNameSet {
    /// Builds a set, keeping the first occurrence of each name.
    pub fn from_ordered(names: impl IntoIterator<Item = CapabilityName>) -> Self {
        let mut set = Self::default();
        for name in names {
            set.push(name);
        }
        set
    }

    /// Appends `name` unless it is already present. Returns whether it was added.
    pub fn push(&mut self, name: CapabilityName) -> bool {
        if self.contains(name.as_str()) {
            false
        } else {
            self.0.push(name);
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a CapabilityNameSet {
    type Item = &'a CapabilityName;
    type IntoIter = std::slice::Iter<'a, CapabilityName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Generated source text bound to its role, owner, and file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Page abstraction or test suite.
    pub role: ArtifactRole,
    /// Owning target; selects the storage directory.
    pub registrable_name: RegistrableName,
    /// File name within the role/target directory.
    pub file_name: String,
    /// Source text (already normalized for page abstractions).
    pub content: String,
}

/// Result of persisting one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// No file existed; it was created.
    Written { path: ArtifactPath },
    /// A file existed and the operator confirmed replacing it.
    Overwritten { path: ArtifactPath },
    /// A file existed and the operator declined; it was left untouched.
    Skipped { path: ArtifactPath },
}

impl SaveOutcome {
    pub fn path(&self) -> &ArtifactPath {
        match self {
            Self::Written { path } | Self::Overwritten { path } | Self::Skipped { path } => path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl std::fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Written { path } => write!(f, "written {path}"),
            Self::Overwritten { path } => write!(f, "overwritten {path}"),
            Self::Skipped { path } => write!(f, "skipped {path}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// How the structural snapshot for a run was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// The page was rendered and serialized.
    Captured,
    /// Capture failed; generation proceeded with an empty snapshot.
    Degraded,
    /// The run did not need a snapshot (suite-only mode), or stopped before
    /// capture.
    NotRequested,
}

/// Summary of one orchestrator run, returned to the composition root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: PipelineRunId,
    pub started_at: Timestamp,
    pub address: String,
    pub snapshot: SnapshotStatus,
    pub page: Option<SaveOutcome>,
    pub suite: Option<SaveOutcome>,
    pub capabilities: CapabilityNameSet,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
