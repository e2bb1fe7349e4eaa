//! Core domain for the page-object generation pipeline.
//!
//! This crate contains every domain concept used to turn a live web page into a
//! page-abstraction module and a test suite: naming and addressing, the rule
//! configuration, specification construction, post-processing of generated
//! source, the storage layout, and the port traits infrastructure crates
//! implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RegistrableName`, `ArtifactBaseName`, etc.) |
//! | [`target`] | `TargetDescriptor` derivation and the canonical host sanitizer |
//! | [`types`] | Shared value types (`StructuralSnapshot`, `GeneratedArtifact`, etc.) |
//! | [`rules`] | Immutable rule configuration |
//! | [`prompts`] | Specification builder |
//! | [`postprocess`] | Import normalization and capability extraction |
//! | [`layout`] | Deterministic storage paths |
//! | [`ports`] | Collaborator traits and their component errors |
//! | [`errors`] | Run-halting error type |

pub mod errors;
pub mod identifiers;
pub mod layout;
pub mod ports;
pub mod postprocess;
pub mod prompts;
pub mod rules;
pub mod target;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::PageGenError;
pub use identifiers::{
    ArtifactBaseName, ArtifactPath, CapabilityName, PipelineRunId, RegistrableName,
    PAGE_ROLE_SUFFIX,
};
pub use ports::{
    AlwaysConfirm, AlwaysDecline, ArtifactStore, Confirmer, GenerationError, GenerationService,
    SnapshotError, SnapshotSource, StoreError,
};
pub use prompts::SpecificationBuilder;
pub use rules::{RuleConfiguration, RuleSections};
pub use target::TargetDescriptor;
pub use types::{
    ArtifactRole, CapabilityNameSet, GeneratedArtifact, RunReport, SaveOutcome, SnapshotStatus,
    Specification, SpecificationKind, StructuralSnapshot, Timestamp,
};
