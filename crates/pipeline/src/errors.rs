//! Top-level error type for the generation pipeline domain.
//!
//! [`PageGenError`] covers conditions that halt a run. Component-level errors
//! (snapshot capture, generation transport, storage) are defined beside their
//! port traits in [`crate::ports`] and converted here when they become fatal.
//!
//! Recoverable conditions never appear in this type: a capture failure is
//! absorbed into an empty snapshot and a declined overwrite is a
//! [`crate::SaveOutcome::Skipped`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ArtifactBaseName, ArtifactPath};

/// Errors that halt a generation run.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageGenError {
    /// The operator-supplied address cannot yield a valid target descriptor.
    ///
    /// Produced before any remote call is made.
    #[error("Invalid target '{address}': {reason}")]
    InvalidTarget {
        /// The address as supplied.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An instruction-driven suite was requested with a blank instruction.
    #[error("Instruction must not be empty")]
    EmptyInstruction,

    /// The generation service failed. No partial artifact is written.
    #[error("Generation failed: {message}")]
    GenerationFailed {
        /// Description of the transport or service failure.
        message: String,
    },

    /// The page abstraction exposes no public asynchronous operations, so a
    /// capability-driven suite cannot be specified.
    #[error("No public async methods found in {base_name}; cannot generate a test suite")]
    NoCapabilities {
        /// The class that was scanned.
        base_name: ArtifactBaseName,
    },

    /// An instruction-driven suite calls operations the page abstraction does
    /// not expose. The suite is not written.
    #[error("Generated suite references unknown methods: {}", names.join(", "))]
    UnknownCapabilityReference {
        /// Referenced names absent from the capability set, in first-seen order.
        names: Vec<String>,
    },

    /// Suite-only mode found no page abstraction to derive capabilities from.
    #[error("Page abstraction not found at {path}")]
    ArtifactMissing {
        /// Where the page abstraction was expected.
        path: ArtifactPath,
    },

    /// Persisting or reading an artifact failed.
    #[error("Storage error at {path}: {message}")]
    Storage {
        /// The artifact path being accessed.
        path: String,
        /// Underlying failure.
        message: String,
    },

    /// The rule configuration or runtime configuration is invalid.
    ///
    /// Produced at load time; a run never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}
