//! Port traits for every collaborator the pipeline depends on.
//!
//! Infrastructure crates implement these; the orchestrator in `nodes` sees
//! only the traits. Each trait's component error lives beside it.

use async_trait::async_trait;
use thiserror::Error;

use crate::{ArtifactPath, GeneratedArtifact, SaveOutcome, Specification, StructuralSnapshot};

// ---------------------------------------------------------------------------
// Snapshot capture
// ---------------------------------------------------------------------------

/// Failure to render a target page. Always recoverable: the orchestrator
/// substitutes an empty snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The browsing engine could not be started.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Navigation to the address failed or timed out.
    #[error("navigation to {address} failed: {message}")]
    Navigation { address: String, message: String },

    /// The page loaded but its content could not be serialized.
    #[error("content serialization failed: {0}")]
    Content(String),
}

/// Renders an address in an isolated browsing context and serializes it.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Captures the rendered structure of `address`.
    ///
    /// Implementations must release the browsing context on every path.
    async fn capture(&self, address: &str) -> Result<StructuralSnapshot, SnapshotError>;
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Failure of the external generation service. Always fatal for the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No credentials were configured for the service.
    #[error("missing API credentials")]
    MissingCredentials,

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not contain generated text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Sends a specification to the generation service and returns its text
/// verbatim. No retry, no fallback.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn respond(&self, specification: &Specification) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Asks the operator a yes/no question.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every question with yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl Confirmer for AlwaysConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Answers every question with no.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecline;

#[async_trait]
impl Confirmer for AlwaysDecline {
    async fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Failure to read or write an artifact.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

/// Durable storage for generated artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `artifact` at its layout path, asking for confirmation before
    /// replacing an existing file. A declined overwrite is
    /// [`SaveOutcome::Skipped`], not an error.
    async fn save(&self, artifact: &GeneratedArtifact) -> Result<SaveOutcome, StoreError>;

    /// Reads a previously written artifact. `Ok(None)` if it does not exist.
    async fn load(&self, path: &ArtifactPath) -> Result<Option<String>, StoreError>;
}
