//! Generation orchestration.
//!
//! This crate provides [`PipelineExecutor`], which sequences the collaborators
//! defined as traits in the [`pipeline`] crate across the operating modes:
//!
//! - **Full run, capability-driven**: capture → artifact specification →
//!   generate → normalize → persist page → extract capabilities → suite
//!   specification from the closed capability list → generate → persist suite.
//! - **Full run, instruction-driven**: as above, but the suite specification
//!   is built from the operator's instruction, and the generated suite is
//!   rejected if it calls methods the page abstraction does not expose.
//! - **Suite only**: the page abstraction already on disk supplies the
//!   capabilities; only the suite is generated.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The executor contains no domain rules of its own;
//! it calls into [`pipeline`] for every decision and into the injected
//! infrastructure for every effect.
//!
//! Every step is awaited before the next begins. A fatal condition stops the
//! run and is returned as a [`RunFailure`] carrying the partial report.

use std::sync::Arc;

use pipeline::layout::{page_file_name, storage_path, suite_file_name};
use pipeline::postprocess::{
    extract_capability_names, find_unknown_capability_references, normalize_artifact,
    strip_code_fence,
};
use pipeline::{
    ArtifactBaseName, ArtifactRole, ArtifactStore, CapabilityNameSet, GeneratedArtifact,
    GenerationService, PageGenError, PipelineRunId, RuleConfiguration, RunReport, SaveOutcome,
    SnapshotSource, SnapshotStatus, Specification, SpecificationBuilder, StoreError,
    StructuralSnapshot, TargetDescriptor, Timestamp,
};
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

/// How the test suite's content is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteMode {
    /// Enumerate the recovered capabilities as the only permitted calls.
    Capabilities,
    /// Derive tests from free-form operator intent.
    Instruction(String),
}

/// A run that stopped on a fatal condition.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    /// What stopped the run.
    pub error: PageGenError,
    /// Everything completed before the failure (e.g. a persisted page).
    pub report: RunReport,
}

/// Sequences snapshot capture, generation, and persistence for one target
/// per call. Holds no per-run state.
#[derive(Clone)]
pub struct PipelineExecutor {
    snapshots: Arc<dyn SnapshotSource>,
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn ArtifactStore>,
    rules: Arc<RuleConfiguration>,
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor").finish_non_exhaustive()
    }
}

impl PipelineExecutor {
    pub fn new(
        snapshots: Arc<dyn SnapshotSource>,
        generator: Arc<dyn GenerationService>,
        store: Arc<dyn ArtifactStore>,
        rules: Arc<RuleConfiguration>,
    ) -> Self {
        Self {
            snapshots,
            generator,
            store,
            rules,
        }
    }

    /// Generates and persists the page abstraction and its suite for `address`.
    ///
    /// # Errors
    ///
    /// A [`RunFailure`] for invalid input, generation failure, zero
    /// capabilities (capability mode), unknown capability references
    /// (instruction mode), or storage failure. A declined overwrite is not an
    /// error.
    pub async fn run(&self, address: &str, mode: &SuiteMode) -> Result<RunReport, RunFailure> {
        let mut report = new_report(address);
        let span = info_span!("generation_run", run_id = %report.run_id, address = %address);

        async {
            match self.run_full(address, mode, &mut report).await {
                Ok(()) => Ok(report),
                Err(error) => Err(fail(error, report)),
            }
        }
        .instrument(span)
        .await
    }

    /// Generates and persists only the suite, from the page abstraction
    /// already stored for `address`.
    ///
    /// # Errors
    ///
    /// As [`PipelineExecutor::run`], plus [`PageGenError::ArtifactMissing`]
    /// when no page abstraction has been stored for the target.
    pub async fn run_suite_only(
        &self,
        address: &str,
        mode: &SuiteMode,
    ) -> Result<RunReport, RunFailure> {
        let mut report = new_report(address);
        let span = info_span!("suite_run", run_id = %report.run_id, address = %address);

        async {
            match self.run_suite(address, mode, &mut report).await {
                Ok(()) => Ok(report),
                Err(error) => Err(fail(error, report)),
            }
        }
        .instrument(span)
        .await
    }

    async fn run_full(
        &self,
        address: &str,
        mode: &SuiteMode,
        report: &mut RunReport,
    ) -> Result<(), PageGenError> {
        let target = TargetDescriptor::from_address(address)?;
        validate_mode(mode)?;
        info!(
            registrable = %target.registrable_name(),
            class = %target.artifact_base_name(),
            "starting generation"
        );

        let snapshot = self.capture(target.address()).await;
        report.snapshot = if snapshot.is_empty() {
            SnapshotStatus::Degraded
        } else {
            SnapshotStatus::Captured
        };

        let builder = SpecificationBuilder::new(&self.rules);
        let artifact_spec =
            builder.artifact(target.address(), &snapshot, target.artifact_base_name());
        let generated = self.generate(&artifact_spec).await?;
        let normalized = normalize_artifact(&generated);

        let page_outcome = self
            .persist(GeneratedArtifact {
                role: ArtifactRole::PageAbstraction,
                registrable_name: target.registrable_name().clone(),
                file_name: page_file_name(target.artifact_base_name()),
                content: normalized.clone(),
            })
            .await?;

        // The suite imports whatever is on disk, so a kept file is the source
        // of truth for capabilities.
        let page_source = if page_outcome.is_skipped() {
            self.load(&page_outcome).await?.unwrap_or(normalized)
        } else {
            normalized
        };
        report.page = Some(page_outcome);

        self.generate_suite(&target, &page_source, mode, report).await
    }

    async fn run_suite(
        &self,
        address: &str,
        mode: &SuiteMode,
        report: &mut RunReport,
    ) -> Result<(), PageGenError> {
        let target = TargetDescriptor::from_address(address)?;
        validate_mode(mode)?;

        let page_path = storage_path(
            ArtifactRole::PageAbstraction,
            target.registrable_name(),
            &page_file_name(target.artifact_base_name()),
        );
        let page_source = self
            .store
            .load(&page_path)
            .await
            .map_err(storage_error)?
            .ok_or(PageGenError::ArtifactMissing { path: page_path })?;

        self.generate_suite(&target, &page_source, mode, report).await
    }

    async fn generate_suite(
        &self,
        target: &TargetDescriptor,
        page_source: &str,
        mode: &SuiteMode,
        report: &mut RunReport,
    ) -> Result<(), PageGenError> {
        let capabilities = extract_capability_names(page_source);
        info!(count = capabilities.len(), "capabilities extracted");
        report.capabilities = capabilities.clone();

        let builder = SpecificationBuilder::new(&self.rules);
        let base_name = target.artifact_base_name();
        let registrable = target.registrable_name();

        let suite_spec = match mode {
            SuiteMode::Capabilities => {
                builder.suite(base_name, &capabilities, registrable, target.address())?
            }
            SuiteMode::Instruction(instruction) => builder.suite_from_instruction(
                target.address(),
                instruction,
                base_name,
                registrable,
                Some(&capabilities),
            )?,
        };

        let generated = self.generate(&suite_spec).await?;
        let suite = strip_code_fence(generated.trim()).to_string();

        if matches!(mode, SuiteMode::Instruction(_)) {
            check_references(&suite, &capabilities, base_name)?;
        }

        let outcome = self
            .persist(GeneratedArtifact {
                role: ArtifactRole::TestSuite,
                registrable_name: registrable.clone(),
                file_name: suite_file_name(base_name),
                content: suite,
            })
            .await?;
        report.suite = Some(outcome);
        Ok(())
    }

    /// Capture failures degrade to an empty snapshot.
    async fn capture(&self, address: &str) -> StructuralSnapshot {
        match self.snapshots.capture(address).await {
            Ok(snapshot) => {
                info!(bytes = snapshot.len(), "snapshot captured");
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "snapshot capture failed; continuing with an empty snapshot");
                StructuralSnapshot::empty()
            }
        }
    }

    async fn generate(&self, specification: &Specification) -> Result<String, PageGenError> {
        info!(
            kind = ?specification.kind(),
            role = %specification.kind().produces(),
            "requesting generation"
        );
        self.generator
            .respond(specification)
            .await
            .map_err(|e| PageGenError::GenerationFailed {
                message: e.to_string(),
            })
    }

    async fn persist(&self, artifact: GeneratedArtifact) -> Result<SaveOutcome, PageGenError> {
        let outcome = self.store.save(&artifact).await.map_err(storage_error)?;
        if outcome.is_skipped() {
            info!(role = %artifact.role, path = %outcome.path(), "skipped: existing file kept");
        }
        Ok(outcome)
    }

    async fn load(&self, outcome: &SaveOutcome) -> Result<Option<String>, PageGenError> {
        self.store.load(outcome.path()).await.map_err(storage_error)
    }
}

fn new_report(address: &str) -> RunReport {
    RunReport {
        run_id: PipelineRunId::new_random(),
        started_at: Timestamp::now(),
        address: address.to_string(),
        snapshot: SnapshotStatus::NotRequested,
        page: None,
        suite: None,
        capabilities: CapabilityNameSet::default(),
    }
}

fn fail(error: PageGenError, report: RunReport) -> RunFailure {
    RunFailure { error, report }
}

fn validate_mode(mode: &SuiteMode) -> Result<(), PageGenError> {
    match mode {
        SuiteMode::Instruction(text) if text.trim().is_empty() => {
            Err(PageGenError::EmptyInstruction)
        }
        _ => Ok(()),
    }
}

fn check_references(
    suite: &str,
    capabilities: &CapabilityNameSet,
    base_name: &ArtifactBaseName,
) -> Result<(), PageGenError> {
    let unknown = find_unknown_capability_references(suite, capabilities, base_name);
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(PageGenError::UnknownCapabilityReference { names: unknown })
    }
}

fn storage_error(e: StoreError) -> PageGenError {
    match e {
        StoreError::Io { path, message } => PageGenError::Storage { path, message },
    }
}
