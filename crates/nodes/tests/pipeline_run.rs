//! End-to-end runs of the executor against scripted collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nodes::{PipelineExecutor, SuiteMode};
use pipeline::layout::storage_path;
use pipeline::postprocess::CANONICAL_PAGE_IMPORT;
use pipeline::prompts::PERMITTED_METHODS_HEADING;
use pipeline::{
    ArtifactPath, ArtifactStore, GeneratedArtifact, GenerationError, GenerationService,
    PageGenError, RuleConfiguration, SaveOutcome, SnapshotError, SnapshotSource, SnapshotStatus,
    Specification, SpecificationKind, StoreError, StructuralSnapshot,
};

const LOGIN_DOM: &str = r#"<form><input aria-label="Username"><button>Submit</button></form>"#;

const LOGIN_PAGE: &str = r#"```typescript
import { Page } from '@playwright/test';

export class ExampleComPage {
  private page: Page;
  private username: Locator;
  private submitButton: Locator;

  constructor(page: Page) {
    this.page = page;
    this.username = this.page.getByRole('textbox', { name: 'Username' });
    this.submitButton = this.page.getByRole('button', { name: 'Submit' });
  }

  public async enterUsername(name: string): Promise<void> {
    await this.username.fill(name);
  }

  public async submit(): Promise<void> {
    await this.submitButton.click();
  }
}
```"#;

const LOGIN_SUITE: &str = "import { test, expect } from '@playwright/test';\ntest('submits', async () => { await pageObj.enterUsername('a'); await pageObj.submit(); });";

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

struct FixedSnapshot(Result<String, SnapshotError>);

#[async_trait]
impl SnapshotSource for FixedSnapshot {
    async fn capture(&self, _address: &str) -> Result<StructuralSnapshot, SnapshotError> {
        self.0.clone().map(StructuralSnapshot::new)
    }
}

/// Returns queued responses in order and records every specification.
#[derive(Default)]
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    seen: Mutex<Vec<Specification>>,
}

impl ScriptedGenerator {
    fn new(responses: impl IntoIterator<Item = Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            seen: Mutex::default(),
        })
    }

    fn seen(&self) -> Vec<Specification> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn respond(&self, specification: &Specification) -> Result<String, GenerationError> {
        self.seen.lock().unwrap().push(specification.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("no scripted response".into())))
    }
}

/// In-memory store keyed by layout path.
struct MemoryStore {
    files: Mutex<HashMap<String, String>>,
    confirm_overwrite: bool,
}

impl MemoryStore {
    fn new(confirm_overwrite: bool) -> Arc<Self> {
        Arc::new(Self {
            files: Mutex::default(),
            confirm_overwrite,
        })
    }

    fn seed(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn save(&self, artifact: &GeneratedArtifact) -> Result<SaveOutcome, StoreError> {
        let path = storage_path(artifact.role, &artifact.registrable_name, &artifact.file_name);
        let mut files = self.files.lock().unwrap();
        let existed = files.contains_key(path.as_str());
        if existed && !self.confirm_overwrite {
            return Ok(SaveOutcome::Skipped { path });
        }
        files.insert(path.to_string(), artifact.content.trim().to_string());
        Ok(if existed {
            SaveOutcome::Overwritten { path }
        } else {
            SaveOutcome::Written { path }
        })
    }

    async fn load(&self, path: &ArtifactPath) -> Result<Option<String>, StoreError> {
        Ok(self.get(path.as_str()))
    }
}

fn executor(
    snapshot: Result<String, SnapshotError>,
    generator: Arc<ScriptedGenerator>,
    store: Arc<MemoryStore>,
) -> PipelineExecutor {
    PipelineExecutor::new(
        Arc::new(FixedSnapshot(snapshot)),
        generator,
        store,
        Arc::new(RuleConfiguration::builtin().unwrap()),
    )
}

const PAGE_PATH: &str = "pages/example.com/ExampleComPage.ts";
const SUITE_PATH: &str = "tests/example.com/examplecom.spec.ts";

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_page_produces_page_and_suite() {
    let generator = ScriptedGenerator::new([Ok(LOGIN_PAGE.to_string()), Ok(LOGIN_SUITE.to_string())]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator.clone(), store.clone());

    let report = exec
        .run("https://example.com/login", &SuiteMode::Capabilities)
        .await
        .unwrap();

    assert_eq!(report.snapshot, SnapshotStatus::Captured);
    assert_eq!(report.page.as_ref().unwrap().path().as_str(), PAGE_PATH);
    assert_eq!(report.suite.as_ref().unwrap().path().as_str(), SUITE_PATH);
    let names: Vec<String> = report.capabilities.iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["enterUsername", "submit"]);

    let page = store.get(PAGE_PATH).unwrap();
    assert!(page.starts_with(CANONICAL_PAGE_IMPORT));
    assert_eq!(page.matches("import {").count(), 1);
    assert!(!page.contains("```"));
    assert_eq!(store.get(SUITE_PATH).unwrap(), LOGIN_SUITE);

    let seen = generator.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind(), SpecificationKind::Artifact);
    assert!(seen[0].text().contains(LOGIN_DOM));
    assert_eq!(seen[1].kind(), SpecificationKind::CapabilitySuite);

    let listed: Vec<&str> = seen[1]
        .text()
        .split(PERMITTED_METHODS_HEADING)
        .nth(1)
        .unwrap()
        .lines()
        .skip(1)
        .take_while(|l| l.starts_with("- "))
        .collect();
    assert_eq!(listed, ["- enterUsername()", "- submit()"]);
}

#[tokio::test]
async fn capture_failure_still_generates_page() {
    let generator = ScriptedGenerator::new([Ok(LOGIN_PAGE.to_string()), Ok(LOGIN_SUITE.to_string())]);
    let store = MemoryStore::new(false);
    let failure = SnapshotError::Navigation {
        address: "https://example.com/login".to_string(),
        message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
    };
    let exec = executor(Err(failure), generator.clone(), store.clone());

    let report = exec
        .run("https://example.com/login", &SuiteMode::Capabilities)
        .await
        .unwrap();

    assert_eq!(report.snapshot, SnapshotStatus::Degraded);
    assert!(store.get(PAGE_PATH).is_some());
    assert!(generator.seen()[0]
        .text()
        .trim_end()
        .ends_with("DOM snapshot:"));
}

#[tokio::test]
async fn zero_capabilities_skips_suite_after_writing_page() {
    let generator = ScriptedGenerator::new([Ok("export class ExampleComPage {}".to_string())]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator.clone(), store.clone());

    let failure = exec
        .run("https://example.com/login", &SuiteMode::Capabilities)
        .await
        .unwrap_err();

    assert!(matches!(failure.error, PageGenError::NoCapabilities { .. }));
    assert!(matches!(failure.report.page, Some(SaveOutcome::Written { .. })));
    assert!(failure.report.suite.is_none());
    assert!(store.get(PAGE_PATH).is_some());
    assert!(store.get(SUITE_PATH).is_none());
    assert_eq!(generator.seen().len(), 1);
}

#[tokio::test]
async fn declined_overwrite_keeps_existing_page_and_uses_it() {
    let existing = "import { Locator, Page } from '@playwright/test';\n\nexport class ExampleComPage {\n  public async openMenu(): Promise<void> {}\n}";
    let generator = ScriptedGenerator::new([Ok(LOGIN_PAGE.to_string()), Ok(LOGIN_SUITE.to_string())]);
    let store = MemoryStore::new(false);
    store.seed(PAGE_PATH, existing);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator.clone(), store.clone());

    let report = exec
        .run("https://example.com/login", &SuiteMode::Capabilities)
        .await
        .unwrap();

    assert!(report.page.as_ref().unwrap().is_skipped());
    assert_eq!(store.get(PAGE_PATH).unwrap(), existing);

    let names: Vec<String> = report.capabilities.iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["openMenu"]);
    assert!(generator.seen()[1].text().contains("- openMenu()"));
    assert!(!generator.seen()[1].text().contains("- submit()"));
}

#[tokio::test]
async fn generation_failure_aborts_without_writing() {
    let generator = ScriptedGenerator::new([Err(GenerationError::Status {
        status: 500,
        body: "boom".to_string(),
    })]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator, store.clone());

    let failure = exec
        .run("https://example.com/login", &SuiteMode::Capabilities)
        .await
        .unwrap_err();

    assert!(matches!(failure.error, PageGenError::GenerationFailed { .. }));
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn invalid_address_fails_before_any_remote_call() {
    let generator = ScriptedGenerator::new([]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator.clone(), store.clone());

    let failure = exec
        .run("example.com/login", &SuiteMode::Capabilities)
        .await
        .unwrap_err();

    assert!(matches!(failure.error, PageGenError::InvalidTarget { .. }));
    assert_eq!(failure.report.snapshot, SnapshotStatus::NotRequested);
    assert!(generator.seen().is_empty());
}

#[tokio::test]
async fn instruction_suite_with_unknown_method_is_not_written() {
    let rogue_suite = "test('x', async () => { await pageObj.enterUsername('a'); await pageObj.loginAsAdmin(); });";
    let generator = ScriptedGenerator::new([Ok(LOGIN_PAGE.to_string()), Ok(rogue_suite.to_string())]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator.clone(), store.clone());

    let mode = SuiteMode::Instruction("log in as admin".to_string());
    let failure = exec.run("https://example.com/login", &mode).await.unwrap_err();

    assert_eq!(
        failure.error,
        PageGenError::UnknownCapabilityReference {
            names: vec!["loginAsAdmin".to_string()]
        }
    );
    assert!(store.get(PAGE_PATH).is_some());
    assert!(store.get(SUITE_PATH).is_none());
    assert_eq!(generator.seen()[1].kind(), SpecificationKind::InstructionSuite);
    assert!(generator.seen()[1].text().contains("log in as admin"));
}

#[tokio::test]
async fn instruction_suite_calling_through_a_local_binding_is_checked() {
    let aliased_suite = "test('x', async ({ page }) => { const po = new ExampleComPage(page); await po.submit(); await po.resetPassword(); });";
    let generator = ScriptedGenerator::new([Ok(LOGIN_PAGE.to_string()), Ok(aliased_suite.to_string())]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator, store.clone());

    let mode = SuiteMode::Instruction("reset the password".to_string());
    let failure = exec.run("https://example.com/login", &mode).await.unwrap_err();

    assert_eq!(
        failure.error,
        PageGenError::UnknownCapabilityReference {
            names: vec!["resetPassword".to_string()]
        }
    );
    assert!(store.get(SUITE_PATH).is_none());
}

#[tokio::test]
async fn instruction_suite_with_known_methods_is_written() {
    let generator = ScriptedGenerator::new([Ok(LOGIN_PAGE.to_string()), Ok(LOGIN_SUITE.to_string())]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator, store.clone());

    let mode = SuiteMode::Instruction("submit a username".to_string());
    let report = exec.run("https://example.com/login", &mode).await.unwrap();

    assert!(matches!(report.suite, Some(SaveOutcome::Written { .. })));
    assert_eq!(store.get(SUITE_PATH).unwrap(), LOGIN_SUITE);
}

#[tokio::test]
async fn blank_instruction_is_rejected_up_front() {
    let generator = ScriptedGenerator::new([]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(LOGIN_DOM.to_string()), generator.clone(), store);

    let failure = exec
        .run("https://example.com/login", &SuiteMode::Instruction("  ".to_string()))
        .await
        .unwrap_err();

    assert_eq!(failure.error, PageGenError::EmptyInstruction);
    assert!(generator.seen().is_empty());
}

#[tokio::test]
async fn suite_only_uses_stored_page() {
    let generator = ScriptedGenerator::new([Ok(LOGIN_SUITE.to_string())]);
    let store = MemoryStore::new(false);
    store.seed(PAGE_PATH, LOGIN_PAGE);
    let exec = executor(Ok(String::new()), generator.clone(), store.clone());

    let report = exec
        .run_suite_only("https://www.example.com/", &SuiteMode::Capabilities)
        .await
        .unwrap();

    assert_eq!(report.snapshot, SnapshotStatus::NotRequested);
    assert_eq!(report.capabilities.len(), 2);
    assert_eq!(store.get(SUITE_PATH).unwrap(), LOGIN_SUITE);
    assert_eq!(generator.seen().len(), 1);
}

#[tokio::test]
async fn suite_only_without_page_reports_missing_artifact() {
    let generator = ScriptedGenerator::new([]);
    let store = MemoryStore::new(false);
    let exec = executor(Ok(String::new()), generator, store);

    let failure = exec
        .run_suite_only("https://example.com", &SuiteMode::Capabilities)
        .await
        .unwrap_err();

    assert_eq!(
        failure.error,
        PageGenError::ArtifactMissing {
            path: ArtifactPath::new(PAGE_PATH).unwrap()
        }
    );
}
