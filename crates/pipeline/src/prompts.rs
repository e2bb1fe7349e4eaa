//! Specification builder.
//!
//! Pure string construction: every function here takes declarative inputs and
//! returns the exact text sent to the generation service. The rule
//! configuration is supplied by reference at construction time and embedded
//! verbatim in each specification.
//!
//! The capability-driven suite specification lists a closed set of permitted
//! methods and nothing else, so the service is never invited to call a method
//! the page abstraction does not expose.

use crate::layout::suite_import_path;
use crate::postprocess::{CANONICAL_PAGE_IMPORT, SUITE_INSTANCE_NAME};
use crate::{
    ArtifactBaseName, CapabilityNameSet, PageGenError, RegistrableName, RuleConfiguration,
    Specification, SpecificationKind, StructuralSnapshot,
};

/// Import line every generated suite must start with.
pub const SUITE_FRAMEWORK_IMPORT: &str = "import { test, expect } from '@playwright/test';";

/// Heading that introduces the closed method list in a capability-driven suite
/// specification.
pub const PERMITTED_METHODS_HEADING: &str = "Use ONLY these public methods from the Page Object:";

/// Builds specifications from a shared, immutable rule configuration.
#[derive(Debug, Clone, Copy)]
pub struct SpecificationBuilder<'a> {
    rules: &'a RuleConfiguration,
}

impl<'a> SpecificationBuilder<'a> {
    pub fn new(rules: &'a RuleConfiguration) -> Self {
        Self { rules }
    }

    /// Specification for the page-abstraction class of `address`.
    ///
    /// An empty snapshot is accepted; the section is emitted empty.
    pub fn artifact(
        &self,
        address: &str,
        snapshot: &StructuralSnapshot,
        base_name: &ArtifactBaseName,
    ) -> Specification {
        let min_locators = self.rules.sections().generation.min_locators_per_page;
        let attributes = self.rules.target_attributes_rendered();
        let rules = self.rules.rendered();
        let dom = snapshot.as_str();

        let text = format!(
            r#"
You are a senior QA automation engineer.

Your task is to generate a Playwright Page Object class in TypeScript, named exactly "{base_name}".

Structure and Coding Guidelines:
- The file must start with:
  {CANONICAL_PAGE_IMPORT}

- The class must begin with:
  export class {base_name} {{

- Inside the class, define:
  - private page: Page;
  - At least {min_locators} private locators of type Locator, each for a distinct interactive element, initialized in the constructor.
    For example:
      private header: Locator;
      private emailInput: Locator;

- The constructor must take (page: Page) and initialize 'page' and all locators using:
      this.page = page;
      this.emailInput = this.page.getByRole('textbox', {{ name: 'Email' }});

- All public methods must:
  - Be declared as "public async"
  - Use only the private locators defined in the constructor
  - Return correct Promise types (e.g. Promise<string>, Promise<void>)
  - Use textContent() ?? '' when retrieving text

Locator Strategy Rules:
- YOU MUST use actual selectors from the DOM snapshot provided below.
- DO NOT use placeholder selectors like '...'.
- Choose locators in this priority order:
  1. getByRole() with an accessible name, or getByLabel()
     Example: this.page.getByRole('button', {{ name: 'Sign in' }})
  2. getByTestId(), getByPlaceholder(), or this.page.locator('[data-testid="..."]') with a stable attribute
     Example: this.page.getByPlaceholder('Enter your email')
  3. Nothing else. Structural or positional selectors are forbidden:
     no input#id, no div.class, no :nth-child, no XPath.
- If a locator matches several elements, narrow it with .filter({{ hasText: '...' }}) or .filter({{ has: ... }}), never by position.
- Never call this.page.locator(...) inside methods; use the initialized private locators.
- Consider mapping components to generic types such as the configured generic components.
- Prioritize these HTML attributes when selecting elements:
  {attributes}

Output Constraints:
- Output raw TypeScript source only.
- DO NOT include any other import statements.
- DO NOT use markdown formatting (no ```).
- DO NOT include explanations, comments, or descriptions.

Custom automation rules:
{rules}

Target URL:
{address}

DOM snapshot:
{dom}
"#
        );

        Specification::new(SpecificationKind::Artifact, text)
    }

    /// Capability-driven suite specification.
    ///
    /// # Errors
    ///
    /// [`PageGenError::NoCapabilities`] if `capabilities` is empty.
    pub fn suite(
        &self,
        base_name: &ArtifactBaseName,
        capabilities: &CapabilityNameSet,
        registrable: &RegistrableName,
        address: &str,
    ) -> Result<Specification, PageGenError> {
        if capabilities.is_empty() {
            return Err(PageGenError::NoCapabilities {
                base_name: base_name.clone(),
            });
        }

        let methods = method_list(capabilities);

        let header = format!(
            r#"
You are a QA automation engineer writing Playwright tests.

Create a TypeScript test file that uses the Page Object class "{base_name}" located at:
'{import}'

{PERMITTED_METHODS_HEADING}
{methods}
Do NOT call any method that is not in the list above. Do NOT invent methods.
"#,
            import = suite_import_path(registrable, base_name),
        );

        let text = header + &self.suite_requirements(base_name, registrable, address);
        Ok(Specification::new(SpecificationKind::CapabilitySuite, text))
    }

    /// Instruction-driven suite specification.
    ///
    /// The test content comes from `instruction`. When `known` capabilities are
    /// supplied they are listed as the methods available on the page object,
    /// but the service may still reference others; callers must check the
    /// generated suite before persisting it.
    ///
    /// # Errors
    ///
    /// [`PageGenError::EmptyInstruction`] if `instruction` is blank.
    pub fn suite_from_instruction(
        &self,
        address: &str,
        instruction: &str,
        base_name: &ArtifactBaseName,
        registrable: &RegistrableName,
        known: Option<&CapabilityNameSet>,
    ) -> Result<Specification, PageGenError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(PageGenError::EmptyInstruction);
        }

        let mut text = format!(
            r#"
You are a QA automation engineer writing Playwright tests.

Create a TypeScript test file that uses the Page Object class "{base_name}" located at:
'{import}'

The tests must cover the following scenario, described by the user:
"""
{instruction}
"""
"#,
            import = suite_import_path(registrable, base_name),
        );

        if let Some(known) = known.filter(|k| !k.is_empty()) {
            text.push_str("\nThe Page Object exposes exactly these public methods:\n");
            text.push_str(&method_list(known));
            text.push_str("Express every step through these methods only.\n");
        }

        text.push_str(&self.suite_requirements(base_name, registrable, address));
        Ok(Specification::new(SpecificationKind::InstructionSuite, text))
    }

    /// Output-shape requirements shared by both suite variants.
    fn suite_requirements(
        &self,
        base_name: &ArtifactBaseName,
        registrable: &RegistrableName,
        address: &str,
    ) -> String {
        let min_tests = self.rules.sections().generation.number_of_tests_per_page;
        let import = suite_import_path(registrable, base_name);
        let rules = self.rules.rendered();

        format!(
            r#"
Requirements:
- Use exactly these imports at the top:
  {SUITE_FRAMEWORK_IMPORT}
  import {{ {base_name} }} from '{import}';
- Declare the shared variables outside the tests:
  let {SUITE_INSTANCE_NAME}: {base_name};
- Add 'test.beforeAll' that launches the browser, creates a single context and page, navigates to '{address}',
  and instantiates the Page Object using:
    {SUITE_INSTANCE_NAME} = new {base_name}(page);
- Add 'test.afterAll' that closes the browser context.
- All tests share that one context; do not create others.
- Write at least {min_tests} test cases, each with explicit expect() assertions on the outcome.
- Output only valid TypeScript test code.
- Do NOT use markdown (no ```), comments, or explanations.

Custom automation rules:
{rules}
"#
        )
    }
}

/// One `- name()` line per capability.
fn method_list(capabilities: &CapabilityNameSet) -> String {
    capabilities
        .iter()
        .map(|name| format!("- {name}()\n"))
        .collect()
}
