//! Artifact post-processing.
//!
//! Generated source is scanned with regular expressions matched against the
//! narrow surface shape the specifications demand, rather than parsed into a
//! syntax tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ArtifactBaseName, CapabilityName, CapabilityNameSet};

/// The one import declaration a normalized page abstraction starts with.
pub const CANONICAL_PAGE_IMPORT: &str = "import { Locator, Page } from '@playwright/test';";

/// Variable name suites must use for the page-object instance.
pub const SUITE_INSTANCE_NAME: &str = "pageObj";

/// Any import whose named bindings mention `Page` or `Locator`, including
/// bindings spread over several lines.
static PAGE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s+(?:type\s+)?\{[^}]*\b(?:Page|Locator)\b[^}]*\}[^\n]*(?:\n|$)")
        .expect("static pattern compiles")
});

/// `public async name(` with optional generic parameters.
static PUBLIC_ASYNC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpublic\s+async\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?:<[^<>()]*>)?\s*\(")
        .expect("static pattern compiles")
});

/// `receiver.name(` member calls.
static MEMBER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_$][A-Za-z0-9_$]*)\s*\.\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\(")
        .expect("static pattern compiles")
});

/// `name = new Class(`, with an optional type annotation on `name`.
static INSTANCE_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Za-z_$][A-Za-z0-9_$]*)\s*(?::\s*[A-Za-z_$][A-Za-z0-9_$]*\s*)?=\s*new\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(",
    )
    .expect("static pattern compiles")
});

/// Normalizes a generated page abstraction.
///
/// Removes a surrounding markdown fence if present, drops every import of the
/// page/locator types, and prepends exactly one [`CANONICAL_PAGE_IMPORT`].
/// Applying it twice yields the same text as applying it once.
pub fn normalize_artifact(text: &str) -> String {
    let unfenced = strip_code_fence(text.trim());
    let body = PAGE_IMPORT.replace_all(unfenced, "");
    let body = body.trim();

    if body.is_empty() {
        format!("{CANONICAL_PAGE_IMPORT}\n")
    } else {
        format!("{CANONICAL_PAGE_IMPORT}\n\n{body}\n")
    }
}

/// Returns the names of `public async` methods in order of first appearance,
/// without duplicates. No matches yields an empty set.
pub fn extract_capability_names(text: &str) -> CapabilityNameSet {
    CapabilityNameSet::from_ordered(
        PUBLIC_ASYNC_METHOD
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|m| CapabilityName::new(m.as_str())),
    )
}

/// Names called on the page-object instance in `suite` that are absent from
/// `capabilities`, in first-seen order.
///
/// The instance is [`SUITE_INSTANCE_NAME`] plus any variable the suite binds
/// to `new <base_name>(`.
pub fn find_unknown_capability_references(
    suite: &str,
    capabilities: &CapabilityNameSet,
    base_name: &ArtifactBaseName,
) -> Vec<String> {
    let mut receivers = vec![SUITE_INSTANCE_NAME];
    for binding in INSTANCE_BINDING.captures_iter(suite) {
        if let (Some(var), Some(class)) = (binding.get(1), binding.get(2)) {
            if class.as_str() == base_name.as_str() && !receivers.contains(&var.as_str()) {
                receivers.push(var.as_str());
            }
        }
    }

    let mut unknown: Vec<String> = Vec::new();
    for call in MEMBER_CALL.captures_iter(suite) {
        let (Some(receiver), Some(method)) = (call.get(1), call.get(2)) else {
            continue;
        };
        if !receivers.contains(&receiver.as_str()) {
            continue;
        }
        let name = method.as_str();
        if !capabilities.contains(name) && !unknown.iter().any(|u| u == name) {
            unknown.push(name.to_string());
        }
    }
    unknown
}

/// Drops an opening ```lang line and a closing ``` when the text starts with
/// a fence. Other text is returned unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let inner = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };
    let inner = inner.trim_end();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "export class ExampleComPage {\n  private page: Page;\n  public async submit(): Promise<void> {}\n}";

    fn import_count(text: &str) -> usize {
        text.lines().filter(|l| *l == CANONICAL_PAGE_IMPORT).count()
    }

    #[test]
    fn missing_import_is_added() {
        let out = normalize_artifact(SAMPLE);
        assert!(out.starts_with(CANONICAL_PAGE_IMPORT));
        assert_eq!(import_count(&out), 1);
        assert!(out.contains("export class ExampleComPage"));
    }

    #[test]
    fn duplicate_and_variant_imports_collapse_to_one() {
        let input = format!(
            "import {{ Page }} from '@playwright/test';\nimport {{ Locator, Page, expect }} from \"@playwright/test\";\nimport type {{\n  Locator\n}} from '@playwright/test';\nimport {{ helper }} from './helper';\n{SAMPLE}"
        );
        let out = normalize_artifact(&input);
        assert_eq!(import_count(&out), 1);
        assert!(!out.contains("expect }"));
        assert!(out.contains("import { helper } from './helper';"));
        assert_eq!(out.matches("import").count(), 2);
    }

    #[test]
    fn bindings_that_merely_contain_page_are_kept() {
        let input = format!("import {{ ExampleComPageHelper }} from './x';\n{SAMPLE}");
        let out = normalize_artifact(&input);
        assert!(out.contains("import { ExampleComPageHelper } from './x';"));
    }

    #[test]
    fn fenced_output_is_unwrapped() {
        let input = format!("```typescript\nimport {{ Page }} from '@playwright/test';\n{SAMPLE}\n```\n");
        let out = normalize_artifact(&input);
        assert!(!out.contains("```"));
        assert_eq!(import_count(&out), 1);
    }

    #[test]
    fn extraction_preserves_order_and_drops_duplicates() {
        let source = r#"
export class LoginPage {
  constructor(page: Page) {}
  public async enterUsername(name: string): Promise<void> {}
  private async helper(): Promise<void> {}
  async implicitPublic(): Promise<void> {}
  public async submit(): Promise<void> {}
  public async enterUsername(name: string, again: boolean): Promise<void> {}
  public async getRows<T>(): Promise<T[]> {}
  public static async create(): Promise<LoginPage> {}
  public title(): string { return ''; }
}
"#;
        let names: Vec<String> = extract_capability_names(source)
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, ["enterUsername", "submit", "getRows"]);
    }

    #[test]
    fn no_matches_is_an_empty_set() {
        assert!(extract_capability_names("export class Empty {}").is_empty());
        assert!(extract_capability_names("").is_empty());
    }

    fn base() -> ArtifactBaseName {
        ArtifactBaseName::new("ExampleComPage").unwrap()
    }

    #[test]
    fn unknown_references_are_reported_once() {
        let caps = extract_capability_names(SAMPLE);
        let suite = "await pageObj.submit();\nawait pageObj.login('a');\nawait pageObj . login('b');\nawait pageObj.logout();";
        assert_eq!(
            find_unknown_capability_references(suite, &caps, &base()),
            ["login", "logout"]
        );
        assert!(
            find_unknown_capability_references("await pageObj.submit();", &caps, &base())
                .is_empty()
        );
    }

    #[test]
    fn renamed_page_object_instances_are_checked_too() {
        let caps = extract_capability_names(SAMPLE);
        let suite = "const po = new ExampleComPage(page);\nlet typed: ExampleComPage = new ExampleComPage(page);\nconst other = new Helper(page);\nawait po.submit();\nawait po.bogus();\nawait typed.reset();\nawait other.anything();\nawait page.goto('/');";
        assert_eq!(
            find_unknown_capability_references(suite, &caps, &base()),
            ["bogus", "reset"]
        );
    }

    #[test]
    fn static_patterns_compile() {
        for pattern in [
            &*PAGE_IMPORT,
            &*PUBLIC_ASYNC_METHOD,
            &*MEMBER_CALL,
            &*INSTANCE_BINDING,
        ] {
            assert!(!pattern.as_str().is_empty());
        }
    }

    fn generated_source() -> impl Strategy<Value = String> {
        let line = prop_oneof![
            Just("import { Locator, Page } from '@playwright/test';".to_string()),
            Just("import { Page } from \"@playwright/test\";".to_string()),
            Just("import { expect } from '@playwright/test';".to_string()),
            Just("```ts".to_string()),
            Just("```".to_string()),
            Just("   ".to_string()),
            "[a-zA-Z(){};:. ]{0,30}",
        ];
        prop::collection::vec(line, 0..12).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(input in generated_source()) {
            let once = normalize_artifact(&input);
            let twice = normalize_artifact(&once);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(import_count(&once), 1);
        }

        #[test]
        fn normalization_is_idempotent_on_arbitrary_text(input in "\\PC{0,200}") {
            let once = normalize_artifact(&input);
            prop_assert_eq!(normalize_artifact(&once), once);
        }

        #[test]
        fn extracted_names_are_distinct(names in prop::collection::vec("[a-z][a-zA-Z]{0,8}", 0..10)) {
            let source: String = names
                .iter()
                .map(|n| format!("  public async {n}(): Promise<void> {{}}\n"))
                .collect();
            let extracted: Vec<String> = extract_capability_names(&source)
                .iter()
                .map(|n| n.to_string())
                .collect();

            let mut expected: Vec<String> = Vec::new();
            for n in names {
                if !expected.contains(&n) {
                    expected.push(n);
                }
            }
            prop_assert_eq!(extracted, expected);
        }
    }
}
