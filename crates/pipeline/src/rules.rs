//! Rule configuration embedded in every specification.
//!
//! The configuration is loaded once at startup (built-in defaults or a JSON
//! file), rendered to JSON once, and then passed by shared reference to the
//! specification builder. Nothing mutates it after load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PageGenError;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Test design conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestStructureRules {
    #[serde(rename = "usePOM")]
    pub use_pom: bool,
    pub base_page_usage: bool,
    pub use_helper_functions: bool,
    pub keep_test_file_clean: bool,
    pub use_describe_blocks: bool,
    pub prefer_descriptive_test_names: bool,
}

impl Default for TestStructureRules {
    fn default() -> Self {
        Self {
            use_pom: true,
            base_page_usage: true,
            use_helper_functions: true,
            keep_test_file_clean: true,
            use_describe_blocks: true,
            prefer_descriptive_test_names: true,
        }
    }
}

/// Locator selection preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocatorStrategyRules {
    pub prefer_stable_locators: bool,
    pub avoid_css_selectors: bool,
    pub use_locator_filter: bool,
    /// Reusable component names the generator may map regions onto.
    pub generic_components: Vec<String>,
    /// HTML attributes to prioritise, most preferred first.
    pub target_attributes: Vec<String>,
}

impl Default for LocatorStrategyRules {
    fn default() -> Self {
        Self {
            prefer_stable_locators: true,
            avoid_css_selectors: true,
            use_locator_filter: true,
            generic_components: [
                "tableComponent",
                "formComponent",
                "modalComponent",
                "navbarComponent",
            ]
            .map(String::from)
            .to_vec(),
            target_attributes: ["data-testid", "placeholder", "aria-label", "name", "id"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Quantitative generation targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRules {
    /// Minimum number of test cases in a suite.
    pub number_of_tests_per_page: u32,
    pub max_dom_elements_to_map: u32,
    /// Minimum number of distinct element locators in a page abstraction.
    pub min_locators_per_page: u32,
}

impl Default for GenerationRules {
    fn default() -> Self {
        Self {
            number_of_tests_per_page: 2,
            max_dom_elements_to_map: 20,
            min_locators_per_page: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileStructureRules {
    pub page_objects_dir: String,
    pub tests_dir: String,
    pub use_kebab_case_for_files: bool,
}

impl Default for FileStructureRules {
    fn default() -> Self {
        Self {
            page_objects_dir: "pages".to_string(),
            tests_dir: "tests".to_string(),
            use_kebab_case_for_files: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeStyleRules {
    pub use_camel_case: bool,
    pub avoid_long_functions: bool,
    pub avoid_complex_logic: bool,
    pub write_like_senior: bool,
    pub use_simple_english: bool,
}

impl Default for CodeStyleRules {
    fn default() -> Self {
        Self {
            use_camel_case: true,
            avoid_long_functions: true,
            avoid_complex_logic: true,
            write_like_senior: true,
            use_simple_english: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileNamingRules {
    pub page_object_suffix: String,
    pub test_file_suffix: String,
    #[serde(rename = "outputFolderPO")]
    pub output_folder_po: String,
    pub output_folder_tests: String,
}

impl Default for FileNamingRules {
    fn default() -> Self {
        Self {
            page_object_suffix: "Page".to_string(),
            test_file_suffix: ".spec.ts".to_string(),
            output_folder_po: "pom".to_string(),
            output_folder_tests: "tests".to_string(),
        }
    }
}

/// Example credentials shown to the generator as the shape of a secrets file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretsFileExample {
    pub url: String,
    pub users: BTreeMap<String, ExampleCredentials>,
}

impl Default for SecretsFileExample {
    fn default() -> Self {
        let mut users = BTreeMap::new();
        users.insert(
            "admin".to_string(),
            ExampleCredentials {
                email: "admin@example.com".to_string(),
                password: "securePassword123".to_string(),
            },
        );
        users.insert(
            "user".to_string(),
            ExampleCredentials {
                email: "user@example.com".to_string(),
                password: "userPassword456".to_string(),
            },
        );
        Self {
            url: "https://example.com".to_string(),
            users,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretsAndEnvRules {
    pub use_secrets_file: bool,
    pub secrets_file_example: SecretsFileExample,
}

impl Default for SecretsAndEnvRules {
    fn default() -> Self {
        Self {
            use_secrets_file: true,
            secrets_file_example: SecretsFileExample::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingRules {
    pub use_simple_comments: bool,
    pub no_advanced_vocabulary: bool,
}

impl Default for FormattingRules {
    fn default() -> Self {
        Self {
            use_simple_comments: true,
            no_advanced_vocabulary: true,
        }
    }
}

/// All rule sections, in the JSON shape accepted by `--rules`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSections {
    pub test_structure: TestStructureRules,
    pub locator_strategy: LocatorStrategyRules,
    pub generation: GenerationRules,
    pub file_structure: FileStructureRules,
    pub code_style: CodeStyleRules,
    pub file_naming: FileNamingRules,
    pub secrets_and_env: SecretsAndEnvRules,
    pub formatting: FormattingRules,
}

// ---------------------------------------------------------------------------
// Loaded configuration
// ---------------------------------------------------------------------------

/// Immutable, pre-rendered rule configuration shared by every specification
/// built in a process.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfiguration {
    sections: RuleSections,
    rendered: String,
    attributes_rendered: String,
}

impl RuleConfiguration {
    /// The built-in rule set.
    ///
    /// # Errors
    ///
    /// [`PageGenError::ConfigurationError`] if the rules cannot be rendered.
    pub fn builtin() -> Result<Self, PageGenError> {
        Self::from_sections(RuleSections::default())
    }

    /// Parses a JSON rule file. Missing sections and fields take their
    /// built-in values.
    ///
    /// # Errors
    ///
    /// [`PageGenError::ConfigurationError`] if `json` is not a valid rule
    /// document.
    pub fn from_json(json: &str) -> Result<Self, PageGenError> {
        let sections: RuleSections =
            serde_json::from_str(json).map_err(|e| PageGenError::ConfigurationError {
                message: format!("invalid rule file: {e}"),
            })?;
        Self::from_sections(sections)
    }

    /// Wraps already-constructed sections.
    ///
    /// # Errors
    ///
    /// [`PageGenError::ConfigurationError`] if the minimum counts are zero or
    /// the sections cannot be rendered.
    pub fn from_sections(sections: RuleSections) -> Result<Self, PageGenError> {
        if sections.generation.number_of_tests_per_page == 0 {
            return Err(PageGenError::ConfigurationError {
                message: "generation.numberOfTestsPerPage must be at least 1".to_string(),
            });
        }
        if sections.generation.min_locators_per_page == 0 {
            return Err(PageGenError::ConfigurationError {
                message: "generation.minLocatorsPerPage must be at least 1".to_string(),
            });
        }

        let render_error = |e: serde_json::Error| PageGenError::ConfigurationError {
            message: format!("rules could not be rendered: {e}"),
        };
        let rendered = serde_json::to_string_pretty(&sections).map_err(render_error)?;
        let attributes_rendered =
            serde_json::to_string(&sections.locator_strategy.target_attributes)
                .map_err(render_error)?;

        Ok(Self {
            sections,
            rendered,
            attributes_rendered,
        })
    }

    /// The parsed rule sections.
    pub fn sections(&self) -> &RuleSections {
        &self.sections
    }

    /// The full rule set as pretty-printed JSON.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// The prioritised target attributes as a compact JSON array.
    pub fn target_attributes_rendered(&self) -> &str {
        &self.attributes_rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_render_camel_case_keys() {
        let rules = RuleConfiguration::builtin().unwrap();
        assert!(rules.rendered().contains("\"locatorStrategy\""));
        assert!(rules.rendered().contains("\"numberOfTestsPerPage\": 2"));
        assert_eq!(
            rules.target_attributes_rendered(),
            r#"["data-testid","placeholder","aria-label","name","id"]"#
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let rules =
            RuleConfiguration::from_json(r#"{ "generation": { "numberOfTestsPerPage": 4 } }"#)
                .unwrap();
        assert_eq!(rules.sections().generation.number_of_tests_per_page, 4);
        assert_eq!(rules.sections().generation.min_locators_per_page, 3);
        assert_eq!(rules.sections().file_structure.tests_dir, "tests");
    }

    #[test]
    fn zero_test_minimum_is_rejected() {
        let err =
            RuleConfiguration::from_json(r#"{ "generation": { "numberOfTestsPerPage": 0 } }"#)
                .unwrap_err();
        assert!(matches!(err, PageGenError::ConfigurationError { .. }));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = RuleConfiguration::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PageGenError::ConfigurationError { .. }));
    }
}
