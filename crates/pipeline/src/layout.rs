//! Deterministic storage layout.
//!
//! ```text
//! pages/<registrable-name>/<ArtifactBaseName>.ts
//! tests/<registrable-name>/<lowercased-stem>.spec.ts
//! ```
//!
//! All functions here are pure; the filesystem store and the suite
//! specification both derive their paths from them so the suite's import
//! always points at the page abstraction that was actually written.

use crate::{ArtifactBaseName, ArtifactPath, ArtifactRole, RegistrableName};

/// Extension of every generated source file.
pub const SOURCE_EXTENSION: &str = "ts";

const SUITE_MARKER: &str = ".spec";

/// Appends `.ts` unless `file_name` already carries it.
pub fn ensure_source_suffix(file_name: &str) -> String {
    let suffix = format!(".{SOURCE_EXTENSION}");
    if file_name.ends_with(&suffix) {
        file_name.to_string()
    } else {
        format!("{file_name}{suffix}")
    }
}

/// File name of the page abstraction, e.g. `ExampleComPage.ts`.
pub fn page_file_name(base_name: &ArtifactBaseName) -> String {
    ensure_source_suffix(base_name.as_str())
}

/// File name of the test suite, e.g. `examplecom.spec.ts`.
pub fn suite_file_name(base_name: &ArtifactBaseName) -> String {
    ensure_source_suffix(&format!(
        "{}{SUITE_MARKER}",
        base_name.stem().to_lowercase()
    ))
}

/// Relative storage path `{role}/{registrable}/{file}` with the source suffix
/// enforced on `file_name`.
pub fn storage_path(
    role: ArtifactRole,
    registrable: &RegistrableName,
    file_name: &str,
) -> ArtifactPath {
    let file = ensure_source_suffix(file_name);
    ArtifactPath::from_segments(&[role.storage_root(), registrable.as_str(), &file])
}

/// Module specifier the suite uses to import its page abstraction, relative to
/// the suite's own directory and without the file extension.
pub fn suite_import_path(registrable: &RegistrableName, base_name: &ArtifactBaseName) -> String {
    format!(
        "../../{}/{registrable}/{base_name}",
        ArtifactRole::PageAbstraction.storage_root()
    )
}
