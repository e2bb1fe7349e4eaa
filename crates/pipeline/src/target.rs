//! Target descriptor derivation.
//!
//! A [`TargetDescriptor`] is computed once per run from the operator-supplied
//! address and never changes afterwards. It carries the three naming inputs
//! every later stage needs: the address itself, the [`RegistrableName`] used as
//! a storage segment, and the [`ArtifactBaseName`] used as the class name.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ArtifactBaseName, PageGenError, RegistrableName, PAGE_ROLE_SUFFIX};

/// Prefix used when a host stem would otherwise begin with a digit.
const NUMERIC_STEM_PREFIX: &str = "Site";

/// Naming and addressing data for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    address: Url,
    registrable_name: RegistrableName,
    artifact_base_name: ArtifactBaseName,
}

impl TargetDescriptor {
    /// Derives the descriptor for `address`.
    ///
    /// # Errors
    ///
    /// [`PageGenError::InvalidTarget`] if the address does not use an `http`
    /// or `https` scheme, cannot be parsed, has no host, or yields an empty
    /// class identifier.
    pub fn from_address(address: &str) -> Result<Self, PageGenError> {
        let trimmed = address.trim();
        let invalid = |reason: &str| PageGenError::InvalidTarget {
            address: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let lower = trimmed.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(invalid("address must begin with http:// or https://"));
        }

        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("address has no host"))?;

        let registrable_name = RegistrableName::new(sanitize_registrable_name(host))
            .ok_or_else(|| invalid("host sanitizes to an empty name"))?;
        let artifact_base_name = derive_artifact_base_name(registrable_name.as_str())
            .ok_or_else(|| invalid("host contains no letters or digits"))?;

        Ok(Self {
            address: url,
            registrable_name,
            artifact_base_name,
        })
    }

    /// The absolute address as supplied (normalised by URL parsing).
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// The sanitized host used as the storage directory segment.
    pub fn registrable_name(&self) -> &RegistrableName {
        &self.registrable_name
    }

    /// The class name of the page-abstraction artifact.
    pub fn artifact_base_name(&self) -> &ArtifactBaseName {
        &self.artifact_base_name
    }
}

/// Canonical sanitizer for the registrable name.
///
/// Accepts either a bare host or a full address: the scheme, any path, query
/// or fragment, any port, and a single leading `www.` are removed; the result
/// is lowercased and every character outside `[A-Za-z0-9.-]` becomes `_`.
///
/// Distinct inputs that sanitize to the same string share a storage directory.
pub fn sanitize_registrable_name(input: &str) -> String {
    let mut rest = input.trim();
    if let Some(idx) = rest.find("://") {
        rest = &rest[idx + 3..];
    }
    if let Some(idx) = rest.find(['/', '?', '#']) {
        rest = &rest[..idx];
    }
    if let Some(idx) = rest.rfind('@') {
        rest = &rest[idx + 1..];
    }
    // Bracketed IPv6 literals keep their colons; the port follows the `]`.
    if rest.starts_with('[') {
        if let Some(idx) = rest.find(']') {
            rest = &rest[..=idx];
        }
    } else if let Some(idx) = rest.rfind(':') {
        rest = &rest[..idx];
    }

    let lower = rest.to_ascii_lowercase();
    let host = lower.strip_prefix("www.").unwrap_or(&lower);

    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derives the PascalCase page class name from a registrable name.
///
/// Every run of non-alphanumeric characters acts as a word boundary; each word
/// has its first letter upper-cased and the rest kept as-is. A stem beginning
/// with a digit is prefixed with `Site`. Returns `None` when no letters or
/// digits remain.
pub fn derive_artifact_base_name(registrable: &str) -> Option<ArtifactBaseName> {
    let stem: String = registrable
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if stem.is_empty() {
        return None;
    }

    let prefix = if stem.starts_with(|c: char| c.is_ascii_digit()) {
        NUMERIC_STEM_PREFIX
    } else {
        ""
    };
    ArtifactBaseName::new(format!("{prefix}{stem}{PAGE_ROLE_SUFFIX}"))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
