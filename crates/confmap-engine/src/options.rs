//! Engine options.

use confmap_core::Credential;

/// Options for a [`SectionService`](crate::SectionService).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Referenced module to discover section types in. `None` or empty
    /// selects the current module.
    pub module_hint: Option<String>,

    /// Credential used when connecting to vaults.
    pub credential: Credential,
}

impl EngineOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module hint.
    #[must_use]
    pub fn module_hint(mut self, hint: impl Into<String>) -> Self {
        self.module_hint = Some(hint.into());
        self
    }

    /// Sets the vault credential.
    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }
}
