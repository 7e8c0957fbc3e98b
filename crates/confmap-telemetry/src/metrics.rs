//! Counters for confmap operations.
//!
//! Recording goes through the `metrics` facade, so every function here is a
//! no-op until the host installs a recorder.
//!
//! # Example
//!
//! ```rust,ignore
//! use confmap_telemetry::metrics::{describe_metrics, record_section_load, LoadOutcome};
//!
//! describe_metrics();
//! record_section_load("Cosmos", LoadOutcome::Found);
//! ```

use metrics::{counter, describe_counter};

/// Section loads, labelled by `section` and `outcome`.
pub const SECTION_LOADS_TOTAL: &str = "confmap_section_loads_total";

/// Section saves, labelled by `section`.
pub const SECTION_SAVES_TOTAL: &str = "confmap_section_saves_total";

/// Entry deletes, labelled by `outcome`.
pub const ENTRIES_DELETED_TOTAL: &str = "confmap_entries_deleted_total";

/// Secret fetches, labelled by `vault` and `outcome`.
pub const SECRET_FETCHES_TOTAL: &str = "confmap_secret_fetches_total";

/// Vault connections opened, labelled by `vault`.
pub const SECRET_CONNECTIONS_TOTAL: &str = "confmap_secret_connections_total";

/// Result of a section load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// At least one entry matched.
    Found,
    /// Nothing matched under the label.
    Absent,
    /// The load failed.
    Error,
}

impl LoadOutcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Absent => "absent",
            Self::Error => "error",
        }
    }
}

/// Registers descriptions for every confmap counter.
pub fn describe_metrics() {
    describe_counter!(SECTION_LOADS_TOTAL, "Total section loads by outcome");
    describe_counter!(SECTION_SAVES_TOTAL, "Total section saves");
    describe_counter!(ENTRIES_DELETED_TOTAL, "Total entry deletes by outcome");
    describe_counter!(SECRET_FETCHES_TOTAL, "Total secret fetches by vault and outcome");
    describe_counter!(
        SECRET_CONNECTIONS_TOTAL,
        "Total secret store connections opened per vault"
    );
}

/// Records a section load.
pub fn record_section_load(section: &str, outcome: LoadOutcome) {
    counter!(
        SECTION_LOADS_TOTAL,
        "section" => section.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Records a section save.
pub fn record_section_save(section: &str) {
    counter!(SECTION_SAVES_TOTAL, "section" => section.to_string()).increment(1);
}

/// Records a single entry delete.
pub fn record_entry_delete(acknowledged: bool) {
    let outcome = if acknowledged { "deleted" } else { "refused" };
    counter!(ENTRIES_DELETED_TOTAL, "outcome" => outcome).increment(1);
}

/// Records a secret fetch.
pub fn record_secret_fetch(vault: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    counter!(
        SECRET_FETCHES_TOTAL,
        "vault" => vault.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Records a newly opened vault connection.
pub fn record_secret_connection(vault: &str) {
    counter!(SECRET_CONNECTIONS_TOTAL, "vault" => vault.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(LoadOutcome::Found.as_str(), "found");
        assert_eq!(LoadOutcome::Absent.as_str(), "absent");
        assert_eq!(LoadOutcome::Error.as_str(), "error");
    }

    #[test]
    fn test_recording_without_recorder() {
        // No recorder installed: recording must not panic.
        describe_metrics();
        record_section_load("Cosmos", LoadOutcome::Found);
        record_section_save("Cosmos");
        record_entry_delete(true);
        record_secret_fetch("myvault.vault.azure.net", false);
        record_secret_connection("myvault.vault.azure.net");
    }
}
