//! Wire identities for writes and deletes.

use confmap_core::{EntryIdentity, Label, ResolvedMapping};

/// Flattens a mapping into one identity per store entry under `label`.
///
/// A whole-object mapping yields exactly one identity. A field mapping
/// yields one identity per field in declaration order, skipping secret
/// references unless `include_secrets` is set. Secrets are never written
/// through the engine, so only deletes ask for them.
pub fn build_identities(
    mapping: &ResolvedMapping,
    label: &Label,
    include_secrets: bool,
) -> Vec<EntryIdentity> {
    if let Some(whole) = &mapping.whole_object {
        return vec![EntryIdentity {
            key: whole.key.clone(),
            label: label.clone(),
            content_type: whole.content_type,
            owner_field: None,
        }];
    }

    mapping
        .fields
        .iter()
        .filter(|(_, field)| include_secrets || !field.content_type.is_secret())
        .map(|(name, field)| EntryIdentity {
            key: field.key.clone(),
            label: label.clone(),
            content_type: field.content_type,
            owner_field: Some(name.clone()),
        })
        .collect()
}
