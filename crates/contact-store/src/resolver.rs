//! Maps the payload of a contact action to one stored contact

use crate::{normalize_phone, ContactStore, ResolvedContact, Result, StoreError};
use intent_parser::CommandNormalizer;
use tracing::{debug, info};

/// Resolves "send message to mom" style commands against the store.
///
/// The command is stripped of stop words to get a name fragment; the first
/// prefix match wins, then the first substring match. No match is an error,
/// never a silent fallback.
pub struct ContactResolver<'a> {
    store: &'a ContactStore,
    normalizer: &'a CommandNormalizer,
    default_prefix: String,
}

impl<'a> ContactResolver<'a> {
    pub fn new(
        store: &'a ContactStore,
        normalizer: &'a CommandNormalizer,
        default_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            normalizer,
            default_prefix: default_prefix.into(),
        }
    }

    pub fn resolve(&self, command: &str) -> Result<ResolvedContact> {
        let fragment = self.normalizer.normalize(command);
        if fragment.is_empty() {
            debug!(command, "no name left after stop-word removal");
            return Err(StoreError::ContactNotFound(fragment));
        }

        let best = self
            .store
            .find_matches(&fragment)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::ContactNotFound(fragment.clone()))?;

        let phone = normalize_phone(&best.contact.phone, &self.default_prefix);
        info!(
            fragment = %fragment,
            contact = %best.contact.name,
            kind = ?best.kind,
            "resolved contact"
        );
        Ok(ResolvedContact {
            contact: best.contact,
            fragment,
            phone,
            kind: best.kind,
        })
    }
}
