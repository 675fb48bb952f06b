use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use extension_gateway_error::GatewayError;

/// Maps each claimed action name to the extension that owns it.
///
/// Claims are insert-only: once a name is owned it stays owned for the life of
/// the registry, and a second claim for it is rejected rather than overwriting.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: RwLock<HashMap<String, String>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `action` for `extension_id`. The check and the insert happen under
    /// a single write guard, so concurrent claimants see exactly one winner.
    pub fn register(&self, action: &str, extension_id: &str) -> Result<(), GatewayError> {
        self.register_with(action, extension_id, || Ok(()))
    }

    /// Like [`register`](Self::register), but runs `commit` once the name is
    /// known to be free and records the owner only if `commit` succeeds. The
    /// write guard is held throughout, so a failed commit leaves the name
    /// unclaimed and no other claimant can slip in between.
    pub fn register_with<F>(
        &self,
        action: &str,
        extension_id: &str,
        commit: F,
    ) -> Result<(), GatewayError>
    where
        F: FnOnce() -> Result<(), GatewayError>,
    {
        let mut actions = self.actions.write().unwrap_or_else(PoisonError::into_inner);
        match actions.entry(action.to_string()) {
            Entry::Occupied(_) => Err(GatewayError::DuplicateRegistration {
                action: action.to_string(),
            }),
            Entry::Vacant(slot) => {
                commit()?;
                slot.insert(extension_id.to_string());
                Ok(())
            }
        }
    }

    pub fn resolve(&self, action: &str) -> Option<String> {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(action)
            .cloned()
    }

    /// Action names owned by `extension_id`, sorted.
    pub fn actions_for(&self, extension_id: &str) -> Vec<String> {
        let actions = self.actions.read().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<String> = actions
            .iter()
            .filter(|(_, owner)| owner.as_str() == extension_id)
            .map(|(action, _)| action.clone())
            .collect();
        owned.sort();
        owned
    }

    pub fn len(&self) -> usize {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
