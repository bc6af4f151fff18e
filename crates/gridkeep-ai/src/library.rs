// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use gridkeep_model::AiConfigId;

use crate::behavior::AiBehavior;

/// A process-wide registry mapping [`AiConfigId`] to its behaviour
/// implementation.
///
/// Built once at world-init time and treated as read-only afterward, the
/// same way the effect definition registry in `gridkeep-sim` is: content
/// defines behaviours by registering them here, not by extending this
/// crate.
pub struct AiLibrary {
    behaviors: BTreeMap<AiConfigId, Box<dyn AiBehavior>>,
}

impl AiLibrary {
    /// Builds an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self {
            behaviors: BTreeMap::new(),
        }
    }

    /// Registers a behaviour under `config_id`, replacing any existing
    /// registration.
    pub fn register(&mut self, config_id: AiConfigId, behavior: Box<dyn AiBehavior>) {
        self.behaviors.insert(config_id, behavior);
    }

    /// Looks up the behaviour registered for `config_id`.
    #[must_use]
    pub fn get(&self, config_id: &AiConfigId) -> Option<&dyn AiBehavior> {
        self.behaviors.get(config_id).map(AsRef::as_ref)
    }
}

impl Default for AiLibrary {
    fn default() -> Self {
        Self::new()
    }
}
