use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use ajob_model::JobIdentity;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = Arc<StdMutex<HashMap<JobIdentity, Arc<Mutex<()>>>>>;

/// In-process mutual exclusion keyed by job identity.
///
/// Serialises dispatches to the same job within one process only;
/// other replicas still race on the remote resource.
#[derive(Debug, Clone, Default)]
pub struct IdentityLocks {
    slots: Slots,
}

/// Held for the duration of one dispatch. Releases the slot on drop.
#[derive(Debug)]
pub struct IdentityGuard {
    identity: JobIdentity,
    slots: Slots,
    _held: OwnedMutexGuard<()>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other dispatch holds `identity`.
    pub async fn lock(&self, identity: &JobIdentity) -> IdentityGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(identity.clone()).or_default().clone()
        };
        IdentityGuard {
            identity: identity.clone(),
            slots: self.slots.clone(),
            _held: slot.lock_owned().await,
        }
    }

    /// Number of identities currently locked or awaited.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for IdentityGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        // The map and this guard own one reference each; more means someone is waiting.
        let idle = slots
            .get(&self.identity)
            .is_some_and(|slot| Arc::strong_count(slot) <= 2);
        if idle {
            slots.remove(&self.identity);
        }
    }
}
