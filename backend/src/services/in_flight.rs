//! Duplicate-action guard
//!
//! A ticket is held for the whole duration of a remote action. A second
//! request for the same action is rejected until the ticket is dropped,
//! which also happens when the action fails.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use shared::{PalletId, PositionId};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Set of actions currently in flight
#[derive(Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Held while an action runs; releases it on drop
#[derive(Debug)]
pub struct InFlightTicket {
    key: String,
    keys: Arc<Mutex<HashSet<String>>>,
}

fn lock(keys: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    // the set stays consistent even if a holder panicked
    keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, failing with `ACTION_IN_PROGRESS` when it is taken
    pub fn acquire(&self, key: impl Into<String>) -> AppResult<InFlightTicket> {
        let key = key.into();
        if !lock(&self.keys).insert(key.clone()) {
            tracing::debug!("Rejected duplicate action {}", key);
            return Err(AppError::ActionInProgress(key));
        }
        Ok(InFlightTicket {
            key,
            keys: Arc::clone(&self.keys),
        })
    }

    pub fn is_active(&self, key: &str) -> bool {
        lock(&self.keys).contains(key)
    }

    pub fn submit_key(draft: Uuid) -> String {
        format!("submit:{}", draft)
    }

    pub fn link_key(pallet: PalletId) -> String {
        format!("link:{}", pallet)
    }

    pub fn assign_key(position: PositionId) -> String {
        format!("assign:{}", position)
    }
}

impl InFlightTicket {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        lock(&self.keys).remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected() {
        let in_flight = InFlight::new();
        let ticket = in_flight.acquire("submit:1").unwrap();

        assert!(matches!(
            in_flight.acquire("submit:1"),
            Err(AppError::ActionInProgress(_))
        ));
        assert!(in_flight.acquire("submit:2").is_ok());
        assert_eq!(ticket.key(), "submit:1");
    }

    #[test]
    fn test_drop_releases_key() {
        let in_flight = InFlight::new();
        {
            let _ticket = in_flight.acquire(InFlight::link_key(PalletId::new(4))).unwrap();
            assert!(in_flight.is_active("link:4"));
        }
        assert!(!in_flight.is_active("link:4"));
        assert!(in_flight.acquire("link:4").is_ok());
    }

    #[test]
    fn test_release_on_error_path() {
        let in_flight = InFlight::new();
        let attempt = || -> AppResult<()> {
            let _ticket = in_flight.acquire(InFlight::assign_key(PositionId::new(9)))?;
            Err(AppError::Internal("remote failed".to_string()))
        };

        assert!(attempt().is_err());
        assert!(!in_flight.is_active("assign:9"));
    }
}
