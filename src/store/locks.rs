//! Advisory per-award write locks.
//!
//! Compile and calculation runs are delete-then-insert, so two writers on
//! the same award code must never interleave. The registry admits at most
//! one in-flight operation per award; a second caller is rejected with
//! [`EngineError::CompileInFlight`] rather than queued. Operations on
//! disjoint award codes proceed concurrently.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{EngineError, EngineResult};

/// Registry of award codes with an in-flight compile or calculation.
#[derive(Debug, Default)]
pub struct AwardLockRegistry {
    in_flight: Mutex<HashSet<String>>,
}

impl AwardLockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the write lock for an award code.
    ///
    /// Returns a guard that releases the claim on drop, or
    /// [`EngineError::CompileInFlight`] if another operation already
    /// holds it.
    pub fn acquire(&self, award_code: &str) -> EngineResult<AwardLockGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| EngineError::storage("award lock registry poisoned"))?;

        if !in_flight.insert(award_code.to_string()) {
            return Err(EngineError::CompileInFlight {
                award_code: award_code.to_string(),
            });
        }

        Ok(AwardLockGuard {
            registry: self,
            award_code: award_code.to_string(),
        })
    }

    /// Returns true if an operation currently holds the award's lock.
    pub fn is_locked(&self, award_code: &str) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(award_code))
            .unwrap_or(false)
    }
}

/// Holds one award's write claim; released on drop.
#[derive(Debug)]
pub struct AwardLockGuard<'a> {
    registry: &'a AwardLockRegistry,
    award_code: String,
}

impl Drop for AwardLockGuard<'_> {
    fn drop(&mut self) {
        // A poisoned registry means a writer panicked; nothing left to
        // release safely, and the process is on its way down.
        if let Ok(mut in_flight) = self.registry.in_flight.lock() {
            in_flight.remove(&self.award_code);
        }
    }
}
