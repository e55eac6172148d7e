//! Single-flight guard for crawl runs.
//!
//! Meant to be held by whatever triggers crawls (a scheduler or an admin
//! endpoint) so that at most one crawl runs per process. Nothing in this
//! workspace triggers crawls yet.
//!
//! The phase lives in an atomic and moves `Idle -> Running -> Idle` only
//! through [`CrawlGate::try_begin`] and dropping the returned [`CrawlPermit`].

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

use crate::CoreError;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    Idle,
    Running,
}

#[derive(Debug)]
pub struct CrawlGate {
    phase: AtomicU8,
}

impl Default for CrawlGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(IDLE),
        }
    }

    #[must_use]
    pub fn phase(&self) -> CrawlPhase {
        match self.phase.load(Ordering::Acquire) {
            RUNNING => CrawlPhase::Running,
            _ => CrawlPhase::Idle,
        }
    }

    /// Moves the gate from idle to running.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CrawlAlreadyRunning`] if another permit is live.
    pub fn try_begin(&self) -> Result<CrawlPermit<'_>, CoreError> {
        self.phase
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::CrawlAlreadyRunning)?;
        tracing::info!("crawl gate: running");
        Ok(CrawlPermit { gate: self })
    }
}

/// Proof that the holder owns the running crawl. Dropping it idles the gate.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the crawl gate"]
pub struct CrawlPermit<'a> {
    gate: &'a CrawlGate,
}

impl Drop for CrawlPermit<'_> {
    fn drop(&mut self) {
        self.gate.phase.store(IDLE, Ordering::Release);
        tracing::info!("crawl gate: idle");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn starts_idle() {
        assert_eq!(CrawlGate::new().phase(), CrawlPhase::Idle);
    }

    #[test]
    fn second_begin_is_rejected_while_running() {
        let gate = CrawlGate::new();
        let permit = gate.try_begin().expect("first begin");
        assert_eq!(gate.phase(), CrawlPhase::Running);
        assert!(matches!(
            gate.try_begin(),
            Err(CoreError::CrawlAlreadyRunning)
        ));
        drop(permit);
        assert_eq!(gate.phase(), CrawlPhase::Idle);
        assert!(gate.try_begin().is_ok());
    }

    #[test]
    fn only_one_thread_wins_the_gate() {
        let gate = Arc::new(CrawlGate::new());
        let start = Arc::new(std::sync::Barrier::new(8));
        let tried = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let start = Arc::clone(&start);
                let tried = Arc::clone(&tried);
                thread::spawn(move || {
                    start.wait();
                    let attempt = gate.try_begin();
                    // Permits stay alive until every contender has tried.
                    tried.wait();
                    i32::from(attempt.is_ok())
                })
            })
            .collect();

        let winners: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(winners, 1);
        assert_eq!(gate.phase(), CrawlPhase::Idle);
    }
}
