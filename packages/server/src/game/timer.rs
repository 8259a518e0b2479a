//! Cancelable, reschedulable one-shot deadline.
//!
//! A [`PhaseTimer`] owns at most one pending firing. Every arming gets a
//! process-unique generation number which is handed to the callback, so the
//! receiver can tell a current firing from one that raced with a reset.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{task::JoinHandle, time::Instant};

/// Callback invoked with the generation of the arming that fired.
pub type TimerCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Generation value of a timer that is not armed. Never handed out.
pub const DISARMED: u64 = 0;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(DISARMED + 1);

pub struct PhaseTimer {
    callback: TimerCallback,
    expires_at: Instant,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl PhaseTimer {
    /// Arm a timer that invokes `callback` once after `duration`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(duration: Duration, callback: TimerCallback) -> Self {
        let mut timer = Self {
            callback,
            expires_at: Instant::now(),
            generation: DISARMED,
            handle: None,
        };
        timer.arm(duration);
        timer
    }

    /// Time left until the pending firing, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Re-arm with the same callback, canceling any pending firing.
    pub fn reset(&mut self, duration: Duration) {
        self.stop();
        self.arm(duration);
    }

    /// Cancel the pending firing. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = DISARMED;
    }

    /// Generation of the current arming, or [`DISARMED`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn arm(&mut self, duration: Duration) {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let callback = Arc::clone(&self.callback);
        self.generation = generation;
        self.expires_at = Instant::now() + duration;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            callback(generation);
        }));
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for PhaseTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseTimer")
            .field("generation", &self.generation)
            .field("remaining", &self.remaining())
            .finish()
    }
}
