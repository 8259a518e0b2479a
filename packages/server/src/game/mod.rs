//! Game rules: timers, catalog, resolution, the rolling log and the
//! phase state machine.
//!
//! Nothing here talks to the network. The room actor owns one
//! [`GameplayState`] and is its only writer.

pub mod appointment;
pub mod catalog;
pub mod log;
pub mod resolution;
pub mod state;
pub mod timer;
pub mod turn;

pub use appointment::{AppointmentDecision, AppointmentOutcome, AppointmentStatus};
pub use catalog::{Card, CardCatalog, CatalogError, HAND_SIZE};
pub use log::{LogEntry, RollingLog};
pub use resolution::{Outcome, Roll};
pub use state::{
    Actor, DeadlineFired, DeadlineHook, DeadlineKind, DeadlineOutcome, GameplayState, PhaseStatus,
    SeatedPlayer, Transition,
};
pub use timer::PhaseTimer;
pub use turn::{
    ActionSelection, GameplayStatus, PendingAction, PlayerSheet, Step, StorytellingOutcome,
};
