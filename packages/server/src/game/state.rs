//! Gameplay state machine: the seated roster and the active phase.
//!
//! Every operation validates its input against the current state before it
//! touches anything, so a rejected operation leaves the state unchanged.
//! Deadlines are never acted upon here directly: a [`PhaseTimer`] firing
//! calls the [`DeadlineHook`], and the owner feeds the resulting
//! [`DeadlineFired`] back through [`GameplayState::on_deadline`].

use std::{fmt, sync::Arc, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    config::GameTimings,
    domain::{GameError, Profile, User, UserId},
};

use super::{
    appointment::{AppointmentDecision, AppointmentOutcome, AppointmentStatus},
    catalog::CardCatalog,
    timer::PhaseTimer,
    turn::{ActionSelection, GameplayStatus, StorytellingOutcome},
};

#[derive(Debug, Clone, PartialEq)]
pub struct SeatedPlayer {
    pub user: User,
    pub profile: Profile,
}

/// Who performs an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Player(UserId),
    /// A phase deadline acting on behalf of whoever is due.
    Timeout,
}

impl Actor {
    /// Authorization check; the timeout actor may act for anyone.
    pub(crate) fn may_act_as(self, user_id: UserId) -> bool {
        match self {
            Actor::Player(id) => id == user_id,
            Actor::Timeout => true,
        }
    }
}

#[derive(Debug)]
pub enum PhaseStatus {
    Assembly,
    Appointment(AppointmentStatus),
    Gameplay(GameplayStatus),
}

impl PhaseStatus {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseStatus::Assembly => "assembly",
            PhaseStatus::Appointment(_) => "appointment",
            PhaseStatus::Gameplay(_) => "gameplay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    Appointment,
    Gameplay,
}

/// Emitted when a phase deadline elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineFired {
    pub kind: DeadlineKind,
    pub generation: u64,
}

/// Receives deadline firings, typically by enqueueing them to the room loop.
pub type DeadlineHook = Arc<dyn Fn(DeadlineFired) + Send + Sync>;

/// A successful operation: what happened, and the text to log for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<T> {
    pub outcome: T,
    pub log: String,
}

impl<T> Transition<T> {
    pub(crate) fn new(outcome: T, log: String) -> Self {
        Self { outcome, log }
    }
}

/// What a deadline did once it was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DeadlineOutcome {
    Appointment(Transition<AppointmentOutcome>),
    Action(Transition<()>),
    Storytelling(Transition<StorytellingOutcome>),
}

pub struct GameplayState {
    pub(super) players: Vec<SeatedPlayer>,
    pub(super) phase: PhaseStatus,
    pub(super) catalog: Arc<CardCatalog>,
    pub(super) timings: GameTimings,
    pub(super) rng: ChaCha8Rng,
    deadline_hook: DeadlineHook,
}

impl GameplayState {
    pub fn new(catalog: Arc<CardCatalog>, timings: GameTimings, deadline_hook: DeadlineHook) -> Self {
        Self {
            players: Vec::new(),
            phase: PhaseStatus::Assembly,
            catalog,
            timings,
            rng: ChaCha8Rng::from_entropy(),
            deadline_hook,
        }
    }

    /// Replace the random source, for reproducible games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn players(&self) -> &[SeatedPlayer] {
        &self.players
    }

    pub fn phase(&self) -> &PhaseStatus {
        &self.phase
    }

    pub fn is_assembly(&self) -> bool {
        matches!(self.phase, PhaseStatus::Assembly)
    }

    pub fn seat_of(&self, user_id: UserId) -> Option<usize> {
        self.players
            .iter()
            .position(|player| player.user.id == user_id)
    }

    pub fn seat(&mut self, user: User, profile: Profile) -> Result<Transition<()>, GameError> {
        if !self.is_assembly() {
            return Err(GameError::NotInAssembly);
        }
        if !profile.is_owned_by(user.id) {
            return Err(GameError::NotProfileOwner);
        }
        if self.seat_of(user.id).is_some() {
            return Err(GameError::AlreadySeated);
        }
        let log = format!("Player [{}] took a seat", user.nickname);
        self.players.push(SeatedPlayer { user, profile });
        Ok(Transition::new((), log))
    }

    pub fn withdraw(&mut self, user_id: UserId) -> Result<Transition<()>, GameError> {
        if !self.is_assembly() {
            return Err(GameError::NotInAssembly);
        }
        let seat = self.seat_of(user_id).ok_or(GameError::NotSeated)?;
        let player = self.players.remove(seat);
        let log = format!("Player [{}] left their seat", player.user.nickname);
        Ok(Transition::new((), log))
    }

    /// Leave assembly and offer the first move to a random seat.
    ///
    /// Returns the seat of the initial holder candidate.
    pub fn start(&mut self) -> Result<Transition<usize>, GameError> {
        if !self.is_assembly() {
            return Err(GameError::NotInAssembly);
        }
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let holder = self.rng.gen_range(0..self.players.len());
        let timer = self.arm(DeadlineKind::Appointment, self.timings.appointment);
        self.phase = PhaseStatus::Appointment(AppointmentStatus::new(holder, timer));
        let log = format!(
            "{} is offered the first move, awaiting a decision",
            self.label(holder)
        );
        Ok(Transition::new(holder, log))
    }

    /// Back to an empty assembly. Pending deadlines are canceled.
    pub fn reset(&mut self) {
        self.players.clear();
        self.phase = PhaseStatus::Assembly;
    }

    /// Whether `fired` belongs to the deadline currently armed.
    pub fn deadline_matches(&self, fired: DeadlineFired) -> bool {
        match (&self.phase, fired.kind) {
            (PhaseStatus::Appointment(status), DeadlineKind::Appointment) => {
                status.deadline_generation() == fired.generation
            }
            (PhaseStatus::Gameplay(status), DeadlineKind::Gameplay) => {
                status.deadline_generation() == fired.generation
            }
            _ => false,
        }
    }

    /// Act on behalf of whoever the elapsed deadline was waiting for.
    ///
    /// Returns `None` for a stale deadline.
    pub fn on_deadline(
        &mut self,
        fired: DeadlineFired,
    ) -> Option<Result<DeadlineOutcome, GameError>> {
        if !self.deadline_matches(fired) {
            return None;
        }
        let selecting = match &self.phase {
            PhaseStatus::Assembly => return None,
            PhaseStatus::Appointment(_) => None,
            PhaseStatus::Gameplay(status) => Some(status.is_selecting()),
        };
        let outcome = match selecting {
            None => self
                .appointment_decision(Actor::Timeout, AppointmentDecision::Pass)
                .map(DeadlineOutcome::Appointment),
            Some(true) => self
                .action_check(Actor::Timeout, ActionSelection::default())
                .map(DeadlineOutcome::Action),
            Some(false) => self
                .storytelling_end(Actor::Timeout)
                .map(DeadlineOutcome::Storytelling),
        };
        Some(outcome)
    }

    /// "Seat N [nickname]", one-based.
    pub(super) fn label(&self, seat: usize) -> String {
        match self.players.get(seat) {
            Some(player) => format!("Seat {} [{}]", seat + 1, player.user.nickname),
            None => format!("Seat {}", seat + 1),
        }
    }

    pub(super) fn nickname(&self, seat: usize) -> &str {
        self.players
            .get(seat)
            .map(|player| player.user.nickname.as_str())
            .unwrap_or_default()
    }

    pub(super) fn arm(&self, kind: DeadlineKind, duration: Duration) -> PhaseTimer {
        let hook = Arc::clone(&self.deadline_hook);
        PhaseTimer::schedule(
            duration,
            Arc::new(move |generation| hook(DeadlineFired { kind, generation })),
        )
    }
}

impl fmt::Debug for GameplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameplayState")
            .field("players", &self.players)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
