//! Appointment phase: deciding who makes the first move.

use std::time::Duration;

use rand::Rng;

use crate::domain::GameError;

use super::{
    state::{Actor, GameplayState, PhaseStatus, Transition},
    timer::PhaseTimer,
};

#[derive(Debug)]
pub struct AppointmentStatus {
    /// Seat currently offered the first move.
    pub holder: usize,
    /// Passes so far, bounded by twice the player count.
    pub pass_count: usize,
    timer: PhaseTimer,
}

impl AppointmentStatus {
    pub(super) fn new(holder: usize, timer: PhaseTimer) -> Self {
        Self {
            holder,
            pass_count: 0,
            timer,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub(super) fn deadline_generation(&self) -> u64 {
        self.timer.generation()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentDecision {
    Accept,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOutcome {
    /// The offer moved on to the next seat.
    Passed {
        prev_holder: usize,
        next_holder: usize,
    },
    /// Gameplay began. `prev_holder` is set when the start was forced after
    /// a final pass.
    Started {
        prev_holder: Option<usize>,
        holder: usize,
    },
}

impl GameplayState {
    pub fn appointment_decision(
        &mut self,
        actor: Actor,
        decision: AppointmentDecision,
    ) -> Result<Transition<AppointmentOutcome>, GameError> {
        let player_count = self.players.len();
        let PhaseStatus::Appointment(status) = &mut self.phase else {
            return Err(GameError::NotInAppointment);
        };
        let holder = status.holder;
        let holder_id = self
            .players
            .get(holder)
            .map(|player| player.user.id)
            .ok_or_else(|| GameError::Inconsistent(format!("appointment holder {holder}")))?;
        if !actor.may_act_as(holder_id) {
            return Err(GameError::NotHolder);
        }

        match decision {
            AppointmentDecision::Accept => {
                self.begin_gameplay(holder);
                let log = format!(
                    "{} accepted the appointment and makes the first move",
                    self.label(holder)
                );
                Ok(Transition::new(
                    AppointmentOutcome::Started {
                        prev_holder: None,
                        holder,
                    },
                    log,
                ))
            }
            AppointmentDecision::Pass if status.pass_count + 1 < 2 * player_count => {
                let next_holder = (holder + 1) % player_count;
                status.pass_count += 1;
                status.holder = next_holder;
                status.timer.reset(self.timings.appointment);
                let log = format!(
                    "{} passed the appointment, now {} decides",
                    self.label(holder),
                    self.label(next_holder)
                );
                Ok(Transition::new(
                    AppointmentOutcome::Passed {
                        prev_holder: holder,
                        next_holder,
                    },
                    log,
                ))
            }
            AppointmentDecision::Pass => {
                let chosen = self.rng.gen_range(0..player_count);
                self.begin_gameplay(chosen);
                let log = format!(
                    "{} passed the appointment. {} was drawn at random to make the first move",
                    self.label(holder),
                    self.label(chosen)
                );
                Ok(Transition::new(
                    AppointmentOutcome::Started {
                        prev_holder: Some(holder),
                        holder: chosen,
                    },
                    log,
                ))
            }
        }
    }
}
