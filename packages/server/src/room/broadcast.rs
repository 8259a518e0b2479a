//! Snapshot builders and broadcasts.
//!
//! Everything here runs with the room lock held, so recipients always see a
//! consistent state and in the order the loop produced it.

use crate::{
    domain::{Room, Timestamp, User, UserId},
    game::{AppointmentOutcome, GameplayState, PhaseStatus, RollingLog, StorytellingOutcome},
    infrastructure::dto::{
        http::RoomInfo,
        websocket::{
            AppointmentAcceptMessage, AppointmentPassMessage, AppointmentStatusInfo,
            AssemblyUpdateMessage, GameEndMessage, GameplayProgressMessage, GameplayStatusInfo,
            LogEntryInfo, LogMessage, MessageType, PlayerInfo, ProgressEvent, RoomStateMessage,
            StartMessage,
        },
    },
};

use super::registry::ConnectionRegistry;

/// Room state guarded by the room lock.
#[derive(Debug)]
pub struct RoomInner {
    pub room: Room,
    pub creator: User,
    pub registry: ConnectionRegistry,
    pub gameplay: GameplayState,
    pub log: RollingLog,
}

impl RoomInner {
    pub fn new(room: Room, creator: User, gameplay: GameplayState) -> Self {
        Self {
            room,
            creator,
            registry: ConnectionRegistry::new(),
            gameplay,
            log: RollingLog::new(),
        }
    }

    /// Seated players, then during assembly every connected user without a
    /// seat.
    pub fn players(&self) -> Vec<PlayerInfo> {
        let mut players: Vec<PlayerInfo> = self
            .gameplay
            .players()
            .iter()
            .map(PlayerInfo::seated)
            .collect();
        if self.gameplay.is_assembly() {
            players.extend(
                self.registry
                    .iter()
                    .filter(|connection| self.gameplay.seat_of(connection.user.id).is_none())
                    .map(|connection| PlayerInfo::unseated(&connection.user)),
            );
        }
        players
    }

    /// Full snapshot for one recipient.
    pub fn state_message(&self, user_id: UserId) -> RoomStateMessage {
        let phase = self.gameplay.phase();
        RoomStateMessage {
            r#type: MessageType::RoomState,
            room: RoomInfo::new(&self.room, &self.creator),
            my_index: self.gameplay.seat_of(user_id),
            players: self.players(),
            phase: phase.name().to_string(),
            appointment_status: match phase {
                PhaseStatus::Appointment(status) => Some(AppointmentStatusInfo::from(status)),
                _ => None,
            },
            gameplay_status: match phase {
                PhaseStatus::Gameplay(status) => Some(GameplayStatusInfo::for_seat(
                    status,
                    self.gameplay.seat_of(user_id),
                    ProgressEvent::None,
                )),
                _ => None,
            },
        }
    }

    /// The whole retained log.
    pub fn log_message(&self) -> LogMessage {
        LogMessage {
            r#type: MessageType::Log,
            log: self.log.entries().map(LogEntryInfo::from).collect(),
        }
    }

    /// Append `text` to the log and broadcast the new lines.
    pub fn broadcast_log(&mut self, text: &str, timestamp: Timestamp) {
        let appended = self.log.append(text, timestamp);
        self.registry.broadcast(&LogMessage {
            r#type: MessageType::Log,
            log: appended.iter().map(LogEntryInfo::from).collect(),
        });
    }

    pub fn broadcast_assembly_update(&self, skip: Option<UserId>) {
        let message = AssemblyUpdateMessage {
            r#type: MessageType::AssemblyUpdate,
            players: self.players(),
        };
        self.registry.broadcast_with(skip, |_| message.clone());
    }

    pub fn broadcast_start(&self, holder: usize) {
        self.registry.broadcast_with(None, |connection| StartMessage {
            r#type: MessageType::Start,
            holder,
            my_index: self.gameplay.seat_of(connection.user.id),
        });
    }

    pub fn broadcast_appointment(&self, outcome: AppointmentOutcome) {
        match outcome {
            AppointmentOutcome::Passed {
                prev_holder,
                next_holder,
            } => self.registry.broadcast(&AppointmentPassMessage {
                r#type: MessageType::AppointmentPass,
                prev_holder,
                next_holder,
            }),
            AppointmentOutcome::Started { prev_holder, .. } => {
                let PhaseStatus::Gameplay(status) = self.gameplay.phase() else {
                    return;
                };
                self.registry.broadcast_with(None, |connection| AppointmentAcceptMessage {
                    r#type: MessageType::AppointmentAccept,
                    prev_holder,
                    gameplay_status: GameplayStatusInfo::for_seat(
                        status,
                        self.gameplay.seat_of(connection.user.id),
                        ProgressEvent::None,
                    ),
                });
            }
        }
    }

    pub fn broadcast_progress(&self, event: ProgressEvent) {
        let PhaseStatus::Gameplay(status) = self.gameplay.phase() else {
            return;
        };
        self.registry.broadcast_with(None, |connection| GameplayProgressMessage {
            r#type: MessageType::GameplayProgress,
            gameplay_status: GameplayStatusInfo::for_seat(
                status,
                self.gameplay.seat_of(connection.user.id),
                event,
            ),
        });
    }

    /// Broadcast the result of a finished storytelling turn: progress and
    /// log, or for the final turn the log followed by `game_end`.
    pub fn broadcast_storytelling(
        &mut self,
        outcome: &StorytellingOutcome,
        log: &str,
        timestamp: Timestamp,
    ) {
        match outcome {
            StorytellingOutcome::NextStoryteller { .. } => {
                self.broadcast_progress(ProgressEvent::StorytellingEndNextStoryteller);
                self.broadcast_log(log, timestamp);
            }
            StorytellingOutcome::NewMove { .. } => {
                self.broadcast_progress(ProgressEvent::StorytellingEndNewMove);
                self.broadcast_log(log, timestamp);
            }
            StorytellingOutcome::GameEnd { relationships } => {
                self.broadcast_log(log, timestamp);
                self.registry.broadcast_with(None, |connection| GameEndMessage {
                    r#type: MessageType::GameEnd,
                    relationship: relationships
                        .iter()
                        .find(|(user_id, _)| *user_id == connection.user.id)
                        .map(|(_, row)| row.clone()),
                });
            }
        }
    }
}
