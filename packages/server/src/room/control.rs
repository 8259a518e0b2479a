//! The room control loop.
//!
//! The only writer of gameplay state. Inbound messages, internal signals and
//! the debug tick are processed one at a time, each to completion, and the
//! broadcasts of one event are queued before the next event is looked at.

use std::sync::Arc;

use tokio::{
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    domain::{GameError, Profile, ProfileId, Timestamp, UserId},
    game::{ActionSelection, Actor, AppointmentDecision, DeadlineFired, DeadlineOutcome},
    infrastructure::dto::websocket::{ClientMessage, ErrorMessage, ProgressEvent},
};

use super::{
    broadcast::RoomInner,
    directory::RoomDirectory,
    game_room::{GameRoom, InboundMessage, RoomContext, RoomSignal},
};

pub(super) struct RoomLoop {
    room: Arc<GameRoom>,
    directory: Arc<RoomDirectory>,
    inbound: mpsc::Receiver<InboundMessage>,
    signals: mpsc::UnboundedReceiver<RoomSignal>,
}

impl RoomLoop {
    pub(super) fn new(
        room: Arc<GameRoom>,
        directory: Arc<RoomDirectory>,
        inbound: mpsc::Receiver<InboundMessage>,
        signals: mpsc::UnboundedReceiver<RoomSignal>,
    ) -> Self {
        Self {
            room,
            directory,
            inbound,
            signals,
        }
    }

    fn context(&self) -> &RoomContext {
        self.directory.context()
    }

    /// Run until the creator has been absent for the configured window.
    pub(super) async fn run(mut self) {
        let timings = self.context().timings;
        let creator_id = self.room.creator_id();
        let mut tick = time::interval(timings.room_tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut creator_present = self.room.read().await.registry.contains(creator_id);
        let absence = time::sleep(timings.creator_absence);
        tokio::pin!(absence);

        loop {
            tokio::select! {
                Some(message) = self.inbound.recv() => self.on_message(message).await,
                Some(signal) = self.signals.recv() => self.on_signal(signal).await,
                _ = tick.tick() => self.on_tick().await,
                _ = &mut absence, if !creator_present => {
                    tracing::info!(
                        "Room {}: creator absent for {:?}, closing",
                        self.room.id(),
                        timings.creator_absence
                    );
                    break;
                }
            }

            let present = self.room.read().await.registry.contains(creator_id);
            if creator_present && !present {
                absence
                    .as_mut()
                    .reset(Instant::now() + timings.creator_absence);
            }
            creator_present = present;
        }

        self.close().await;
    }

    async fn close(&self) {
        self.room.mark_closed();
        self.directory.remove(&self.room).await;
        let mut inner = self.room.write().await;
        inner.gameplay.reset();
        inner.registry.close_all();
        tracing::info!("Room {} closed", self.room.id());
    }

    async fn on_tick(&self) {
        let inner = self.room.read().await;
        tracing::trace!(
            "Room {}: {} connection(s), phase {}",
            self.room.id(),
            inner.registry.len(),
            inner.gameplay.phase().name()
        );
    }

    async fn on_message(&self, inbound: InboundMessage) {
        let InboundMessage { user_id, message } = inbound;
        let result = match message {
            Ok(message) => {
                tracing::debug!("Room {}: user {} sent {:?}", self.room.id(), user_id, message);
                self.handle(user_id, message).await
            }
            Err(reason) => Err(GameError::MalformedMessage(reason)),
        };
        if let Err(e) = result {
            tracing::warn!(
                "Room {}: rejected message from user {}: {}",
                self.room.id(),
                user_id,
                e
            );
            self.room.read().await.registry.push_to(
                user_id,
                &ErrorMessage {
                    error: e.to_string(),
                },
            );
        }
    }

    async fn handle(&self, user_id: UserId, message: ClientMessage) -> Result<(), GameError> {
        let now = self.context().now();
        let mut guard = self.room.write().await;
        let inner = &mut *guard;
        let Some(user) = inner.registry.get(user_id).map(|c| c.user.clone()) else {
            tracing::debug!(
                "Room {}: dropping message from disconnected user {}",
                self.room.id(),
                user_id
            );
            return Ok(());
        };

        match message {
            ClientMessage::Seat { profile_id } => {
                if !inner.gameplay.is_assembly() {
                    return Err(GameError::NotInAssembly);
                }
                let profile = self.load_profile(profile_id).await?;
                let transition = inner.gameplay.seat(user, profile)?;
                inner.broadcast_assembly_update(None);
                inner.broadcast_log(&transition.log, now);
            }
            ClientMessage::Withdraw => {
                let transition = inner.gameplay.withdraw(user_id)?;
                inner.broadcast_assembly_update(None);
                inner.broadcast_log(&transition.log, now);
            }
            ClientMessage::Start => {
                if !inner.gameplay.is_assembly() {
                    return Err(GameError::NotInAssembly);
                }
                if user_id != inner.creator.id {
                    return Err(GameError::NotCreator);
                }
                if let Some(unseated) = inner
                    .registry
                    .user_ids()
                    .find(|id| inner.gameplay.seat_of(*id).is_none())
                {
                    return Err(GameError::PlayerNotSeated(unseated));
                }
                let transition = inner.gameplay.start()?;
                inner.broadcast_start(transition.outcome);
                inner.broadcast_log(&transition.log, now);
            }
            ClientMessage::AppointmentAccept => {
                appoint(inner, user_id, AppointmentDecision::Accept, now)?;
            }
            ClientMessage::AppointmentPass => {
                appoint(inner, user_id, AppointmentDecision::Pass, now)?;
            }
            ClientMessage::Action {
                hand_index,
                arena_index,
                target,
            } => {
                let selection = ActionSelection {
                    hand_index,
                    arena_index,
                    target,
                };
                let transition = inner
                    .gameplay
                    .action_check(Actor::Player(user_id), selection)?;
                inner.broadcast_progress(ProgressEvent::ActionCheck);
                inner.broadcast_log(&transition.log, now);
            }
            ClientMessage::StorytellingEnd => {
                let transition = inner.gameplay.storytelling_end(Actor::Player(user_id))?;
                inner.broadcast_storytelling(&transition.outcome, &transition.log, now);
            }
            ClientMessage::Queue => {
                inner.gameplay.queue(user_id)?;
                inner.broadcast_progress(ProgressEvent::Queue);
            }
            ClientMessage::Comment { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(GameError::MalformedMessage("empty comment".to_string()));
                }
                let line = match inner.gameplay.seat_of(user_id) {
                    Some(seat) if !inner.gameplay.is_assembly() => {
                        format!("Seat {} [{}] says: {}", seat + 1, user.nickname, text)
                    }
                    _ => format!("[{}] says: {}", user.nickname, text),
                };
                inner.broadcast_log(&line, now);
            }
        }
        Ok(())
    }

    async fn load_profile(&self, profile_id: i64) -> Result<Profile, GameError> {
        let id = ProfileId::new(profile_id);
        self.context()
            .profiles
            .find(id)
            .await?
            .ok_or(GameError::ProfileNotFound(id))
    }

    async fn on_signal(&self, signal: RoomSignal) {
        match signal {
            RoomSignal::NewConn { user_id, conn_id } => {
                let inner = self.room.read().await;
                let current = inner
                    .registry
                    .get(user_id)
                    .is_some_and(|connection| connection.id == conn_id);
                if current && inner.gameplay.is_assembly() {
                    inner.broadcast_assembly_update(Some(user_id));
                }
            }
            RoomSignal::LostConn { user_id, conn_id } => {
                let mut inner = self.room.write().await;
                if inner.registry.remove(user_id, conn_id).is_none() {
                    tracing::debug!(
                        "Room {}: connection {} of user {} was already replaced",
                        self.room.id(),
                        conn_id,
                        user_id
                    );
                    return;
                }
                if inner.gameplay.is_assembly() {
                    inner.broadcast_assembly_update(None);
                }
            }
            RoomSignal::Deadline(fired) => self.on_deadline(fired).await,
        }
    }

    async fn on_deadline(&self, fired: DeadlineFired) {
        let now = self.context().now();
        let mut guard = self.room.write().await;
        let inner = &mut *guard;
        match inner.gameplay.on_deadline(fired) {
            None => tracing::trace!("Room {}: stale deadline {:?}", self.room.id(), fired),
            Some(Err(e)) => tracing::warn!(
                "Room {}: acting on {:?} deadline failed: {}",
                self.room.id(),
                fired.kind,
                e
            ),
            Some(Ok(outcome)) => {
                tracing::info!("Room {}: {:?} deadline elapsed", self.room.id(), fired.kind);
                broadcast_deadline(inner, outcome, now);
            }
        }
    }
}

fn appoint(
    inner: &mut RoomInner,
    user_id: UserId,
    decision: AppointmentDecision,
    now: Timestamp,
) -> Result<(), GameError> {
    let transition = inner
        .gameplay
        .appointment_decision(Actor::Player(user_id), decision)?;
    inner.broadcast_appointment(transition.outcome);
    inner.broadcast_log(&transition.log, now);
    Ok(())
}

fn broadcast_deadline(inner: &mut RoomInner, outcome: DeadlineOutcome, now: Timestamp) {
    match outcome {
        DeadlineOutcome::Appointment(transition) => {
            inner.broadcast_appointment(transition.outcome);
            inner.broadcast_log(&transition.log, now);
        }
        DeadlineOutcome::Action(transition) => {
            inner.broadcast_progress(ProgressEvent::ActionCheck);
            inner.broadcast_log(&transition.log, now);
        }
        DeadlineOutcome::Storytelling(transition) => {
            inner.broadcast_storytelling(&transition.outcome, &transition.log, now);
        }
    }
}
