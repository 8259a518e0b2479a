//! Gameplay phase: moves, storytelling, rounds and acts.

use std::{collections::VecDeque, time::Duration};

use rand::{Rng, seq::SliceRandom};

use crate::domain::{GameError, UserId};

use super::{
    catalog::Card,
    resolution::{self, Roll},
    state::{Actor, DeadlineKind, GameplayState, PhaseStatus, Transition},
    timer::PhaseTimer,
};

/// Rounds in each act, acts numbered from 1.
pub const ROUNDS_PER_ACT: [u32; 4] = [1, 2, 1, 1];

/// The game ends when the act counter would pass this.
pub const FINAL_ACT: u32 = ROUNDS_PER_ACT.len() as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Selection,
    StorytellingHolder,
    StorytellingTarget,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Selection => "selection",
            Step::StorytellingHolder => "storytelling_holder",
            Step::StorytellingTarget => "storytelling_target",
        }
    }
}

/// Per-player gameplay state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSheet {
    pub hand: Vec<String>,
    pub action_points: u32,
    /// `relationship[j]` is this player's accumulated delta toward seat `j`.
    pub relationship: Vec<[f32; 3]>,
}

/// The action being narrated. Present only outside the selection step.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub card: String,
    pub keyword_index: usize,
    pub keyword: String,
    pub target: Option<usize>,
    pub holder_roll: Roll,
    pub target_roll: Option<Roll>,
}

#[derive(Debug)]
pub struct GameplayStatus {
    pub act: u32,
    pub round: u32,
    pub move_count: u32,
    pub holder: usize,
    pub step: Step,
    pub arena: Vec<String>,
    pub sheets: Vec<PlayerSheet>,
    /// Seats asking to hold the next move, in request order.
    pub queue: VecDeque<usize>,
    pub pending: Option<PendingAction>,
    timer: PhaseTimer,
}

impl GameplayStatus {
    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn is_selecting(&self) -> bool {
        self.step == Step::Selection
    }

    pub(super) fn deadline_generation(&self) -> u64 {
        self.timer.generation()
    }
}

/// Indices chosen by the holder, as received.
///
/// A `target` of `None` or `-1` means no target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSelection {
    pub hand_index: i64,
    pub arena_index: i64,
    pub target: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorytellingOutcome {
    /// The target now narrates their side.
    NextStoryteller { storyteller: usize, next: usize },
    /// The move was committed and `holder` selects next.
    NewMove {
        storyteller: usize,
        holder: usize,
        new_round: bool,
    },
    /// The final act is over. The state has already been reset.
    GameEnd {
        relationships: Vec<(UserId, Vec<[f32; 3]>)>,
    },
}

fn check_index(value: i64, len: usize, field: &'static str) -> Result<usize, GameError> {
    usize::try_from(value)
        .ok()
        .filter(|&index| index < len)
        .ok_or(GameError::OutOfRange(field))
}

fn random_index<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    field: &'static str,
) -> Result<usize, GameError> {
    if len == 0 {
        return Err(GameError::OutOfRange(field));
    }
    Ok(rng.gen_range(0..len))
}

impl GameplayState {
    /// Enter gameplay with `holder` selecting first.
    pub(super) fn begin_gameplay(&mut self, holder: usize) {
        let player_count = self.players.len();
        let mut sheets = Vec::with_capacity(player_count);
        for _ in 0..player_count {
            let mut hand = Vec::new();
            self.catalog.fill_hand(&mut hand, &mut self.rng);
            sheets.push(PlayerSheet {
                hand,
                action_points: 1,
                relationship: vec![[0.0; 3]; player_count],
            });
        }
        let mut arena = Vec::new();
        self.catalog
            .fill_arena(&mut arena, player_count, &mut self.rng);
        let timer = self.arm(DeadlineKind::Gameplay, self.timings.card_selection);

        self.phase = PhaseStatus::Gameplay(GameplayStatus {
            act: 1,
            round: 1,
            move_count: 1,
            holder,
            step: Step::Selection,
            arena,
            sheets,
            queue: VecDeque::new(),
            pending: None,
            timer,
        });
    }

    /// Resolve the holder's card selection.
    ///
    /// The timeout actor ignores `selection` and plays a random card on a
    /// random keyword without a target.
    pub fn action_check(
        &mut self,
        actor: Actor,
        selection: ActionSelection,
    ) -> Result<Transition<()>, GameError> {
        let player_count = self.players.len();
        let PhaseStatus::Gameplay(status) = &mut self.phase else {
            return Err(GameError::NotInGameplay);
        };
        if status.step != Step::Selection {
            return Err(GameError::NotInSelectionStep);
        }
        let seat = status.holder;
        let holder = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::Inconsistent(format!("holder seat {seat}")))?;
        if !actor.may_act_as(holder.user.id) {
            return Err(GameError::NotHolder);
        }
        let sheet = &status.sheets[seat];
        if sheet.action_points == 0 {
            return Err(GameError::NoActionPoints);
        }

        let (hand_index, arena_index, target) = match actor {
            Actor::Timeout => (
                random_index(&mut self.rng, sheet.hand.len(), "hand_index")?,
                random_index(&mut self.rng, status.arena.len(), "arena_index")?,
                None,
            ),
            Actor::Player(_) => {
                let hand_index = check_index(selection.hand_index, sheet.hand.len(), "hand_index")?;
                let arena_index =
                    check_index(selection.arena_index, status.arena.len(), "arena_index")?;
                let target = match selection.target {
                    None | Some(-1) => None,
                    Some(target) => Some(check_index(target, player_count, "target")?),
                };
                (hand_index, arena_index, target)
            }
        };
        let target = target.filter(|&target| target != seat);

        let card: &Card = self
            .catalog
            .card(&sheet.hand[hand_index])
            .ok_or_else(|| GameError::Inconsistent(format!("unknown card {}", sheet.hand[hand_index])))?;

        // Validated; from here on the state changes.
        let holder_roll = resolution::roll(&mut self.rng, 0, &holder.profile.stats, card);
        let target_roll = match target {
            Some(target) => Some(resolution::roll(
                &mut self.rng,
                holder_roll.outcome.target_shift(),
                &self.players[target].profile.stats,
                card,
            )),
            None => None,
        };
        if let (Some(target), Some(target_roll)) = (target, target_roll) {
            resolution::apply_delta(
                &mut status.sheets[seat].relationship[target],
                card,
                holder_roll.outcome,
            );
            resolution::apply_delta(
                &mut status.sheets[target].relationship[seat],
                card,
                target_roll.outcome,
            );
        }

        let sheet = &mut status.sheets[seat];
        let card_name = sheet.hand.remove(hand_index);
        sheet.action_points -= 1;
        let pending = PendingAction {
            card: card_name,
            keyword_index: arena_index,
            keyword: status.arena[arena_index].clone(),
            target,
            holder_roll,
            target_roll,
        };
        status.step = Step::StorytellingHolder;
        status.timer.reset(self.timings.storytelling);
        let log = self.action_log(seat, &pending);
        if let PhaseStatus::Gameplay(status) = &mut self.phase {
            status.pending = Some(pending);
        }
        Ok(Transition::new((), log))
    }

    /// The active storyteller is done narrating.
    pub fn storytelling_end(
        &mut self,
        actor: Actor,
    ) -> Result<Transition<StorytellingOutcome>, GameError> {
        let player_count = self.players.len();
        let PhaseStatus::Gameplay(status) = &mut self.phase else {
            return Err(GameError::NotInGameplay);
        };
        let (storyteller, next, keyword_index) = match (status.step, &status.pending) {
            (Step::StorytellingHolder, Some(pending)) => {
                (status.holder, pending.target, pending.keyword_index)
            }
            (Step::StorytellingTarget, Some(pending)) => (
                pending.target.unwrap_or(status.holder),
                None,
                pending.keyword_index,
            ),
            _ => return Err(GameError::NotInStorytellingStep),
        };
        let storyteller_id = self
            .players
            .get(storyteller)
            .map(|player| player.user.id)
            .ok_or_else(|| GameError::Inconsistent(format!("storyteller seat {storyteller}")))?;
        if !actor.may_act_as(storyteller_id) {
            return Err(GameError::NotStoryteller);
        }

        if let Some(next) = next {
            status.step = Step::StorytellingTarget;
            status.timer.reset(self.timings.storytelling_continuation);
            let log = format!(
                "{} finished storytelling\nNow {} continues the story",
                self.label(storyteller),
                self.label(next)
            );
            return Ok(Transition::new(
                StorytellingOutcome::NextStoryteller { storyteller, next },
                log,
            ));
        }

        // Commit the move.
        status.move_count += 1;
        if keyword_index < status.arena.len() {
            status.arena.remove(keyword_index);
        }
        self.catalog
            .fill_hand(&mut status.sheets[status.holder].hand, &mut self.rng);
        status.pending = None;
        status.step = Step::Selection;

        let mut queued = None;
        while let Some(seat) = status.queue.pop_front() {
            if status.sheets[seat].action_points > 0 {
                queued = Some(seat);
                break;
            }
        }
        let ready: Vec<usize> = (0..player_count)
            .filter(|&seat| status.sheets[seat].action_points > 0)
            .collect();
        let next_holder = queued.or_else(|| ready.choose(&mut self.rng).copied());

        let (holder, new_round) = match next_holder {
            Some(holder) => (holder, false),
            None => {
                status.round += 1;
                status.move_count = 1;
                let quota = ROUNDS_PER_ACT
                    .get(status.act as usize - 1)
                    .copied()
                    .unwrap_or(1);
                if status.round > quota {
                    status.act += 1;
                    status.round = 1;
                }
                if status.act > FINAL_ACT {
                    return Ok(self.end_game(storyteller));
                }
                self.catalog
                    .fill_arena(&mut status.arena, player_count, &mut self.rng);
                for sheet in &mut status.sheets {
                    sheet.action_points = 1;
                }
                (self.rng.gen_range(0..player_count), true)
            }
        };
        status.holder = holder;
        status.timer.reset(self.timings.card_selection);
        let progress = if new_round {
            format!("[Act {}, Round {}]", status.act, status.round)
        } else {
            "Next move,".to_string()
        };
        let log = format!(
            "{} finished storytelling\n{} {} selects a card",
            self.label(storyteller),
            progress,
            self.label(holder)
        );
        Ok(Transition::new(
            StorytellingOutcome::NewMove {
                storyteller,
                holder,
                new_round,
            },
            log,
        ))
    }

    /// Ask to hold the next move. Returns the queued seat.
    pub fn queue(&mut self, user_id: UserId) -> Result<usize, GameError> {
        let seat = self.seat_of(user_id);
        let PhaseStatus::Gameplay(status) = &mut self.phase else {
            return Err(GameError::NotInGameplay);
        };
        let seat = seat.ok_or(GameError::NotSeated)?;
        if status.sheets[seat].action_points == 0 {
            return Err(GameError::NoActionPoints);
        }
        if let Some(position) = status.queue.iter().position(|&queued| queued == seat) {
            return Err(GameError::AlreadyQueued(position));
        }
        status.queue.push_back(seat);
        Ok(seat)
    }

    fn end_game(&mut self, storyteller: usize) -> Transition<StorytellingOutcome> {
        let relationships = match &self.phase {
            PhaseStatus::Gameplay(status) => self
                .players
                .iter()
                .zip(&status.sheets)
                .map(|(player, sheet)| (player.user.id, sheet.relationship.clone()))
                .collect(),
            _ => Vec::new(),
        };
        let log = format!("{} finished storytelling\nGame over!", self.label(storyteller));
        self.reset();
        Transition::new(StorytellingOutcome::GameEnd { relationships }, log)
    }

    fn action_log(&self, seat: usize, pending: &PendingAction) -> String {
        let holder = self.label(seat);
        let holder_result = format!(
            "difficulty {}, result [{}]",
            pending.holder_roll.difficulty,
            pending.holder_roll.outcome.label()
        );
        let narrator = self.nickname(seat);
        match (pending.target, pending.target_roll) {
            (Some(target), Some(target_roll)) => format!(
                "{holder} played [{}] on {} with keyword [{}]\nActor {holder_result}\nTarget difficulty {}, result [{}]\nNow [{narrator}] tells the story",
                pending.card,
                self.label(target),
                pending.keyword,
                target_roll.difficulty,
                target_roll.outcome.label(),
            ),
            _ => format!(
                "{holder} played [{}] with keyword [{}]\nActor {holder_result}\nNow [{narrator}] tells the story",
                pending.card, pending.keyword,
            ),
        }
    }
}
