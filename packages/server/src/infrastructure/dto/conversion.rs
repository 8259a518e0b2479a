//! Conversion from domain and game state to DTOs.

use std::time::Duration;

use crate::{
    domain::{Profile, Room, TraitStats, User, ValueObjectError},
    game::{AppointmentStatus, GameplayStatus, LogEntry, SeatedPlayer},
    infrastructure::dto::{http, websocket as dto},
};

/// Seconds rounded to one decimal, as shown to clients.
pub fn seconds_one_decimal(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 10.0).round() / 10.0
}

impl TryFrom<http::StatsInput> for TraitStats {
    type Error = ValueObjectError;

    fn try_from(input: http::StatsInput) -> Result<Self, Self::Error> {
        match input {
            http::StatsInput::List(values) => TraitStats::from_slice(&values),
            http::StatsInput::Text(text) => TraitStats::parse(&text),
        }
    }
}

impl From<&User> for http::UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            nickname: user.nickname.as_str().to_string(),
        }
    }
}

impl http::ProfileInfo {
    pub fn new(profile: &Profile, creator: &User) -> Self {
        Self {
            id: profile.id.value(),
            creator: creator.into(),
            details: profile.details.clone(),
            stats: *profile.stats.as_array(),
            traits: profile.traits.clone(),
        }
    }
}

impl http::RoomInfo {
    pub fn new(room: &Room, creator: &User) -> Self {
        Self {
            id: room.id.value(),
            creator: creator.into(),
            created_at: room.created_at.value(),
            title: room.title.clone(),
            tags: room.tags.clone(),
            description: room.description.clone(),
        }
    }
}

impl From<&LogEntry> for dto::LogEntryInfo {
    fn from(entry: &LogEntry) -> Self {
        Self {
            id: entry.id,
            timestamp: entry.timestamp.value(),
            content: entry.content.clone(),
        }
    }
}

impl dto::PlayerInfo {
    pub fn seated(player: &SeatedPlayer) -> Self {
        let profile = &player.profile;
        Self {
            id: Some(profile.id.value()),
            creator: (&player.user).into(),
            details: Some(profile.details.clone()),
            stats: Some(profile.stats.as_array().to_vec()),
            traits: Some(profile.traits.clone()),
        }
    }

    pub fn unseated(user: &User) -> Self {
        Self {
            id: None,
            creator: user.into(),
            details: None,
            stats: None,
            traits: None,
        }
    }
}

impl From<&AppointmentStatus> for dto::AppointmentStatusInfo {
    fn from(status: &AppointmentStatus) -> Self {
        Self {
            holder: status.holder,
            timer: seconds_one_decimal(status.remaining()),
        }
    }
}

impl dto::GameplayStatusInfo {
    /// Snapshot of `status` for the player at `seat`.
    pub fn for_seat(status: &GameplayStatus, seat: Option<usize>, event: dto::ProgressEvent) -> Self {
        let sheet = seat.and_then(|seat| status.sheets.get(seat));
        let pending = status.pending.as_ref();
        let target_roll = pending.and_then(|pending| pending.target_roll);
        Self {
            event,
            act_count: status.act,
            round_count: status.round,
            move_count: status.move_count,
            relationship: sheet.map(|sheet| sheet.relationship.clone()),
            action_points: sheet.map(|sheet| sheet.action_points),
            hand: sheet.map(|sheet| sheet.hand.clone()),
            arena: status.arena.clone(),
            holder: status.holder,
            step: status.step.as_str().to_string(),
            action: pending.map(|pending| pending.card.clone()),
            keyword: pending.map(|pending| pending.keyword_index),
            target: pending.and_then(|pending| pending.target),
            holder_difficulty: pending.map(|pending| pending.holder_roll.difficulty),
            holder_result: pending.map(|pending| pending.holder_roll.outcome.code()),
            target_difficulty: target_roll.map(|roll| roll.difficulty),
            target_result: target_roll.map(|roll| roll.outcome.code()),
            timer: seconds_one_decimal(status.remaining()),
            queue: status.queue.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Nickname, RoomId, Timestamp, UserId},
        game::{
            Actor, ActionSelection, AppointmentDecision, PhaseStatus,
            state::test_support::seated,
        },
    };

    #[test]
    fn test_stats_input_conversion() {
        // テスト項目: 配列形式と文字列形式の能力値が同じ TraitStats になり、範囲外は拒否される
        // given (前提条件):
        let list = http::StatsInput::List(vec![10, 20, 30, 40, 50, 60, 70, 80]);
        let text = http::StatsInput::Text("10, 20,30,40,50,60,70,80".to_string());
        let short = http::StatsInput::List(vec![10, 20]);
        let high = http::StatsInput::Text("10,20,30,40,50,60,70,95".to_string());

        // when (操作):
        let list = TraitStats::try_from(list);
        let text = TraitStats::try_from(text);

        // then (期待する結果):
        assert_eq!(list, text);
        assert!(list.is_ok());
        assert_eq!(
            TraitStats::try_from(short),
            Err(ValueObjectError::StatsLength(2))
        );
        assert_eq!(
            TraitStats::try_from(high),
            Err(ValueObjectError::StatValue("95".to_string()))
        );
    }

    #[test]
    fn test_seconds_rounded_to_one_decimal() {
        // テスト項目: 残り時間が小数第 1 位に丸められる
        // given (前提条件):
        let duration = Duration::from_millis(29_961);

        // when (操作):
        let seconds = seconds_one_decimal(duration);

        // then (期待する結果):
        assert_eq!(seconds, 30.0);
        assert_eq!(seconds_one_decimal(Duration::from_millis(12_340)), 12.3);
        assert_eq!(seconds_one_decimal(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_room_info() {
        // テスト項目: ルームが作成者情報付きで変換される
        // given (前提条件):
        let creator = User::new(UserId::new(1), Nickname::new("alice".to_string()).unwrap());
        let room = Room {
            id: RoomId::new(9),
            creator: creator.id,
            created_at: Timestamp::new(1_700_000_000),
            title: "Tea party".to_string(),
            tags: vec!["casual".to_string()],
            description: "".to_string(),
        };

        // when (操作):
        let info = http::RoomInfo::new(&room, &creator);

        // then (期待する結果):
        assert_eq!(info.id, 9);
        assert_eq!(info.creator.nickname, "alice");
        assert_eq!(info.created_at, 1_700_000_000);
        assert_eq!(info.tags, vec!["casual".to_string()]);
    }

    #[tokio::test]
    async fn test_gameplay_status_per_seat() {
        // テスト項目: 着席者には自分の手札と関係値、未着席者には null が渡される
        // given (前提条件):
        let mut state = seated(2, 4);
        state.start().unwrap();
        state
            .appointment_decision(Actor::Timeout, AppointmentDecision::Accept)
            .unwrap();
        let PhaseStatus::Gameplay(status) = state.phase() else {
            panic!("expected gameplay");
        };

        // when (操作):
        let mine = dto::GameplayStatusInfo::for_seat(status, Some(1), dto::ProgressEvent::None);
        let spectator = dto::GameplayStatusInfo::for_seat(status, None, dto::ProgressEvent::None);

        // then (期待する結果):
        assert_eq!(mine.hand.as_ref(), Some(&status.sheets[1].hand));
        assert_eq!(mine.action_points, Some(1));
        assert_eq!(mine.relationship, Some(vec![[0.0; 3]; 2]));
        assert_eq!(mine.step, "selection");
        assert!(mine.action.is_none() && mine.holder_difficulty.is_none());
        assert!(spectator.hand.is_none());
        assert!(spectator.relationship.is_none());
        assert_eq!(spectator.arena, mine.arena);
        assert!(mine.timer > 59.0 && mine.timer <= 60.0);
    }

    #[tokio::test]
    async fn test_gameplay_status_mid_action() {
        // テスト項目: 行動後は行動内容と判定結果が含まれ、対象なしなら対象側は null
        // given (前提条件):
        let mut state = seated(2, 4);
        state.start().unwrap();
        state
            .appointment_decision(Actor::Timeout, AppointmentDecision::Accept)
            .unwrap();
        state
            .action_check(Actor::Timeout, ActionSelection::default())
            .unwrap();
        let PhaseStatus::Gameplay(status) = state.phase() else {
            panic!("expected gameplay");
        };

        // when (操作):
        let info =
            dto::GameplayStatusInfo::for_seat(status, Some(0), dto::ProgressEvent::ActionCheck);

        // then (期待する結果):
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["event"], "action_check");
        assert_eq!(json["step"], "storytelling_holder");
        assert!(json["action"].is_string());
        assert!(json["keyword"].is_u64());
        assert!(json["holder_result"].is_i64());
        assert!(json["target"].is_null());
        assert!(json["target_difficulty"].is_null());
        assert!(json["target_result"].is_null());
    }
}
