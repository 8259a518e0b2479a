//! HTTP API DTOs and resource representations.

use serde::{Deserialize, Serialize};

use crate::domain::TRAIT_COUNT;

/// A user as shown to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub id: i64,
    pub creator: UserInfo,
    pub details: serde_json::Value,
    pub stats: [u8; TRAIT_COUNT],
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: i64,
    pub creator: UserInfo,
    pub created_at: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInRequest {
    pub id: i64,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub user: UserInfo,
    pub token: String,
}

/// Trait stats as sent by clients: a list of numbers or `"a,b,..."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsInput {
    List(Vec<i64>),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreateRequest {
    #[serde(default)]
    pub details: serde_json::Value,
    pub stats: StatsInput,
    #[serde(default)]
    pub traits: Vec<String>,
}

/// Partial update; absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub details: Option<serde_json::Value>,
    pub stats: Option<StatsInput>,
    pub traits: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreateRequest {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Partial update; absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdateRequest {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_input_accepts_both_forms() {
        // テスト項目: 能力値は数値配列とカンマ区切り文字列の両方で受け付ける
        // given (前提条件):
        let list = r#"{"stats": [10, 20, 30, 40, 50, 60, 70, 80]}"#;
        let text = r#"{"stats": "10,20,30,40,50,60,70,80", "traits": ["calm"]}"#;

        // when (操作):
        let list: ProfileCreateRequest = serde_json::from_str(list).unwrap();
        let text: ProfileCreateRequest = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            list.stats,
            StatsInput::List(vec![10, 20, 30, 40, 50, 60, 70, 80])
        );
        assert!(list.traits.is_empty());
        assert!(list.details.is_null());
        assert_eq!(
            text.stats,
            StatsInput::Text("10,20,30,40,50,60,70,80".to_string())
        );
        assert_eq!(text.traits, vec!["calm".to_string()]);
    }

    #[test]
    fn test_room_update_request_is_partial() {
        // テスト項目: ルーム更新リクエストは省略されたフィールドを None として扱う
        // given (前提条件):
        let json = r#"{"title": "New title"}"#;

        // when (操作):
        let request: RoomUpdateRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(request.title.as_deref(), Some("New title"));
        assert!(request.tags.is_none());
        assert!(request.description.is_none());
    }
}
