//! Message formatting utilities for client display.
//!
//! Server messages are read as untyped JSON so that a newer server with
//! extra fields still prints.

use antenna_shared::time::timestamp_to_rfc3339;
use serde_json::Value;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one text frame received from the server.
    pub fn format(text: &str) -> String {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            return Self::format_raw_message(text);
        };
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return format!("\n! {}\n", error);
        }

        match value.get("type").and_then(Value::as_str) {
            Some("room_state") => Self::format_room_state(&value),
            Some("log") => Self::format_log(&value),
            Some("assembly_update") => {
                let mut output = String::from("\nSeats changed:\n");
                output.push_str(&Self::format_players(&value["players"]));
                output
            }
            Some("start") => format!(
                "\n{}\nThe game has started. Seat {} is asked to tell the story.{}\n{}\n",
                RULE,
                value["holder"],
                Self::format_my_index(&value["my_index"]),
                RULE
            ),
            Some("appointment_pass") => format!(
                "\nSeat {} passed. Seat {} is asked next.\n",
                value["prev_holder"], value["next_holder"]
            ),
            Some("appointment_accept") => {
                let mut output = match value["prev_holder"].as_u64() {
                    Some(prev) => format!("\nEveryone passed. Seat {} must tell the story.\n", prev),
                    None => String::from("\nThe storyteller accepted.\n"),
                };
                output.push_str(&Self::format_gameplay(&value["gameplay_status"]));
                output
            }
            Some("gameplay_progress") => Self::format_gameplay(&value["gameplay_status"]),
            Some("game_end") => {
                let mut output = format!("\n{}\nThe game is over.\n", RULE);
                if let Some(rows) = value["relationship"].as_array() {
                    output.push_str("Your relationships:\n");
                    output.push_str(&Self::format_relationship(rows));
                }
                output.push_str(RULE);
                output.push('\n');
                output
            }
            _ => Self::format_raw_message(text),
        }
    }

    fn format_room_state(value: &Value) -> String {
        let room = &value["room"];
        let mut output = format!("\n\n{}\n", RULE);
        output.push_str(&format!(
            "Room #{} \"{}\" by {}\n",
            room["id"],
            room["title"].as_str().unwrap_or_default(),
            room["creator"]["nickname"].as_str().unwrap_or_default()
        ));
        if let Some(description) = room["description"].as_str().filter(|d| !d.is_empty()) {
            output.push_str(description);
            output.push('\n');
        }
        output.push_str(&format!(
            "Phase: {}.{}\n",
            value["phase"].as_str().unwrap_or_default(),
            Self::format_my_index(&value["my_index"])
        ));
        output.push_str("Players:\n");
        output.push_str(&Self::format_players(&value["players"]));
        if let Some(status) = value.get("appointment_status") {
            output.push_str(&format!(
                "Seat {} is asked to tell the story ({}s left).\n",
                status["holder"], status["timer"]
            ));
        }
        if let Some(status) = value.get("gameplay_status") {
            output.push_str(&Self::format_gameplay(status));
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }

    fn format_log(value: &Value) -> String {
        let mut output = String::from("\n");
        for entry in value["log"].as_array().into_iter().flatten() {
            output.push_str(&format!(
                "[{}] {}\n",
                timestamp_to_rfc3339(entry["timestamp"].as_i64().unwrap_or_default()),
                entry["content"].as_str().unwrap_or_default()
            ));
        }
        output
    }

    fn format_players(players: &Value) -> String {
        let Some(players) = players.as_array().filter(|p| !p.is_empty()) else {
            return String::from("  (nobody)\n");
        };
        players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let nickname = player["creator"]["nickname"].as_str().unwrap_or_default();
                match player["id"].as_i64() {
                    Some(profile_id) => {
                        let name = player["details"]["name"].as_str().unwrap_or("?");
                        format!(
                            "  {}. {} (profile #{}) played by {}\n",
                            index, name, profile_id, nickname
                        )
                    }
                    None => format!("  -  {} (not seated)\n", nickname),
                }
            })
            .collect()
    }

    fn format_gameplay(status: &Value) -> String {
        let mut output = format!(
            "\n-- Act {} / Round {} / Move {} : seat {} holds the turn ({}s left)\n",
            status["act_count"],
            status["round_count"],
            status["move_count"],
            status["holder"],
            status["timer"]
        );
        output.push_str(&format!(
            "   Step: {}\n",
            status["step"].as_str().unwrap_or_default()
        ));
        if let Some(action) = status["action"].as_str() {
            output.push_str(&format!(
                "   Action: {} with keyword {}, difficulty {} rolled {}\n",
                action, status["keyword"], status["holder_difficulty"], status["holder_result"]
            ));
            if let Some(target) = status["target"].as_u64() {
                output.push_str(&format!(
                    "   Target: seat {}, difficulty {} rolled {}\n",
                    target, status["target_difficulty"], status["target_result"]
                ));
            }
        }
        output.push_str(&format!("   Arena: {}\n", Self::format_cards(&status["arena"])));
        if status["hand"].is_array() {
            output.push_str(&format!(
                "   Hand: {}  (action points: {})\n",
                Self::format_cards(&status["hand"]),
                status["action_points"]
            ));
        }
        if let Some(queue) = status["queue"].as_array().filter(|q| !q.is_empty()) {
            let seats: Vec<String> = queue.iter().map(Value::to_string).collect();
            output.push_str(&format!("   Queue: {}\n", seats.join(", ")));
        }
        if let Some(rows) = status["relationship"].as_array() {
            output.push_str("   Relationships:\n");
            output.push_str(&Self::format_relationship(rows));
        }
        output
    }

    fn format_cards(cards: &Value) -> String {
        let cards: Vec<String> = cards
            .as_array()
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(index, card)| format!("{}:{}", index, card.as_str().unwrap_or("?")))
            .collect();
        if cards.is_empty() {
            String::from("(empty)")
        } else {
            cards.join("  ")
        }
    }

    fn format_relationship(rows: &[Value]) -> String {
        rows.iter()
            .enumerate()
            .map(|(seat, row)| {
                let values: Vec<String> = row
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|v| format!("{:.2}", v.as_f64().unwrap_or_default()))
                    .collect();
                format!("     seat {}: [{}]\n", seat, values.join(", "))
            })
            .collect()
    }

    fn format_my_index(my_index: &Value) -> String {
        match my_index.as_u64() {
            Some(index) => format!(" You are seat {}.", index),
            None => String::from(" You are watching."),
        }
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n<- Received: {}\n", text)
    }
}
