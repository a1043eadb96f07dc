use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order in which neighbors are evaluated; earlier entries win distance ties.
    pub const EVALUATION_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Maps keyboard key names (arrows and WASD) onto a direction.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "w" | "arrowup" => Some(Self::Up),
            "s" | "arrowdown" => Some(Self::Down),
            "a" | "arrowleft" => Some(Self::Left),
            "d" | "arrowright" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Active,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collision {
    Continue,
    Escaped,
    Captured,
}

impl Collision {
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Collision::Continue => None,
            Collision::Escaped => Some(Outcome::Lose),
            Collision::Captured => Some(Outcome::Win),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "win" => Some(Self::Win),
            "lose" => Some(Self::Lose),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub outcome: Outcome,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    #[serde(rename = "gridSize")]
    pub grid_size: usize,
    #[serde(rename = "playerPos")]
    pub player_pos: usize,
    #[serde(rename = "pursuedPos")]
    pub pursued_pos: usize,
    #[serde(rename = "exitPos")]
    pub exit_pos: usize,
    pub trail: Vec<usize>,
    pub active: bool,
    pub message: String,
    pub score: u32,
    #[serde(rename = "playerName")]
    pub player_name: String,
}

/// Record shape accepted by the store before a timestamp is assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultSubmission {
    pub player_id: Option<String>,
    pub result: Outcome,
    pub diamonds: u32,
}

impl From<&OutcomeRecord> for ResultSubmission {
    fn from(record: &OutcomeRecord) -> Self {
        Self {
            player_id: Some(record.player_name.clone()),
            result: record.outcome,
            diamonds: record.score,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    #[serde(rename = "playerId", alias = "player_id", alias = "name")]
    pub player_id: String,
    pub result: Outcome,
    #[serde(default)]
    pub diamonds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub matches: u64,
    pub wins: u64,
    #[serde(rename = "winRate")]
    pub win_rate: f64,
    #[serde(rename = "bestDiamonds")]
    pub best_diamonds: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct LeaderboardResponse {
    #[serde(rename = "generatedAtIso")]
    pub generated_at_iso: String,
    pub entries: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_key_accepts_arrows_and_wasd() {
        assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key("W"), Some(Direction::Up));
        assert_eq!(Direction::from_key("s"), Some(Direction::Down));
        assert_eq!(Direction::from_key("arrowleft"), Some(Direction::Left));
        assert_eq!(Direction::from_key("d"), Some(Direction::Right));
        assert_eq!(Direction::from_key("Enter"), None);
    }

    #[test]
    fn collision_maps_to_outcome() {
        assert_eq!(Collision::Continue.outcome(), None);
        assert_eq!(Collision::Escaped.outcome(), Some(Outcome::Lose));
        assert_eq!(Collision::Captured.outcome(), Some(Outcome::Win));
    }

    #[test]
    fn stored_result_reads_legacy_rows_without_timestamp() {
        let parsed: StoredResult =
            serde_json::from_str(r#"{"name":"Ann","result":"lose"}"#).expect("legacy row parses");
        assert_eq!(parsed.player_id, "Ann");
        assert_eq!(parsed.result, Outcome::Lose);
        assert_eq!(parsed.diamonds, 0);
        assert_eq!(parsed.timestamp, None);
    }

    #[test]
    fn snapshot_serializes_camel_case_fields() {
        let snapshot = SessionSnapshot {
            phase: Phase::Active,
            grid_size: 9,
            player_pos: 0,
            pursued_pos: 10,
            exit_pos: 80,
            trail: vec![],
            active: true,
            message: String::new(),
            score: 0,
            player_name: "Ann".to_string(),
        };
        let value = serde_json::to_value(&snapshot).expect("snapshot serializes");
        assert_eq!(value["pursuedPos"], 10);
        assert_eq!(value["exitPos"], 80);
        assert_eq!(value["phase"], "active");
    }
}
