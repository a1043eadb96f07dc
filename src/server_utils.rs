use crate::constants::{ANONYMOUS_PLAYER, MAX_PLAYER_ID_LEN};

pub fn normalize_player_id(value: Option<&str>) -> String {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return ANONYMOUS_PLAYER.to_string();
    }
    trimmed.chars().take(MAX_PLAYER_ID_LEN).collect()
}

/// Trimmed player name, or `None` when nothing usable was typed.
pub fn validate_player_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn parse_leaderboard_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_player_id_applies_trim_default_and_max_len() {
        assert_eq!(normalize_player_id(None), "Anonymous");
        assert_eq!(normalize_player_id(Some("")), "Anonymous");
        assert_eq!(normalize_player_id(Some("   ")), "Anonymous");
        assert_eq!(normalize_player_id(Some(" Alice ")), "Alice");
        let long = "x".repeat(40);
        assert_eq!(normalize_player_id(Some(&long)).len(), 32);
    }

    #[test]
    fn validate_player_name_rejects_blank() {
        assert_eq!(validate_player_name(""), None);
        assert_eq!(validate_player_name(" \t "), None);
        assert_eq!(validate_player_name("  Kim "), Some("Kim".to_string()));
    }

    #[test]
    fn leaderboard_limit_parsing_is_lenient_for_invalid_values() {
        assert_eq!(parse_leaderboard_limit(Some("8")), Some(8));
        assert_eq!(parse_leaderboard_limit(Some(" 3 ")), Some(3));
        assert_eq!(parse_leaderboard_limit(Some("0")), Some(0));
        assert_eq!(parse_leaderboard_limit(Some("abc")), None);
        assert_eq!(parse_leaderboard_limit(Some("-1")), None);
        assert_eq!(parse_leaderboard_limit(None), None);
    }
}
