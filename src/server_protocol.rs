use serde_json::Value;
use thiserror::Error;

use crate::types::{Outcome, ResultSubmission};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("result must be \"win\" or \"lose\"")]
    InvalidResult,

    #[error("playerId must be a string")]
    InvalidPlayerId,

    #[error("diamonds must be a non-negative integer")]
    InvalidDiamonds,
}

/// Parses a `POST /api/players` body into a submission for the store.
pub fn parse_result_submission(raw: &str) -> Result<ResultSubmission, SubmissionError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| SubmissionError::NotAnObject)?;
    let object = value.as_object().ok_or(SubmissionError::NotAnObject)?;

    let result = object
        .get("result")
        .and_then(Value::as_str)
        .and_then(Outcome::parse)
        .ok_or(SubmissionError::InvalidResult)?;

    let player_id = match object.get("playerId").or_else(|| object.get("name")) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => return Err(SubmissionError::InvalidPlayerId),
    };

    let diamonds = match object.get("diamonds").or_else(|| object.get("score")) {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|number| u32::try_from(number).ok())
            .ok_or(SubmissionError::InvalidDiamonds)?,
    };

    Ok(ResultSubmission {
        player_id,
        result,
        diamonds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_submission() {
        let parsed =
            parse_result_submission(r#"{"playerId":"Ann","result":"win","diamonds":3}"#)
                .expect("submission should parse");
        assert_eq!(parsed.player_id.as_deref(), Some("Ann"));
        assert_eq!(parsed.result, Outcome::Win);
        assert_eq!(parsed.diamonds, 3);
    }

    #[test]
    fn parse_defaults_missing_player_and_diamonds() {
        let parsed =
            parse_result_submission(r#"{"result":"lose"}"#).expect("minimal submission parses");
        assert_eq!(parsed.player_id, None);
        assert_eq!(parsed.diamonds, 0);
    }

    #[test]
    fn parse_accepts_legacy_name_field() {
        let parsed = parse_result_submission(r#"{"name":"Bo","result":"lose","score":2}"#)
            .expect("legacy field names parse");
        assert_eq!(parsed.player_id.as_deref(), Some("Bo"));
        assert_eq!(parsed.diamonds, 2);
    }

    #[test]
    fn parse_rejects_unknown_result() {
        assert_eq!(
            parse_result_submission(r#"{"playerId":"A","result":"draw"}"#),
            Err(SubmissionError::InvalidResult)
        );
        assert_eq!(
            parse_result_submission(r#"{"playerId":"A"}"#),
            Err(SubmissionError::InvalidResult)
        );
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        assert_eq!(
            parse_result_submission("[]"),
            Err(SubmissionError::NotAnObject)
        );
        assert_eq!(
            parse_result_submission("nope"),
            Err(SubmissionError::NotAnObject)
        );
        assert_eq!(
            parse_result_submission(r#"{"playerId":7,"result":"win"}"#),
            Err(SubmissionError::InvalidPlayerId)
        );
        assert_eq!(
            parse_result_submission(r#"{"result":"win","diamonds":-1}"#),
            Err(SubmissionError::InvalidDiamonds)
        );
        assert_eq!(
            parse_result_submission(r#"{"result":"win","diamonds":1.5}"#),
            Err(SubmissionError::InvalidDiamonds)
        );
    }
}
