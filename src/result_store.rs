use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{LEADERBOARD_DEFAULT_LIMIT, LEADERBOARD_MAX_LIMIT};
use crate::server_utils::normalize_player_id;
use crate::types::{
    LeaderboardEntry, LeaderboardResponse, Outcome, ResultSubmission, StoredResult,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create store directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only list of finished games backed by a pretty-printed JSON array.
#[derive(Debug)]
pub struct ResultStore {
    file_path: PathBuf,
    records: Vec<StoredResult>,
}

impl ResultStore {
    pub fn open(file_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let records = load_records(&file_path)?;
        debug!(path = %file_path.display(), count = records.len(), "results loaded");
        Ok(Self { file_path, records })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn list(&self) -> &[StoredResult] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, submission: ResultSubmission) -> Result<StoredResult, StoreError> {
        let record = StoredResult {
            player_id: normalize_player_id(submission.player_id.as_deref()),
            result: submission.result,
            diamonds: submission.diamonds,
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        self.records.push(record.clone());
        if let Err(error) = self.save() {
            self.records.pop();
            return Err(error);
        }
        Ok(record)
    }

    pub fn leaderboard(&self, requested_limit: Option<usize>) -> LeaderboardResponse {
        LeaderboardResponse {
            generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            entries: self.top_players(requested_limit),
        }
    }

    fn top_players(&self, requested_limit: Option<usize>) -> Vec<LeaderboardEntry> {
        let limit = requested_limit
            .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
            .clamp(1, LEADERBOARD_MAX_LIMIT);

        let mut by_player: HashMap<String, (String, u64, u64, u32)> = HashMap::new();
        for record in &self.records {
            let key = leaderboard_key(&record.player_id);
            let entry = by_player
                .entry(key)
                .or_insert_with(|| (record.player_id.clone(), 0, 0, 0));
            entry.0 = record.player_id.clone();
            entry.1 += 1;
            if record.result == Outcome::Win {
                entry.2 += 1;
            }
            entry.3 = entry.3.max(record.diamonds);
        }

        let mut entries: Vec<LeaderboardEntry> = by_player
            .into_values()
            .map(|(name, matches, wins, best_diamonds)| LeaderboardEntry {
                name,
                matches,
                wins,
                win_rate: wins as f64 / matches.max(1) as f64,
                best_diamonds,
            })
            .collect();

        entries.sort_by(|a, b| {
            cmp_desc_f64(a.win_rate, b.win_rate)
                .then_with(|| b.wins.cmp(&a.wins))
                .then_with(|| b.best_diamonds.cmp(&a.best_diamonds))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        entries.truncate(limit);
        entries
    }

    fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.file_path, text).map_err(|source| StoreError::Write {
            path: self.file_path.clone(),
            source,
        })
    }
}

fn cmp_desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn leaderboard_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn load_records(path: &Path) -> Result<Vec<StoredResult>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw_rows: Vec<serde_json::Value> = match serde_json::from_str(&text) {
        Ok(rows) => rows,
        Err(error) => {
            warn!(path = %path.display(), %error, "results file is not a JSON array; starting empty");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(raw_rows.len());
    for (index, raw) in raw_rows.into_iter().enumerate() {
        match serde_json::from_value::<StoredResult>(raw) {
            Ok(mut record) => {
                record.player_id = normalize_player_id(Some(&record.player_id));
                records.push(record);
            }
            Err(error) => {
                warn!(path = %path.display(), index, %error, "skipping malformed result row");
            }
        }
    }
    Ok(records)
}
