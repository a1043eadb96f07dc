use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::result_store::{ResultStore, StoreError};
use crate::types::{OutcomeRecord, ResultSubmission};

pub type SharedStore = Arc<Mutex<ResultStore>>;
pub type FailureCallback = Arc<dyn Fn(&OutcomeRecord, &StoreError) + Send + Sync>;

/// Receives finished rounds. `submit` must return immediately and must never
/// report failure back to the caller.
pub trait ResultRecorder: Send + Sync {
    fn submit(&self, record: OutcomeRecord);
}

pub struct StoreRecorder {
    store: SharedStore,
    on_failure: FailureCallback,
}

impl StoreRecorder {
    pub fn new(store: SharedStore) -> Self {
        Self::with_failure_callback(store, Arc::new(log_failure))
    }

    pub fn with_failure_callback(store: SharedStore, on_failure: FailureCallback) -> Self {
        Self { store, on_failure }
    }
}

impl ResultRecorder for StoreRecorder {
    fn submit(&self, record: OutcomeRecord) {
        let Ok(handle) = Handle::try_current() else {
            warn!(player = %record.player_name, "no async runtime; result dropped");
            return;
        };
        let store = Arc::clone(&self.store);
        let on_failure = Arc::clone(&self.on_failure);
        // The append rewrites the whole file; keep it off the runtime threads.
        handle.spawn_blocking(move || {
            let appended = store.blocking_lock().append(ResultSubmission::from(&record));
            match appended {
                Ok(saved) => info!(
                    player = %saved.player_id,
                    result = saved.result.as_str(),
                    diamonds = saved.diamonds,
                    "game result saved"
                ),
                Err(error) => on_failure(&record, &error),
            }
        });
    }
}

/// Recorder used when persistence is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRecorder;

impl ResultRecorder for LogRecorder {
    fn submit(&self, record: OutcomeRecord) {
        info!(
            player = %record.player_name,
            result = record.outcome.as_str(),
            score = record.score,
            "game finished"
        );
    }
}

fn log_failure(record: &OutcomeRecord, error: &StoreError) {
    warn!(player = %record.player_name, %error, "error saving game result");
}
