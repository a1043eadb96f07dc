use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::constants::{END_PROMPT_DELAY_MS, PURSUED_STEP_MS};
use crate::recorder::ResultRecorder;
use crate::session::{GameSession, SessionError};
use crate::types::{Direction, OutcomeRecord, SessionSnapshot};

#[derive(Clone, Copy, Debug)]
pub struct ControllerOptions {
    pub step_interval: Duration,
    pub end_prompt_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(PURSUED_STEP_MS),
            end_prompt_delay: Duration::from_millis(END_PROMPT_DELAY_MS),
        }
    }
}

struct Shared {
    session: Mutex<GameSession>,
    snapshots: watch::Sender<SessionSnapshot>,
    recorder: Arc<dyn ResultRecorder>,
    options: ControllerOptions,
}

impl Shared {
    /// Callers hold the session lock so published snapshots follow the
    /// order of state changes.
    fn publish(&self, snapshot: SessionSnapshot) {
        self.snapshots.send_replace(snapshot);
    }

    fn conclude(self: &Arc<Self>, record: OutcomeRecord, epoch: u64) {
        info!(
            player = %record.player_name,
            result = record.outcome.as_str(),
            score = record.score,
            "round finished"
        );
        self.recorder.submit(record);

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(shared.options.end_prompt_delay).await;
            let mut session = shared.session.lock().await;
            if session.show_restart_prompt(epoch) {
                shared.publish(session.snapshot());
            }
        });
    }
}

/// Drives a [`GameSession`]: player input arrives through the methods below,
/// the pursued entity moves on its own ticker task.
pub struct SessionController {
    shared: Arc<Shared>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(
        session: GameSession,
        recorder: Arc<dyn ResultRecorder>,
        options: ControllerOptions,
    ) -> Self {
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                snapshots,
                recorder,
                options,
            }),
            ticker: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.shared.session.lock().await.snapshot()
    }

    pub async fn history(&self) -> Vec<OutcomeRecord> {
        self.shared.session.lock().await.history().to_vec()
    }

    pub async fn start(&mut self, name: &str) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.shared.session.lock().await;
        let started = session.start(name);
        let snapshot = session.snapshot();
        self.shared.publish(snapshot.clone());
        drop(session);

        let epoch = started?;
        info!(player = %snapshot.player_name, pursued = snapshot.pursued_pos, "round started");
        self.restart_ticker(epoch);
        Ok(snapshot)
    }

    pub async fn restart(&mut self) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.shared.session.lock().await;
        let epoch = session.restart()?;
        let snapshot = session.snapshot();
        self.shared.publish(snapshot.clone());
        drop(session);

        info!(player = %snapshot.player_name, pursued = snapshot.pursued_pos, "round restarted");
        self.restart_ticker(epoch);
        Ok(snapshot)
    }

    pub async fn exit(&mut self) -> SessionSnapshot {
        self.stop_ticker();
        let mut session = self.shared.session.lock().await;
        session.exit();
        let snapshot = session.snapshot();
        self.shared.publish(snapshot.clone());
        snapshot
    }

    pub async fn handle_input(&mut self, dir: Direction) -> SessionSnapshot {
        let mut session = self.shared.session.lock().await;
        let epoch = session.epoch();
        let finished = session.apply_input(dir);
        let snapshot = session.snapshot();
        self.shared.publish(snapshot.clone());
        drop(session);

        if let Some(record) = finished {
            self.stop_ticker();
            self.shared.conclude(record, epoch);
        }
        snapshot
    }

    fn restart_ticker(&mut self, epoch: u64) {
        self.stop_ticker();
        let shared = Arc::clone(&self.shared);
        self.ticker = Some(tokio::spawn(run_ticker(shared, epoch)));
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            debug!("ticker stopped");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

async fn run_ticker(shared: Arc<Shared>, epoch: u64) {
    let mut interval = tokio::time::interval(shared.options.step_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the diamond waits one full step.
    interval.tick().await;

    loop {
        interval.tick().await;
        let mut session = shared.session.lock().await;
        if !session.is_active() || session.epoch() != epoch {
            return;
        }
        let finished = session.tick(epoch);
        shared.publish(session.snapshot());
        drop(session);

        if let Some(record) = finished {
            shared.conclude(record, epoch);
            return;
        }
    }
}
