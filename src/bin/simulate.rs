use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use diamond_chase_server::controller::{ControllerOptions, SessionController};
use diamond_chase_server::grid::GridConfig;
use diamond_chase_server::recorder::{LogRecorder, ResultRecorder, SharedStore, StoreRecorder};
use diamond_chase_server::result_store::ResultStore;
use diamond_chase_server::rng::Rng;
use diamond_chase_server::session::GameSession;
use diamond_chase_server::types::{Direction, Outcome, Phase, SessionSnapshot};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Walk straight at the diamond's current cell.
    Chase,
    /// Run right along the top row, then down the right column.
    Edge,
    /// Replay `--keys` in order, then stand still.
    Script,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays diamond chase rounds against the real controller")]
struct Cli {
    #[arg(long, default_value_t = 1)]
    games: usize,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 9)]
    grid_size: usize,
    #[arg(long, default_value_t = 400)]
    step_ms: u64,
    #[arg(long, default_value_t = 300)]
    input_ms: u64,
    #[arg(long, value_enum, default_value_t = Policy::Chase)]
    policy: Policy,
    #[arg(long, default_value = "Simulator")]
    player: String,
    #[arg(long)]
    results: Option<PathBuf>,
    /// Key names (arrows or WASD) for the script policy, comma separated.
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,
    #[arg(long)]
    render: bool,
}

#[derive(Clone, Debug, Serialize)]
struct GameLine {
    game: usize,
    seed: u32,
    outcome: Outcome,
    score: u32,
    inputs: usize,
    #[serde(rename = "spawnPos")]
    spawn_pos: usize,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    seed: u32,
    games: usize,
    wins: usize,
    losses: usize,
    #[serde(rename = "finalScore")]
    final_score: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let grid = GridConfig::new(cli.grid_size).context("invalid --grid-size")?;
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let script = parse_script(&cli.keys)?;

    let store = match cli.results.as_ref() {
        Some(path) => Some(Arc::new(Mutex::new(
            ResultStore::open(path.clone())
                .with_context(|| format!("cannot open results file {}", path.display()))?,
        ))),
        None => None,
    };
    let recorder: Arc<dyn ResultRecorder> = match store.as_ref() {
        Some(store) => Arc::new(StoreRecorder::new(Arc::clone(store))),
        None => Arc::new(LogRecorder),
    };
    let expected_records = match store.as_ref() {
        Some(store) => store.lock().await.len() + cli.games,
        None => 0,
    };

    let options = ControllerOptions {
        step_interval: Duration::from_millis(cli.step_ms.max(1)),
        ..ControllerOptions::default()
    };
    let mut controller =
        SessionController::new(GameSession::new(grid, Rng::new(seed)), recorder, options);
    info!(seed, games = cli.games, policy = ?cli.policy, "simulation started");

    let mut wins = 0;
    let mut losses = 0;
    let mut final_score = 0;
    for game in 0..cli.games {
        let line = play_round(&mut controller, &cli, &script, game, seed).await?;
        match line.outcome {
            Outcome::Win => wins += 1,
            Outcome::Lose => losses += 1,
        }
        final_score = line.score;
        println!("{}", serde_json::to_string(&line)?);
    }

    if let Some(store) = store.as_ref() {
        wait_for_records(store, expected_records).await;
    }

    let summary = RunSummary {
        seed,
        games: cli.games,
        wins,
        losses,
        final_score,
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

async fn play_round(
    controller: &mut SessionController,
    cli: &Cli,
    script: &[Direction],
    game: usize,
    seed: u32,
) -> anyhow::Result<GameLine> {
    let started_at = Instant::now();
    let started = if game == 0 {
        controller.start(&cli.player).await?
    } else {
        controller.restart().await?
    };
    let spawn_pos = started.pursued_pos;
    let mut updates = controller.subscribe();
    let mut input_timer = tokio::time::interval(Duration::from_millis(cli.input_ms.max(1)));
    input_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    input_timer.tick().await;

    let mut inputs = 0;
    let finished = loop {
        tokio::select! {
            _ = input_timer.tick() => {
                let snapshot = controller.snapshot().await;
                if snapshot.phase == Phase::Ended {
                    break snapshot;
                }
                let Some(dir) = next_input(cli.policy, script, inputs, &snapshot) else {
                    continue;
                };
                inputs += 1;
                let after = controller.handle_input(dir).await;
                if cli.render {
                    eprintln!("{}", render_board(&after));
                }
                if after.phase == Phase::Ended {
                    break after;
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break controller.snapshot().await;
                }
                let snapshot = updates.borrow_and_update().clone();
                if cli.render {
                    eprintln!("{}", render_board(&snapshot));
                }
                if snapshot.phase == Phase::Ended {
                    break snapshot;
                }
            }
        }
    };

    let outcome = match controller.history().await.last() {
        Some(record) => record.outcome,
        None => anyhow::bail!("round {game} ended without an outcome"),
    };
    info!(game, outcome = outcome.as_str(), message = %finished.message, "round complete");
    Ok(GameLine {
        game,
        seed,
        outcome,
        score: finished.score,
        inputs,
        spawn_pos,
        duration_ms: started_at.elapsed().as_millis() as u64,
    })
}

fn next_input(
    policy: Policy,
    script: &[Direction],
    sent: usize,
    snapshot: &SessionSnapshot,
) -> Option<Direction> {
    let grid = GridConfig::new(snapshot.grid_size).ok()?;
    match policy {
        Policy::Chase => chase_step(&grid, snapshot.player_pos, snapshot.pursued_pos),
        Policy::Edge => edge_step(&grid, snapshot.player_pos),
        Policy::Script => script.get(sent).copied(),
    }
}

fn parse_script(keys: &[String]) -> anyhow::Result<Vec<Direction>> {
    keys.iter()
        .map(|key| {
            Direction::from_key(key).with_context(|| format!("unknown key '{key}' in --keys"))
        })
        .collect()
}

fn chase_step(grid: &GridConfig, player: usize, target: usize) -> Option<Direction> {
    let (player_row, player_col) = grid.to_row_col(player);
    let (target_row, target_col) = grid.to_row_col(target);
    if target_row > player_row {
        Some(Direction::Down)
    } else if target_row < player_row {
        Some(Direction::Up)
    } else if target_col > player_col {
        Some(Direction::Right)
    } else if target_col < player_col {
        Some(Direction::Left)
    } else {
        None
    }
}

fn edge_step(grid: &GridConfig, player: usize) -> Option<Direction> {
    let (row, col) = grid.to_row_col(player);
    let last = grid.size() - 1;
    if row == 0 && col < last {
        Some(Direction::Right)
    } else if row < last {
        Some(Direction::Down)
    } else {
        None
    }
}

fn render_board(snapshot: &SessionSnapshot) -> String {
    let size = snapshot.grid_size;
    let mut out = String::with_capacity(size * (size + 1) + snapshot.message.len() + 1);
    for row in 0..size {
        for col in 0..size {
            let pos = row * size + col;
            let glyph = if pos == snapshot.player_pos {
                'P'
            } else if pos == snapshot.pursued_pos {
                'D'
            } else if pos == snapshot.exit_pos {
                'E'
            } else if snapshot.trail.contains(&pos) {
                '*'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out.push_str(&snapshot.message);
    out
}

async fn wait_for_records(store: &SharedStore, expected: usize) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while store.lock().await.len() < expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    if waited.is_err() {
        warn!(expected, "not every result reached the store");
    }
}
