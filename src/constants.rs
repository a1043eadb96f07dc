pub const DEFAULT_GRID_SIZE: usize = 9;
pub const MIN_GRID_SIZE: usize = 2;

pub const PURSUED_STEP_MS: u64 = 400;
pub const END_PROMPT_DELAY_MS: u64 = 1_500;

pub const PLAYER_START: usize = 0;
pub const FALLBACK_SPAWN: usize = 1;
pub const SPAWN_BLOCK_SPAN: usize = 2;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RESULTS_PATH: &str = "Data/players.json";
pub const DEFAULT_STATIC_DIR: &str = "Public";

pub const ANONYMOUS_PLAYER: &str = "Anonymous";
pub const MAX_PLAYER_ID_LEN: usize = 32;

pub const LEADERBOARD_DEFAULT_LIMIT: usize = 10;
pub const LEADERBOARD_MAX_LIMIT: usize = 100;

pub const MSG_ENTER_NAME: &str = "Please enter your name first!";
pub const MSG_CAPTURED: &str = "Player Win! Diamond Captured!";
pub const MSG_ESCAPED: &str = "You Lost! Diamond Escaped.";
pub const MSG_PRESS_RESTART: &str = "Press Restart or Exit";
