pub mod collision;
pub mod config;
pub mod constants;
pub mod controller;
pub mod grid;
pub mod movement;
pub mod recorder;
pub mod result_store;
pub mod rng;
pub mod server_protocol;
pub mod server_utils;
pub mod session;
pub mod types;
