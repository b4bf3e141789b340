#![forbid(unsafe_code)]

//! `vision-relay` relays camera frames to a vision-language model and
//! serves the latest recognized question/answer pair to display clients.

pub mod config;
pub mod errors;
pub mod http;
pub mod inference;
pub mod models;
pub mod session;
pub mod util;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
