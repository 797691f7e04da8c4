//! HTTP Handlers

mod ping;
mod recommend;

pub use ping::*;
pub use recommend::*;
