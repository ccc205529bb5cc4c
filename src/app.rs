//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and mirrors the engine's telemetry
//! alongside the playlist being shown.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
