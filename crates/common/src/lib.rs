//! Reelkit shared crate.
//!
//! Used by the timeline model, the view engine, and the CLI:
//! - [`ReelkitError`] and [`ReelkitResult`]
//! - [`EditorConfig`]: history depth, playback publish rate, view geometry, zoom limits
//! - Time sources and the [`RateController`] behind playback publication
//! - `tracing` subscriber setup

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
