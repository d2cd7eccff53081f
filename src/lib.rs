//! Lesson script and transliteration engine for a Japanese typing tutor.
//!
//! A renderer feeds key events and input method commits into [`app::App`]
//! and draws what it reports back: the practice text, key hints for the
//! keyboard diagram, scores and the per-day stats series.

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod kana;
pub mod keyboard;
pub mod lesson;
pub mod logging;
pub mod ruby;
pub mod session;
pub mod store;

pub use app::App;
pub use error::{EngineError, Result};
pub use lesson::EngineMode;
