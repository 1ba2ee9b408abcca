//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing bootstrap
//! - Collaborator configuration (`CoreConfig`)
//! - Typed, synchronous event bus for player lifecycle events
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the engine crates depend on. It
//! establishes the logging conventions, the fail-fast configuration builder
//! and the observer registry through which UI layers follow playback.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
