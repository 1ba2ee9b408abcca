//! Melo playback engine.
//!
//! Host applications depend on this crate and reach the individual layers
//! through the re-exports below. Most hosts only need [`CoreService`].

pub use bridge_traits as bridge;
pub use core_playback as playback;
pub use core_runtime as runtime;
pub use core_service::{CoreError, CoreService, Result};
