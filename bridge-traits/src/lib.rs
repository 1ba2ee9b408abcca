//! # Host Bridge Traits
//!
//! Contracts between the playback core and the host application.
//!
//! ## Overview
//!
//! Every trait in this crate is a capability the core needs but cannot
//! provide itself. The host (Android shell, desktop PWA wrapper, test
//! harness) implements them and hands them to the core through
//! `core_runtime::config::CoreConfig`.
//!
//! ## Traits
//!
//! ### Playback surfaces
//! - [`NativeMediaService`](playback::NativeMediaService) - Platform media service driven by URL + metadata
//! - [`MediaElement`](playback::MediaElement) - In-process fallback media element
//! - [`MediaSessionHost`](media_session::MediaSessionHost) - OS/browser now-playing surface
//!
//! ### Library collaborators
//! - [`QueueStore`](library::QueueStore) - Play order, cursor, history, persisted volume
//! - [`DownloadResolver`](library::DownloadResolver) - Local copies of downloaded tracks
//! - [`ContentSearch`](library::ContentSearch) - Catalogue search used by auto-continuation
//! - [`TrackMetadataStore`](library::TrackMetadataStore) - Persisted metadata lookup
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and use
//! [`BridgeError::NotAvailable`] when the platform lacks a capability.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind an `Arc`.

pub mod error;
pub mod library;
pub mod media_session;
pub mod playback;
pub mod track;

pub use error::BridgeError;

// Re-export commonly used types
pub use library::{ContentSearch, DownloadResolver, QueueSnapshot, QueueStore, TrackMetadataStore};
pub use media_session::{
    ActionDetails, Artwork, HostPlaybackState, MediaAction, MediaActionHandler, MediaSessionHost,
    NowPlayingMetadata,
};
pub use playback::{
    MediaElement, MediaElementEvent, MediaElementListener, NativeMediaEvent, NativeMediaListener,
    NativeMediaService, NativePlayRequest,
};
pub use track::{upgrade_insecure_url, MediaKind, Track};
