//! # Core Configuration Module
//!
//! Collects the host collaborators the playback core needs.
//!
//! ## Overview
//!
//! The configuration system uses a builder to construct a [`CoreConfig`]
//! holding every bridge implementation the engine talks to. It fails fast
//! when a required bridge is missing so that misconfigured hosts are caught
//! at startup instead of at the first button press.
//!
//! ## Required Dependencies
//!
//! - `QueueStore` - Play order, history and persisted volume
//! - `MediaElement` - In-process playback surface (also the native fallback)
//!
//! ## Optional Dependencies
//!
//! - `NativeMediaService` - Platform media service (Android foreground service)
//! - `DownloadResolver` - Offline copies of downloaded tracks
//! - `ContentSearch` - Catalogue search for auto-continuation
//! - `TrackMetadataStore` - Persisted library metadata lookup
//! - `MediaSessionHost` - OS/browser now-playing surface
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .queue_store(Arc::new(MyQueueStore::default()))
//!     .media_element(Arc::new(MyAudioElement::new()))
//!     .content_search(Arc::new(MySearchClient::new()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    ContentSearch, DownloadResolver, MediaElement, MediaSessionHost, NativeMediaService,
    QueueStore, TrackMetadataStore,
};
use std::sync::Arc;

/// Host collaborators for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Queue and history store (required)
    pub queue_store: Arc<dyn QueueStore>,

    /// In-process media element (required)
    pub media_element: Arc<dyn MediaElement>,

    /// Platform media service (optional)
    pub native_media: Option<Arc<dyn NativeMediaService>>,

    /// Offline copy lookup (optional)
    pub download_resolver: Option<Arc<dyn DownloadResolver>>,

    /// Catalogue search used by auto-continuation (optional)
    pub content_search: Option<Arc<dyn ContentSearch>>,

    /// Persisted metadata lookup (optional)
    pub metadata_store: Option<Arc<dyn TrackMetadataStore>>,

    /// Now-playing surface (optional)
    pub media_session: Option<Arc<dyn MediaSessionHost>>,

    /// Features flags
    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("queue_store", &"QueueStore { ... }")
            .field("media_element", &"MediaElement { ... }")
            .field(
                "native_media",
                &self
                    .native_media
                    .as_ref()
                    .map(|_| "NativeMediaService { ... }"),
            )
            .field(
                "download_resolver",
                &self
                    .download_resolver
                    .as_ref()
                    .map(|_| "DownloadResolver { ... }"),
            )
            .field(
                "content_search",
                &self.content_search.as_ref().map(|_| "ContentSearch { ... }"),
            )
            .field(
                "metadata_store",
                &self
                    .metadata_store
                    .as_ref()
                    .map(|_| "TrackMetadataStore { ... }"),
            )
            .field(
                "media_session",
                &self
                    .media_session
                    .as_ref()
                    .map(|_| "MediaSessionHost { ... }"),
            )
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional functionality.
///
/// A disabled feature ignores the corresponding bridge even when one was
/// injected, which lets hosts switch behavior without rebuilding the bridge
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Route playback through the native media service when reachable
    pub enable_native_playback: bool,

    /// Prefer downloaded copies over remote streams
    pub enable_offline_playback: bool,

    /// Mirror playback onto the host now-playing surface
    pub enable_media_session: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_native_playback: true,
            enable_offline_playback: true,
            enable_media_session: true,
        }
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Native service, if injected and enabled.
    pub fn effective_native_media(&self) -> Option<Arc<dyn NativeMediaService>> {
        self.native_media
            .clone()
            .filter(|_| self.features.enable_native_playback)
    }

    /// Download resolver, if injected and enabled.
    pub fn effective_download_resolver(&self) -> Option<Arc<dyn DownloadResolver>> {
        self.download_resolver
            .clone()
            .filter(|_| self.features.enable_offline_playback)
    }

    /// Media session host, if injected and enabled.
    pub fn effective_media_session(&self) -> Option<Arc<dyn MediaSessionHost>> {
        self.media_session
            .clone()
            .filter(|_| self.features.enable_media_session)
    }
}

fn queue_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "QueueStore".to_string(),
        message: "QueueStore implementation is required for queue traversal and history. \
                 Inject the host's queue store, or core_playback::MemoryQueueStore for tests."
            .to_string(),
    }
}

fn media_element_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaElement".to_string(),
        message: "MediaElement implementation is required as the playback fallback. \
                 Android: wrap a WebView audio element. \
                 Desktop/Web: inject an HTML audio element bridge."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    queue_store: Option<Arc<dyn QueueStore>>,
    media_element: Option<Arc<dyn MediaElement>>,
    native_media: Option<Arc<dyn NativeMediaService>>,
    download_resolver: Option<Arc<dyn DownloadResolver>>,
    content_search: Option<Arc<dyn ContentSearch>>,
    metadata_store: Option<Arc<dyn TrackMetadataStore>>,
    media_session: Option<Arc<dyn MediaSessionHost>>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    pub fn queue_store(mut self, store: Arc<dyn QueueStore>) -> Self {
        self.queue_store = Some(store);
        self
    }

    pub fn media_element(mut self, element: Arc<dyn MediaElement>) -> Self {
        self.media_element = Some(element);
        self
    }

    pub fn native_media(mut self, service: Arc<dyn NativeMediaService>) -> Self {
        self.native_media = Some(service);
        self
    }

    pub fn download_resolver(mut self, resolver: Arc<dyn DownloadResolver>) -> Self {
        self.download_resolver = Some(resolver);
        self
    }

    pub fn content_search(mut self, search: Arc<dyn ContentSearch>) -> Self {
        self.content_search = Some(search);
        self
    }

    pub fn metadata_store(mut self, store: Arc<dyn TrackMetadataStore>) -> Self {
        self.metadata_store = Some(store);
        self
    }

    pub fn media_session(mut self, host: Arc<dyn MediaSessionHost>) -> Self {
        self.media_session = Some(host);
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when the queue store or the
    /// media element was not provided.
    pub fn build(self) -> Result<CoreConfig> {
        let queue_store = self.queue_store.ok_or_else(queue_store_missing_error)?;
        let media_element = self.media_element.ok_or_else(media_element_missing_error)?;

        Ok(CoreConfig {
            queue_store,
            media_element,
            native_media: self.native_media,
            download_resolver: self.download_resolver,
            content_search: self.content_search,
            metadata_store: self.metadata_store,
            media_session: self.media_session,
            features: self.features,
        })
    }
}
