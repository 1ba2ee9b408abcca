//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridges collected in a
//! [`CoreConfig`] into a running playback engine: backend detection, the
//! playback session with its collaborators, and the optional now-playing
//! integration.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_playback::{
    BackendSelector, MediaSessionAdapter, PlaybackConfig, PlaybackSession, PlaybackState,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use tracing::info;

struct ServiceInner {
    session: PlaybackSession,
    media_session: Option<MediaSessionAdapter>,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

impl CoreService {
    /// Build the engine from the host's bridges.
    ///
    /// Native capability is detected here, once. Feature flags in `config`
    /// mask optional bridges before anything is wired.
    pub fn bootstrap(config: CoreConfig, playback: PlaybackConfig) -> Result<Self> {
        playback
            .validate()
            .map_err(|reason| CoreError::InitializationFailed(format!("playback config: {reason}")))?;

        let selector = BackendSelector::detect(
            config.effective_native_media(),
            config.media_element.clone(),
            playback.native_retry_policy,
        );

        let mut builder = PlaybackSession::builder(selector, config.queue_store.clone())
            .config(playback);
        if let Some(resolver) = config.effective_download_resolver() {
            builder = builder.download_resolver(resolver);
        }
        if let Some(search) = config.content_search.clone() {
            builder = builder.content_search(search);
        }
        if let Some(store) = config.metadata_store.clone() {
            builder = builder.metadata_store(store);
        }
        let session = builder.build()?;

        let media_session = MediaSessionAdapter::attach(&session, config.effective_media_session());

        info!(
            backend = %session.state().active_backend,
            media_session = media_session.is_some(),
            "Core service started"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                session,
                media_session,
            }),
        })
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.inner.session
    }

    pub fn event_bus(&self) -> &EventBus {
        self.inner.session.event_bus()
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.session.state()
    }

    /// Whether the now-playing surface is wired up.
    pub fn has_media_session(&self) -> bool {
        self.inner.media_session.is_some()
    }

    /// Drive backend events until the backends go away.
    ///
    /// Hosts typically spawn this on their runtime right after bootstrap.
    pub async fn run(&self) {
        self.inner.session.run().await;
    }
}
