//! Bootstrap tests for the core service façade

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    MediaAction, MediaActionHandler, MediaElement, MediaElementEvent, MediaElementListener,
    MediaSessionHost, NativeMediaListener, NativeMediaService, NativePlayRequest,
    NowPlayingMetadata, Track,
};
use core_playback::{BackendKind, MemoryQueueStore, PlaybackConfig, PlaybackError};
use core_runtime::config::{CoreConfig, FeatureFlags};
use core_service::{CoreError, CoreService};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct EchoElement {
    source: Mutex<Option<String>>,
    listener: Mutex<Option<MediaElementListener>>,
}

#[async_trait]
impl MediaElement for EchoElement {
    fn set_source(&self, url: &str) -> BridgeResult<()> {
        *self.source.lock() = Some(url.to_string());
        Ok(())
    }
    fn has_source(&self) -> bool {
        self.source.lock().is_some()
    }
    async fn play(&self) -> BridgeResult<()> {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(MediaElementEvent::Play);
        }
        Ok(())
    }
    fn pause(&self) -> BridgeResult<()> {
        Ok(())
    }
    fn set_current_time(&self, _seconds: f64) -> BridgeResult<()> {
        Ok(())
    }
    fn current_time(&self) -> f64 {
        0.0
    }
    fn duration(&self) -> Option<f64> {
        None
    }
    fn set_volume(&self, _volume: f32) -> BridgeResult<()> {
        Ok(())
    }
    fn set_listener(&self, listener: MediaElementListener) -> BridgeResult<()> {
        *self.listener.lock() = Some(listener);
        Ok(())
    }
}

#[derive(Default)]
struct CountingNative {
    plays: Mutex<usize>,
}

#[async_trait]
impl NativeMediaService for CountingNative {
    fn is_available(&self) -> bool {
        true
    }
    async fn play(&self, _request: NativePlayRequest) -> BridgeResult<()> {
        *self.plays.lock() += 1;
        Ok(())
    }
    async fn pause(&self) -> BridgeResult<()> {
        Ok(())
    }
    async fn resume(&self) -> BridgeResult<()> {
        Ok(())
    }
    async fn seek(&self, _position_ms: u64) -> BridgeResult<()> {
        Ok(())
    }
    fn set_listener(&self, _listener: NativeMediaListener) -> BridgeResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct TitleHost {
    titles: Mutex<Vec<String>>,
}

impl MediaSessionHost for TitleHost {
    fn set_metadata(&self, metadata: NowPlayingMetadata) -> BridgeResult<()> {
        self.titles.lock().push(metadata.title);
        Ok(())
    }
    fn set_action_handler(&self, _action: MediaAction, _handler: MediaActionHandler) -> BridgeResult<()> {
        Ok(())
    }
}

fn song(id: &str) -> Track {
    Track::new(id, format!("Song {id}"), format!("https://cdn.example/{id}.mp3"))
}

#[tokio::test]
async fn test_bootstrap_minimal_host() -> core_service::Result<()> {
    let element = Arc::new(EchoElement::default());
    let config = CoreConfig::builder()
        .queue_store(Arc::new(MemoryQueueStore::new()))
        .media_element(element.clone())
        .build()?;

    let core = CoreService::bootstrap(config, PlaybackConfig::default())?;
    assert_eq!(core.state().active_backend, BackendKind::Fallback);
    assert!(!core.has_media_session());

    let route = core.session().play_track(song("a")).await?;
    core.session().process_pending_events().await;

    assert_eq!(route, BackendKind::Fallback);
    assert!(core.state().is_playing);
    assert_eq!(element.source.lock().as_deref(), Some("https://cdn.example/a.mp3"));
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_wires_native_and_media_session() {
    let native = Arc::new(CountingNative::default());
    let host = Arc::new(TitleHost::default());
    let config = CoreConfig::builder()
        .queue_store(Arc::new(MemoryQueueStore::new()))
        .media_element(Arc::new(EchoElement::default()))
        .native_media(native.clone())
        .media_session(host.clone())
        .build()
        .unwrap();

    let core = CoreService::bootstrap(config, PlaybackConfig::default()).unwrap();
    assert_eq!(core.state().active_backend, BackendKind::Native);
    assert!(core.has_media_session());

    core.session().play_track(song("a")).await.unwrap();

    assert_eq!(*native.plays.lock(), 1);
    assert_eq!(*host.titles.lock(), vec!["Song a"]);
}

#[tokio::test]
async fn test_feature_flags_mask_bridges() {
    let native = Arc::new(CountingNative::default());
    let config = CoreConfig::builder()
        .queue_store(Arc::new(MemoryQueueStore::new()))
        .media_element(Arc::new(EchoElement::default()))
        .native_media(native.clone())
        .media_session(Arc::new(TitleHost::default()))
        .features(FeatureFlags {
            enable_native_playback: false,
            enable_media_session: false,
            ..FeatureFlags::default()
        })
        .build()
        .unwrap();

    let core = CoreService::bootstrap(config, PlaybackConfig::default()).unwrap();
    core.session().play_track(song("a")).await.unwrap();

    assert_eq!(core.state().active_backend, BackendKind::Fallback);
    assert!(!core.has_media_session());
    assert_eq!(*native.plays.lock(), 0);
}

#[test]
fn test_invalid_playback_config_is_rejected() {
    let config = CoreConfig::builder()
        .queue_store(Arc::new(MemoryQueueStore::new()))
        .media_element(Arc::new(EchoElement::default()))
        .build()
        .unwrap();

    let playback = PlaybackConfig {
        initial_volume: 3.0,
        ..PlaybackConfig::default()
    };

    assert!(matches!(
        CoreService::bootstrap(config, playback),
        Err(CoreError::InitializationFailed(reason)) if reason.contains("initial_volume")
    ));
}

#[test]
fn test_missing_bridge_converts_to_core_error() {
    let result: core_service::Result<CoreConfig> = CoreConfig::builder()
        .media_element(Arc::new(EchoElement::default()))
        .build()
        .map_err(CoreError::from);

    assert!(matches!(result, Err(CoreError::Runtime(_))));
}

#[test]
fn test_playback_error_converts_to_core_error() {
    let err: CoreError = PlaybackError::Superseded.into();
    assert!(matches!(err, CoreError::Playback(PlaybackError::Superseded)));
    assert!(err.to_string().starts_with("Playback error"));
}
