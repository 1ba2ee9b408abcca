use super::{BackendEvent, BackendKind, LifecycleSink, PlaybackBackend, PlaybackRequest};
use crate::error::Result;
use async_trait::async_trait;
use bridge_traits::{NativeMediaEvent, NativeMediaService, NativePlayRequest};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Backend driving the platform media service.
///
/// The native surface reports transport commands and progress but not
/// play/pause transitions, so this backend confirms those itself once the
/// service has accepted the call.
pub struct NativeBackend {
    service: Arc<dyn NativeMediaService>,
    sink: Mutex<Option<LifecycleSink>>,
}

impl NativeBackend {
    pub fn new(service: Arc<dyn NativeMediaService>) -> Self {
        Self {
            service,
            sink: Mutex::new(None),
        }
    }

    /// Whether the platform service is reachable.
    pub fn is_available(&self) -> bool {
        self.service.is_available()
    }

    fn confirm(&self, event: BackendEvent) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.emit(event);
        }
    }
}

fn translate(event: NativeMediaEvent) -> BackendEvent {
    match event {
        NativeMediaEvent::MediaNext => BackendEvent::RemoteNext,
        NativeMediaEvent::MediaPrev => BackendEvent::RemotePrev,
        NativeMediaEvent::MediaEnded => BackendEvent::Ended,
        NativeMediaEvent::TimeUpdate { position, duration } => BackendEvent::TimeUpdate {
            position,
            duration: (duration.is_finite() && duration > 0.0).then_some(duration),
        },
    }
}

#[async_trait]
impl PlaybackBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    async fn play(&self, request: &PlaybackRequest) -> Result<()> {
        self.service
            .play(NativePlayRequest {
                url: request.url.clone(),
                title: request.title.clone(),
                artist: request.artist.clone(),
                cover: request.cover.clone(),
            })
            .await?;
        debug!(title = %request.title, "Native service accepted play request");
        self.confirm(BackendEvent::Playing);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.service.pause().await?;
        self.confirm(BackendEvent::Paused);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.service.resume().await?;
        self.confirm(BackendEvent::Playing);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> Result<()> {
        let position_ms = u64::try_from(position.as_millis()).unwrap_or(u64::MAX);
        self.service.seek(position_ms).await?;
        // Progress reports are periodic; confirm the new position right away.
        self.confirm(BackendEvent::TimeUpdate {
            position: position.as_secs_f64(),
            duration: None,
        });
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        // Native playback follows the system volume.
        trace!(volume, "Native backend ignores in-app volume");
        Ok(())
    }

    fn subscribe_lifecycle(&self, sink: LifecycleSink) -> Result<()> {
        let forward = sink.clone();
        self.service.set_listener(Arc::new(move |event| {
            forward.emit(translate(event));
        }))?;
        *self.sink.lock() = Some(sink);
        Ok(())
    }
}
