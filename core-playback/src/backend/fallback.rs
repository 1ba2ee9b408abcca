use super::{BackendEvent, BackendKind, LifecycleSink, PlaybackBackend, PlaybackRequest};
use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use bridge_traits::{MediaElement, MediaElementEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Backend driving the in-process media element.
pub struct FallbackBackend {
    element: Arc<dyn MediaElement>,
    sink: Mutex<Option<LifecycleSink>>,
}

impl FallbackBackend {
    pub fn new(element: Arc<dyn MediaElement>) -> Self {
        Self {
            element,
            sink: Mutex::new(None),
        }
    }
}

fn translate(event: MediaElementEvent) -> BackendEvent {
    match event {
        MediaElementEvent::Ended => BackendEvent::Ended,
        MediaElementEvent::TimeUpdate {
            current_time,
            duration,
        } => BackendEvent::TimeUpdate {
            position: current_time,
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
        },
        MediaElementEvent::LoadedMetadata { duration } => BackendEvent::Loaded {
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
        },
        MediaElementEvent::Error { detail } => BackendEvent::Error { detail },
        MediaElementEvent::Play => BackendEvent::Playing,
        MediaElementEvent::Pause => BackendEvent::Paused,
    }
}

#[async_trait]
impl PlaybackBackend for FallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    async fn play(&self, request: &PlaybackRequest) -> Result<()> {
        self.element.set_source(&request.url)?;
        self.element.play().await?;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.element.pause()?;
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        if !self.element.has_source() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        self.element.play().await?;
        Ok(())
    }

    async fn seek(&self, position: Duration) -> Result<()> {
        self.element.set_current_time(position.as_secs_f64())?;
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.emit(BackendEvent::TimeUpdate {
                position: self.element.current_time(),
                duration: self.element.duration().filter(|d| d.is_finite() && *d > 0.0),
            });
        }
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.element.set_volume(volume.clamp(0.0, 1.0))?;
        Ok(())
    }

    fn subscribe_lifecycle(&self, sink: LifecycleSink) -> Result<()> {
        let forward = sink.clone();
        self.element.set_listener(Arc::new(move |event| {
            forward.emit(translate(event));
        }))?;
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    fn duration(&self) -> Option<f64> {
        self.element.duration().filter(|d| d.is_finite() && *d > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DispatchEpoch;
    use bridge_traits::MediaElementListener;
    use tokio::sync::mpsc;

    /// Element that records its source and echoes play/pause as events.
    #[derive(Default)]
    struct EchoElement {
        source: Mutex<Option<String>>,
        time: Mutex<f64>,
        volume: Mutex<f32>,
        listener: Mutex<Option<MediaElementListener>>,
    }

    impl EchoElement {
        fn fire(&self, event: MediaElementEvent) {
            let listener = self.listener.lock().clone();
            if let Some(listener) = listener {
                listener(event);
            }
        }
    }

    #[async_trait]
    impl MediaElement for EchoElement {
        fn set_source(&self, url: &str) -> bridge_traits::error::Result<()> {
            *self.source.lock() = Some(url.to_string());
            Ok(())
        }

        fn has_source(&self) -> bool {
            self.source.lock().is_some()
        }

        async fn play(&self) -> bridge_traits::error::Result<()> {
            self.fire(MediaElementEvent::Play);
            Ok(())
        }

        fn pause(&self) -> bridge_traits::error::Result<()> {
            self.fire(MediaElementEvent::Pause);
            Ok(())
        }

        fn set_current_time(&self, seconds: f64) -> bridge_traits::error::Result<()> {
            *self.time.lock() = seconds;
            Ok(())
        }

        fn current_time(&self) -> f64 {
            *self.time.lock()
        }

        fn duration(&self) -> Option<f64> {
            Some(240.0)
        }

        fn set_volume(&self, volume: f32) -> bridge_traits::error::Result<()> {
            *self.volume.lock() = volume;
            Ok(())
        }

        fn set_listener(&self, listener: MediaElementListener) -> bridge_traits::error::Result<()> {
            *self.listener.lock() = Some(listener);
            Ok(())
        }
    }

    fn subscribed() -> (Arc<EchoElement>, FallbackBackend, mpsc::UnboundedReceiver<crate::backend::BackendSignal>) {
        let element = Arc::new(EchoElement::default());
        let backend = FallbackBackend::new(element.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        backend
            .subscribe_lifecycle(LifecycleSink::new(BackendKind::Fallback, DispatchEpoch::default(), tx))
            .unwrap();
        (element, backend, rx)
    }

    #[tokio::test]
    async fn test_play_loads_source() {
        let (element, backend, mut rx) = subscribed();
        backend
            .play(&PlaybackRequest {
                url: "file:///downloads/t1.mp3".into(),
                title: "Kesariya".into(),
                artist: "Arijit Singh".into(),
                cover: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(element.source.lock().as_deref(), Some("file:///downloads/t1.mp3"));
        assert_eq!(rx.try_recv().unwrap().event, BackendEvent::Playing);
    }

    #[tokio::test]
    async fn test_resume_without_source_fails() {
        let (_element, backend, _rx) = subscribed();
        assert!(matches!(backend.resume().await, Err(PlaybackError::NoTrackLoaded)));
    }

    #[tokio::test]
    async fn test_seek_reports_position() {
        let (_element, backend, mut rx) = subscribed();
        backend.seek(Duration::from_secs(30)).await.unwrap();

        assert_eq!(
            rx.try_recv().unwrap().event,
            BackendEvent::TimeUpdate {
                position: 30.0,
                duration: Some(240.0)
            }
        );
    }

    #[test]
    fn test_volume_is_clamped() {
        let (element, backend, _rx) = subscribed();
        backend.set_volume(1.7).unwrap();
        assert_eq!(*element.volume.lock(), 1.0);
    }

    #[test]
    fn test_element_events_are_normalized() {
        let (element, _backend, mut rx) = subscribed();
        element.fire(MediaElementEvent::LoadedMetadata { duration: Some(f64::NAN) });
        element.fire(MediaElementEvent::Error {
            detail: "MEDIA_ERR_NETWORK".into(),
        });
        element.fire(MediaElementEvent::Ended);

        assert_eq!(rx.try_recv().unwrap().event, BackendEvent::Loaded { duration: None });
        assert_eq!(
            rx.try_recv().unwrap().event,
            BackendEvent::Error {
                detail: "MEDIA_ERR_NETWORK".into()
            }
        );
        assert_eq!(rx.try_recv().unwrap().event, BackendEvent::Ended);
    }
}
