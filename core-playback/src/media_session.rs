//! # Now-Playing Integration
//!
//! Mirrors session state onto the host's now-playing surface and routes the
//! surface's transport controls back into the session.

use crate::config::DisplayDefaults;
use crate::session::PlaybackSession;
use bridge_traits::{
    upgrade_insecure_url, ActionDetails, Artwork, HostPlaybackState, MediaAction,
    MediaActionHandler, MediaSessionHost, NowPlayingMetadata, Track,
};
use core_runtime::events::{EventKind, PlayerEvent, Subscription};
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

const ARTWORK_SIZES: &str = "512x512";
const ARTWORK_MIME_TYPE: &str = "image/jpeg";

/// Live connection between a [`PlaybackSession`] and a [`MediaSessionHost`].
///
/// Host failures never reach the session; they are logged at `debug`.
pub struct MediaSessionAdapter {
    subscriptions: Vec<Subscription>,
    actions: Vec<MediaAction>,
}

impl MediaSessionAdapter {
    /// Attach `host` to `session`. Returns `None` when there is no host.
    pub fn attach(session: &PlaybackSession, host: Option<Arc<dyn MediaSessionHost>>) -> Option<Self> {
        let Some(host) = host else {
            debug!("No media session host; now-playing integration disabled");
            return None;
        };

        let config = session.config();
        let defaults = config.display_defaults.clone();
        let upgrade_artwork = config.upgrade_insecure_artwork;
        let bus = session.event_bus();

        let metadata_host = host.clone();
        let track_changes = bus.subscribe(EventKind::TrackChange, move |event| {
            if let PlayerEvent::TrackChange { track } = event {
                let metadata = now_playing_metadata(track, &defaults, upgrade_artwork);
                if let Err(err) = metadata_host.set_metadata(metadata) {
                    debug!(error = %err, "Media session rejected metadata");
                }
            }
        });

        let state_host = host.clone();
        let state_changes = bus.subscribe(EventKind::StateChange, move |event| {
            if let PlayerEvent::StateChange { is_playing } = event {
                let state = if *is_playing {
                    HostPlaybackState::Playing
                } else {
                    HostPlaybackState::Paused
                };
                if let Err(err) = state_host.set_playback_state(state) {
                    debug!(error = %err, "Media session rejected playback state");
                }
            }
        });

        let mut actions = Vec::with_capacity(MediaAction::ALL.len());
        // Weak: the host owns these handlers and the session bus owns the host
        for action in MediaAction::ALL {
            let target = session.downgrade();
            let handler: MediaActionHandler = Arc::new(move |details: ActionDetails| {
                let target = target.clone();
                async move {
                    match target.upgrade() {
                        Some(session) => perform_action(&session, details).await,
                        None => debug!(action = ?details.action, "Session gone; ignoring media action"),
                    }
                }
                .boxed()
            });
            match host.set_action_handler(action, handler) {
                Ok(()) => actions.push(action),
                Err(err) => debug!(?action, error = %err, "Media session action not supported"),
            }
        }

        Some(Self {
            subscriptions: vec![track_changes, state_changes],
            actions,
        })
    }

    /// Actions the host accepted a handler for.
    pub fn registered_actions(&self) -> &[MediaAction] {
        &self.actions
    }

    /// Stop mirroring session events. Action handlers stay with the host.
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
    }
}

async fn perform_action(session: &PlaybackSession, details: ActionDetails) {
    match details.action {
        MediaAction::Play => session.play().await,
        MediaAction::Pause => session.pause().await,
        MediaAction::PreviousTrack => session.prev().await,
        MediaAction::NextTrack => session.next().await,
        MediaAction::SeekTo => match details.seek_time {
            Some(time) => session.seek(time).await,
            None => debug!("seekto action without a seek time"),
        },
        MediaAction::Stop => session.stop().await,
    }
}

/// Host metadata for `track`, with display defaults for missing fields.
pub fn now_playing_metadata(
    track: &Track,
    defaults: &DisplayDefaults,
    upgrade_artwork: bool,
) -> NowPlayingMetadata {
    let artwork = track
        .cover
        .as_deref()
        .filter(|cover| !cover.trim().is_empty())
        .map(|cover| Artwork {
            src: if upgrade_artwork {
                upgrade_insecure_url(cover)
            } else {
                cover.to_string()
            },
            sizes: ARTWORK_SIZES.to_string(),
            mime_type: ARTWORK_MIME_TYPE.to_string(),
        })
        .into_iter()
        .collect();

    NowPlayingMetadata {
        title: non_empty(Some(track.title.as_str()), &defaults.title),
        artist: non_empty(track.artist.as_deref(), &defaults.artist),
        album: non_empty(track.album.as_deref(), &defaults.album),
        artwork,
    }
}

fn non_empty(value: Option<&str>, default: &str) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}
