//! Track model shared between the host and the playback core.
//!
//! A [`Track`] is produced by host collaborators (search results, library
//! metadata, queue contents) and consumed by the playback engine. Tracks are
//! treated as immutable values: re-caching the same id replaces the previous
//! value wholesale.

use serde::{Deserialize, Serialize};

/// Kind of media a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Song,
    PodcastEpisode,
}

/// A playable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier.
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Artist credit, possibly several artists joined by commas.
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    /// Cover art reference (URL).
    #[serde(default)]
    pub cover: Option<String>,
    /// Duration in seconds. Zero when unknown (live or stream content).
    #[serde(default)]
    pub duration: f64,
    /// Remote media reference. Empty when the track cannot be played.
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "type")]
    pub kind: MediaKind,
    /// Size in bytes, when the content provider reports one.
    #[serde(default)]
    pub size: Option<u64>,
}

impl Track {
    /// Create a song with the given id, title and media reference.
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            album: None,
            cover: None,
            duration: 0.0,
            url: url.into(),
            kind: MediaKind::Song,
            size: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration = duration_secs;
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Returns `true` if the track carries a usable media reference.
    pub fn has_media(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Duration in seconds when it is known, finite and positive.
    pub fn known_duration(&self) -> Option<f64> {
        (self.duration.is_finite() && self.duration > 0.0).then_some(self.duration)
    }

    /// The text before the first comma of the artist credit, trimmed.
    pub fn primary_artist(&self) -> Option<&str> {
        let artist = self.artist.as_deref()?;
        let primary = artist.split(',').next().unwrap_or(artist).trim();
        (!primary.is_empty()).then_some(primary)
    }

    pub fn is_podcast_episode(&self) -> bool {
        self.kind == MediaKind::PodcastEpisode
    }
}

/// Rewrite an `http://` reference (any letter case) to `https://`.
pub fn upgrade_insecure_url(url: &str) -> String {
    const INSECURE: &str = "http://";
    match url.get(..INSECURE.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(INSECURE) => {
            format!("https://{}", &url[INSECURE.len()..])
        }
        _ => url.to_string(),
    }
}
