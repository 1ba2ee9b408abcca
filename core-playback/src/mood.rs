//! # Mood Classification
//!
//! Turns a finished track into a search query for auto-continuation.
//!
//! The track's title, artist and album are joined and lower-cased, then
//! checked against an ordered rule table. The first matching rule's query
//! wins. Without a match the primary artist is used ("<artist> best songs"),
//! and without an artist a generic query.

use bridge_traits::Track;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
enum Matcher {
    /// Any keyword occurring as a substring matches.
    Keywords(Vec<String>),
    Predicate(Predicate),
}

/// One entry of the classification table.
#[derive(Clone)]
pub struct MoodRule {
    matcher: Matcher,
    query: String,
}

impl MoodRule {
    /// Rule matching when any of `keywords` occurs in the track text.
    /// Keywords are compared lower-cased.
    pub fn keywords<I, S>(keywords: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            matcher: Matcher::Keywords(
                keywords
                    .into_iter()
                    .map(|kw| kw.as_ref().to_lowercase())
                    .filter(|kw| !kw.is_empty())
                    .collect(),
            ),
            query: query.into(),
        }
    }

    /// Rule matching when `predicate` accepts the lower-cased track text.
    pub fn predicate<F>(predicate: F, query: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: Matcher::Predicate(Arc::new(predicate)),
            query: query.into(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Keywords(keywords) => keywords.iter().any(|kw| text.contains(kw.as_str())),
            Matcher::Predicate(predicate) => predicate(text),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Debug for MoodRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MoodRule");
        match &self.matcher {
            Matcher::Keywords(keywords) => s.field("keywords", keywords),
            Matcher::Predicate(_) => s.field("predicate", &"<fn>"),
        };
        s.field("query", &self.query).finish()
    }
}

/// Ordered, first-match mood classifier.
#[derive(Debug, Clone)]
pub struct MoodClassifier {
    rules: Vec<MoodRule>,
    generic_query: String,
    empty_query: String,
}

impl Default for MoodClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl MoodClassifier {
    pub fn new(rules: Vec<MoodRule>) -> Self {
        Self {
            rules,
            generic_query: "trending hindi songs 2025".to_string(),
            empty_query: "hindi songs".to_string(),
        }
    }

    /// Query used when no rule matches and the track has no artist.
    pub fn with_generic_query(mut self, query: impl Into<String>) -> Self {
        self.generic_query = query.into();
        self
    }

    /// Query used when there is no track to classify.
    pub fn with_empty_query(mut self, query: impl Into<String>) -> Self {
        self.empty_query = query.into();
        self
    }

    /// Append a rule after the existing ones.
    pub fn push_rule(&mut self, rule: MoodRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[MoodRule] {
        &self.rules
    }

    pub fn classify(&self, track: &Track) -> String {
        let text = format!(
            "{} {} {}",
            track.title,
            track.artist.as_deref().unwrap_or_default(),
            track.album.as_deref().unwrap_or_default()
        )
        .to_lowercase();

        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&text)) {
            return rule.query.clone();
        }

        match track.primary_artist() {
            Some(artist) => format!("{artist} best songs"),
            None => self.generic_query.clone(),
        }
    }

    /// Like [`classify`](Self::classify), with the empty query for `None`.
    pub fn query_for(&self, track: Option<&Track>) -> String {
        track
            .map(|track| self.classify(track))
            .unwrap_or_else(|| self.empty_query.clone())
    }
}

/// The stock table, in priority order.
pub fn default_rules() -> Vec<MoodRule> {
    vec![
        MoodRule::keywords(
            [
                "sad", "dard", "dil", "tanha", "alvida", "bewafa", "rona", "aansu", "judai",
                "broken", "heartbreak", "emotional",
            ],
            "sad emotional hindi songs",
        ),
        MoodRule::keywords(
            ["romantic", "love", "pyar", "ishq", "mohabbat", "prem", "valentine", "couple"],
            "romantic love hindi songs",
        ),
        MoodRule::keywords(
            ["party", "dance", "club", "dj", "remix", "bass", "beat", "drop", "edm"],
            "party dance hindi songs",
        ),
        MoodRule::keywords(
            ["lofi", "lo-fi", "chill", "relax", "sleep", "calm", "acoustic", "unplugged", "slowed"],
            "lofi chill hindi songs",
        ),
        MoodRule::keywords(
            ["motivat", "inspire", "workout", "gym", "energy", "power", "pump"],
            "motivational workout hindi songs",
        ),
        MoodRule::keywords(
            ["sufi", "qawwali", "devotion", "bhajan", "spiritual"],
            "sufi devotional songs",
        ),
        MoodRule::keywords(
            ["rap", "hip hop", "hiphop", "rapper", "bars"],
            "hindi rap hip hop songs",
        ),
        MoodRule::keywords(
            ["old", "classic", "90s", "80s", "70s", "retro", "purana"],
            "old classic bollywood hits",
        ),
        MoodRule::keywords(["punjabi", "bhangra", "jatt"], "punjabi latest songs"),
    ]
}
