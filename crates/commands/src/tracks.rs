//! Per-guild track queue. No audio: tracks are titles with a requester.

use std::collections::{HashMap, VecDeque};

use {cadence_dispatch::{GuildId, UserId}, tokio::sync::Mutex};

/// Maximum number of autocomplete choices the platform accepts.
pub const MAX_SUGGESTIONS: usize = 25;

/// Autocomplete choice names and values are capped at this many characters,
/// so stored titles are too.
pub const MAX_TITLE_CHARS: usize = 100;

/// Cut `title` to [`MAX_TITLE_CHARS`] characters, on a char boundary.
pub fn clamp_title(title: &str) -> &str {
    match title.char_indices().nth(MAX_TITLE_CHARS) {
        Some((end, _)) => &title[..end],
        None => title,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub requested_by: UserId,
}

#[derive(Debug, Default)]
struct GuildQueue {
    pending: VecDeque<Track>,
    /// Every title ever queued, most recent last, without duplicates.
    history: Vec<String>,
}

#[derive(Debug, Default)]
pub struct TrackQueue {
    guilds: Mutex<HashMap<GuildId, GuildQueue>>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track; returns its 1-based position. Over-long titles are
    /// clamped.
    pub async fn push(&self, guild: GuildId, mut track: Track) -> usize {
        if track.title.chars().count() > MAX_TITLE_CHARS {
            track.title = clamp_title(&track.title).to_string();
        }
        let mut guilds = self.guilds.lock().await;
        let queue = guilds.entry(guild).or_default();
        queue.history.retain(|t| *t != track.title);
        queue.history.push(track.title.clone());
        queue.pending.push_back(track);
        queue.pending.len()
    }

    pub async fn pop(&self, guild: GuildId) -> Option<Track> {
        self.guilds
            .lock()
            .await
            .get_mut(&guild)
            .and_then(|q| q.pending.pop_front())
    }

    pub async fn list(&self, guild: GuildId) -> Vec<Track> {
        self.guilds
            .lock()
            .await
            .get(&guild)
            .map(|q| q.pending.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every pending track; returns how many were removed.
    pub async fn clear(&self, guild: GuildId) -> usize {
        let mut guilds = self.guilds.lock().await;
        match guilds.get_mut(&guild) {
            Some(queue) => {
                let removed = queue.pending.len();
                queue.pending.clear();
                removed
            },
            None => 0,
        }
    }

    /// Previously queued titles containing `partial` (case-insensitive),
    /// most recent first.
    pub async fn suggest(&self, guild: GuildId, partial: &str) -> Vec<String> {
        let needle = partial.trim().to_lowercase();
        let guilds = self.guilds.lock().await;
        let Some(queue) = guilds.get(&guild) else {
            return Vec::new();
        };
        queue
            .history
            .iter()
            .rev()
            .filter(|title| title.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(|title| clamp_title(title).to_string())
            .collect()
    }
}
