use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

/// A pending track and the moment it was queued
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    pub metadata: TrackMetadata,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn new(metadata: TrackMetadata) -> Self {
        Self {
            metadata,
            enqueued_at: Utc::now(),
        }
    }
}

/// FIFO of tracks waiting to be played for one guild.
///
/// The track currently playing is never stored here: it leaves the queue at the
/// moment it is handed to the voice connection.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    items: VecDeque<QueueItem>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track to the back of the queue
    pub fn push_back(&mut self, item: QueueItem) {
        self.items.push_back(item);
    }

    /// Put a track back at the head of the queue so it plays next
    pub fn push_front(&mut self, item: QueueItem) {
        self.items.push_front(item);
    }

    pub fn pop_front(&mut self) -> Option<QueueItem> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&QueueItem> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Display strings for every pending track, in play order
    pub fn snapshot(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.metadata.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(url: &str) -> QueueItem {
        QueueItem::new(TrackMetadata::from_url(url))
    }

    #[test]
    fn test_pop_front_preserves_insertion_order() {
        let mut queue = PlaybackQueue::new();
        queue.push_back(item("https://youtu.be/a"));
        queue.push_back(item("https://youtu.be/b"));
        queue.push_back(item("https://youtu.be/c"));

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_front())
            .map(|item| item.metadata.url)
            .collect();

        assert_eq!(
            order,
            vec!["https://youtu.be/a", "https://youtu.be/b", "https://youtu.be/c"]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_front_plays_next() {
        let mut queue = PlaybackQueue::new();
        queue.push_back(item("https://youtu.be/b"));
        queue.push_front(item("https://youtu.be/a"));

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.peek().map(|item| item.metadata.url.as_str()),
            Some("https://youtu.be/a")
        );
    }

    #[test]
    fn test_snapshot_lists_pending_tracks() {
        let mut queue = PlaybackQueue::new();
        queue.push_back(item("https://youtu.be/a"));
        queue.push_back(QueueItem::new(TrackMetadata {
            title: "Song B".to_string(),
            url: "https://youtu.be/b".to_string(),
            duration: None,
        }));

        assert_eq!(
            queue.snapshot(),
            vec!["https://youtu.be/a", "Song B - https://youtu.be/b"]
        );
    }

    #[test]
    fn test_clear_empties_queue() {
        let mut queue = PlaybackQueue::new();
        queue.push_back(item("https://youtu.be/a"));
        queue.clear();

        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
        assert!(queue.snapshot().is_empty());
    }
}
