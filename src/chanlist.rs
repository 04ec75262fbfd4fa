//! Channel-list accumulation.
//!
//! LIST replies stream in one channel per message; a [`ChannelListIndex`] is
//! filled entry by entry and finalized once on end-of-LIST, after which it is
//! published into the process-wide cache keyed by connection host.

use serde::Serialize;

/// One entry of a network channel list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChannelListItem {
    pub name: String,
    pub user_count: u32,
    pub topic: String,
}

/// An in-progress or finished channel list for one network.
#[derive(Debug, Clone, Default)]
pub struct ChannelListIndex {
    items: Vec<ChannelListItem>,
    finished: bool,
}

impl ChannelListIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn add(&mut self, item: ChannelListItem) {
        self.items.push(item);
    }

    /// Finalize the index: sorts entries by case-folded channel name.
    pub fn finish(&mut self) {
        self.items
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.finished = true;
    }

    /// Whether [`finish`](Self::finish) has run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The accumulated entries.
    pub fn items(&self) -> &[ChannelListItem] {
        &self.items
    }
}
