use serde::{
    Deserialize,
    Serialize,
};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }
}

/// Past round results, newest first, feeding the scrolling result strip.
///
/// Unbounded unless built with a non-zero [`HistoryLedger::with_capacity`], in
/// which case the oldest entries are evicted once the cap is reached.
#[derive(Clone, Debug, Default)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    capacity: Option<usize>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity keeps every entry.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: (capacity > 0).then_some(capacity),
        }
    }

    /// Prepend a freshly identified entry. Blank text is ignored.
    pub fn append(&mut self, text: &str) -> Option<&HistoryEntry> {
        if text.trim().is_empty() {
            debug!("ignoring blank history entry");
            return None;
        }
        self.entries.push_front(HistoryEntry::new(text));
        self.evict();
        self.entries.front()
    }

    /// Replace the whole ledger, keeping the given order (newest first).
    pub fn bulk_load(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries.into();
        self.evict();
        debug!(len = self.entries.len(), "history ledger loaded");
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict(&mut self) {
        if let Some(cap) = self.capacity {
            self.entries.truncate(cap);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn texts(ledger: &HistoryLedger) -> Vec<&str> {
        ledger.entries().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn append__prepends_newest_entry() {
        // given
        let mut ledger = HistoryLedger::new();
        ledger.append("2.00");

        // when
        ledger.append("0.00");

        // then
        assert_eq!(texts(&ledger), vec!["0.00", "2.00"]);
    }

    #[test]
    fn append__ignores_blank_text() {
        let mut ledger = HistoryLedger::new();

        assert!(ledger.append("").is_none());
        assert!(ledger.append("   ").is_none());

        assert!(ledger.is_empty());
    }

    #[test]
    fn append__generates_unique_ids() {
        let mut ledger = HistoryLedger::new();

        ledger.append("1.50");
        ledger.append("1.50");

        let ids: Vec<_> = ledger.entries().map(|e| e.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn append__evicts_oldest_when_capped() {
        let mut ledger = HistoryLedger::with_capacity(2);

        ledger.append("1.00");
        ledger.append("2.00");
        ledger.append("3.00");

        assert_eq!(texts(&ledger), vec!["3.00", "2.00"]);
    }

    #[test]
    fn append__zero_capacity_keeps_every_entry() {
        let mut ledger = HistoryLedger::with_capacity(0);

        assert!(ledger.append("2.00").is_some());
        ledger.append("0.00");

        assert_eq!(texts(&ledger), vec!["0.00", "2.00"]);
    }

    #[test]
    fn bulk_load__replaces_existing_entries() {
        // given
        let mut ledger = HistoryLedger::new();
        ledger.append("9.99");
        let seed = vec![
            HistoryEntry {
                id: "a".into(),
                text: "2.00".into(),
            },
            HistoryEntry {
                id: "b".into(),
                text: "0.00".into(),
            },
        ];

        // when
        ledger.bulk_load(seed.clone());

        // then
        assert_eq!(ledger.entries().cloned().collect::<Vec<_>>(), seed);
    }

    #[test]
    fn bulk_load__respects_capacity() {
        let mut ledger = HistoryLedger::with_capacity(1);

        ledger.bulk_load(vec![HistoryEntry::new("3.00"), HistoryEntry::new("1.00")]);

        assert_eq!(texts(&ledger), vec!["3.00"]);
    }
}
