//! Incident feed: the full list from the latest sample, newest first.

use ratatui::style::Color;

use crate::types::{IncidentEvent, IncidentLevel};

pub const NO_INCIDENTS_TEXT: &str = "No active incidents.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub glyph: &'static str,
    pub color: Color,
    pub rank: u8,
}

pub fn marker(level: IncidentLevel) -> Marker {
    match level {
        IncidentLevel::Critical => Marker {
            glyph: "●",
            color: Color::Red,
            rank: 2,
        },
        IncidentLevel::Warning => Marker {
            glyph: "▲",
            color: Color::Yellow,
            rank: 1,
        },
        IncidentLevel::Info => Marker {
            glyph: "•",
            color: Color::Cyan,
            rank: 0,
        },
    }
}

#[derive(Debug, PartialEq)]
pub enum FeedView<'a> {
    Placeholder(&'static str),
    Items(Vec<&'a IncidentEvent>),
}

#[derive(Debug, Default)]
pub struct IncidentFeed {
    items: Vec<IncidentEvent>,
}

impl IncidentFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, items: Vec<IncidentEvent>) {
        self.items = items;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn view(&self) -> FeedView<'_> {
        if self.items.is_empty() {
            FeedView::Placeholder(NO_INCIDENTS_TEXT)
        } else {
            FeedView::Items(self.items.iter().rev().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    fn inc(level: IncidentLevel, msg: &str, ts: i64) -> IncidentEvent {
        IncidentEvent {
            level,
            message: msg.into(),
            timestamp: Timestamp::Millis(ts),
        }
    }

    #[test]
    fn empty_feed_renders_placeholder() {
        let f = IncidentFeed::new();
        assert_eq!(f.view(), FeedView::Placeholder(NO_INCIDENTS_TEXT));
    }

    #[test]
    fn single_critical_keeps_marker_and_message() {
        let mut f = IncidentFeed::new();
        f.replace(vec![inc(IncidentLevel::Critical, "disk full", 1)]);
        let FeedView::Items(items) = f.view() else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message, "disk full");
        assert_eq!(marker(items[0].level), marker(IncidentLevel::Critical));
        assert_eq!(marker(items[0].level).color, Color::Red);
    }

    #[test]
    fn newest_first_and_replaced_wholesale() {
        let mut f = IncidentFeed::new();
        f.replace(vec![
            inc(IncidentLevel::Info, "a", 1),
            inc(IncidentLevel::Warning, "b", 2),
        ]);
        f.replace(vec![
            inc(IncidentLevel::Info, "a", 1),
            inc(IncidentLevel::Warning, "b", 2),
            inc(IncidentLevel::Critical, "c", 3),
        ]);
        let FeedView::Items(items) = f.view() else {
            panic!("expected items");
        };
        let msgs: Vec<&str> = items.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(msgs, vec!["c", "b", "a"]);
    }

    #[test]
    fn marker_rank_orders_severity() {
        let c = marker(IncidentLevel::Critical).rank;
        let w = marker(IncidentLevel::Warning).rank;
        let i = marker(IncidentLevel::Info).rank;
        assert!(c > w && w > i);
    }
}
