//! Live process table: the latest list from the server plus a search filter and
//! a row cursor.

use crate::types::ProcessEntry;

pub const NO_DATA_TEXT: &str = "No process data available.";
pub const NO_MATCH_TEXT: &str = "No matching processes.";

/// What the table should show right now.
#[derive(Debug, PartialEq)]
pub enum TableView<'a> {
    NoData,
    NoMatches,
    Rows(Vec<&'a ProcessEntry>),
}

impl TableView<'_> {
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            TableView::NoData => Some(NO_DATA_TEXT),
            TableView::NoMatches => Some(NO_MATCH_TEXT),
            TableView::Rows(_) => None,
        }
    }
}

pub fn matches(p: &ProcessEntry, query_lower: &str) -> bool {
    query_lower.is_empty()
        || p.name.to_lowercase().contains(query_lower)
        || p.pid.to_string().contains(query_lower)
}

#[derive(Debug, Default)]
pub struct ProcessTable {
    rows: Vec<ProcessEntry>,
    query: String,
    selected: usize,
    scroll_offset: usize,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list wholesale; filter and cursor are carried over.
    pub fn replace(&mut self, rows: Vec<ProcessEntry>) {
        self.rows = rows;
        self.clamp_cursor();
    }

    pub fn rows(&self) -> &[ProcessEntry] {
        &self.rows
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, q: impl Into<String>) {
        self.query = q.into();
        self.clamp_cursor();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.clamp_cursor();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.clamp_cursor();
    }

    pub fn filtered(&self) -> Vec<&ProcessEntry> {
        let q = self.query.to_lowercase();
        self.rows.iter().filter(|p| matches(p, &q)).collect()
    }

    pub fn view(&self) -> TableView<'_> {
        if self.rows.is_empty() {
            return TableView::NoData;
        }
        let rows = self.filtered();
        if rows.is_empty() {
            TableView::NoMatches
        } else {
            TableView::Rows(rows)
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.filtered().get(self.selected).map(|p| p.pid)
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Move the cursor by `delta` rows and keep it inside a viewport of `page` rows.
    pub fn move_selection(&mut self, delta: isize, page: usize) {
        let n = self.filtered().len();
        if n == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }
        let cur = self.selected as isize + delta;
        self.selected = cur.clamp(0, n as isize - 1) as usize;
        self.follow_cursor(page);
    }

    pub fn select_first(&mut self, page: usize) {
        self.selected = 0;
        self.follow_cursor(page);
    }

    pub fn select_last(&mut self, page: usize) {
        self.selected = self.filtered().len().saturating_sub(1);
        self.follow_cursor(page);
    }

    fn follow_cursor(&mut self, page: usize) {
        let page = page.max(1);
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + page {
            self.scroll_offset = self.selected + 1 - page;
        }
    }

    fn clamp_cursor(&mut self) {
        let n = self.filtered().len();
        let max = n.saturating_sub(1);
        self.selected = self.selected.min(max);
        self.scroll_offset = self.scroll_offset.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, name: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.into(),
            cpu_percent: 0.0,
            memory_percent: 0.0,
        }
    }

    fn pids(v: &[&ProcessEntry]) -> Vec<u32> {
        v.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn filter_matches_pid_substring() {
        let mut t = ProcessTable::new();
        t.replace(vec![proc(10, "init"), proc(234, "nginx")]);
        t.set_query("23");
        assert_eq!(t.filtered(), vec![&proc(234, "nginx")]);
    }

    #[test]
    fn filter_is_case_insensitive_on_name() {
        let mut t = ProcessTable::new();
        t.replace(vec![proc(1, "Nginx"), proc(2, "bash"), proc(3, "NGINX-worker")]);
        t.set_query("nGiN");
        assert_eq!(pids(&t.filtered()), vec![1, 3]);
    }

    #[test]
    fn empty_query_returns_list_unchanged() {
        let list = vec![proc(3, "c"), proc(1, "a"), proc(2, "b")];
        let mut t = ProcessTable::new();
        t.replace(list.clone());
        let out: Vec<ProcessEntry> = t.filtered().into_iter().cloned().collect();
        assert_eq!(out, list);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut t = ProcessTable::new();
        t.replace(vec![proc(11, "sshd"), proc(112, "systemd"), proc(7, "cron")]);
        t.set_query("s");
        let a = pids(&t.filtered());
        let b = pids(&t.filtered());
        assert_eq!(a, b);
        assert_eq!(a, vec![11, 112]);
    }

    #[test]
    fn view_distinguishes_no_data_from_no_matches() {
        let mut t = ProcessTable::new();
        assert_eq!(t.view(), TableView::NoData);
        assert_eq!(t.view().placeholder(), Some(NO_DATA_TEXT));
        t.replace(vec![proc(1, "init")]);
        t.set_query("zzz");
        assert_eq!(t.view(), TableView::NoMatches);
        assert_eq!(t.view().placeholder(), Some(NO_MATCH_TEXT));
        t.pop_query_char();
        t.pop_query_char();
        t.pop_query_char();
        assert!(matches!(t.view(), TableView::Rows(ref r) if r.len() == 1));
    }

    #[test]
    fn cursor_follows_and_clamps() {
        let mut t = ProcessTable::new();
        t.replace((1..=10).map(|i| proc(i, "p")).collect());
        t.move_selection(7, 3);
        assert_eq!(t.selected(), 7);
        assert_eq!(t.scroll_offset(), 5);
        assert_eq!(t.selected_pid(), Some(8));
        // list shrinks under the cursor on the next sample
        t.replace((1..=4).map(|i| proc(i, "p")).collect());
        assert_eq!(t.selected(), 3);
        assert_eq!(t.selected_pid(), Some(4));
        t.select_first(3);
        assert_eq!((t.selected(), t.scroll_offset()), (0, 0));
        t.select_last(3);
        assert_eq!(t.selected(), 3);
    }
}
