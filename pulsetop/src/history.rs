//! Bounded history buffers for charts.

use std::collections::VecDeque;

/// Points kept per chart.
pub const WINDOW_CAPACITY: usize = 30;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    while dq.len() >= cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Fixed-capacity sliding window of labelled values, oldest first.
#[derive(Debug, Clone)]
pub struct TimeSeriesWindow {
    points: VecDeque<SeriesPoint>,
    cap: usize,
}

impl TimeSeriesWindow {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn append(&mut self, label: impl Into<String>, value: f64) {
        push_capped(
            &mut self.points,
            SeriesPoint {
                label: label.into(),
                value,
            },
            self.cap,
        );
    }

    /// Discard the current contents and keep the newest `cap` of `pairs`.
    pub fn replace_all<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        self.points.clear();
        for (label, value) in pairs {
            self.append(label, value);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn snapshot(&self) -> &VecDeque<SeriesPoint> {
        &self.points
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl Default for TimeSeriesWindow {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}
