//! Dashboard state and sample dispatch. Everything the UI draws lives here and
//! is handed out only through read-only accessors.

use chrono::Local;
use tracing::{debug, info, warn};

use crate::history::{TimeSeriesWindow, WINDOW_CAPACITY};
use crate::incidents::IncidentFeed;
use crate::kill::{outcome_text, KillError, KillFlow, KillPhase, KillRefused};
use crate::table::ProcessTable;
use crate::types::{HistoryPoint, SystemInfo, TelemetrySample, Timestamp, LABEL_FORMAT};
use crate::ws::ConnState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Overview,
    Details,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            View::Overview => View::Details,
            View::Details => View::Overview,
        }
    }

    pub fn shows_system(self) -> bool {
        self == View::Details
    }
}

/// Latest scalar readings, replaced on every sample.
#[derive(Debug, Clone, Default)]
pub struct Scalars {
    pub cpu: f64,
    pub memory: f64,
    pub disk_percent: f64,
    pub net_sent: u64,
    pub net_recv: u64,
    pub updated_at: Option<Timestamp>,
    pub received_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Error(s) => s,
        }
    }
}

/// One-shot history seeding, re-armed on every disconnect.
#[derive(Debug, Default)]
pub struct Hydration {
    loaded: bool,
}

impl Hydration {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn reset(&mut self) {
        self.loaded = false;
    }

    /// Seed both windows from `history` unless already loaded. The first call
    /// after a reset always marks the hydration as done, even with no history.
    /// Returns true when the windows were seeded.
    pub fn reconcile(
        &mut self,
        history: Option<&[HistoryPoint]>,
        cpu: &mut TimeSeriesWindow,
        memory: &mut TimeSeriesWindow,
    ) -> bool {
        if self.loaded {
            return false;
        }
        self.loaded = true;
        let Some(history) = history.filter(|h| !h.is_empty()) else {
            return false;
        };
        let tail = &history[history.len().saturating_sub(WINDOW_CAPACITY)..];
        cpu.replace_all(tail.iter().map(|h| (h.timestamp.label(), h.cpu)));
        memory.replace_all(tail.iter().map(|h| (h.timestamp.label(), h.memory)));
        true
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    conn: Option<ConnState>,
    hydration: Hydration,
    scalars: Option<Scalars>,
    system: Option<SystemInfo>,
    cpu_window: TimeSeriesWindow,
    mem_window: TimeSeriesWindow,
    table: ProcessTable,
    incidents: IncidentFeed,
    kill: KillFlow,
    notice: Option<Notice>,
    view: View,
    malformed: u64,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed re-arms hydration but keeps both windows. They are replaced by
    /// the next connection's history; without one, new points append after
    /// the old connection's.
    pub fn on_connection(&mut self, state: ConnState) {
        debug!(?state, "connection state");
        if state == ConnState::Closed {
            self.hydration.reset();
        }
        self.conn = Some(state);
    }

    /// Entry point for raw frames. Malformed payloads are dropped with no state change.
    pub fn on_message(&mut self, raw: &str) -> bool {
        match TelemetrySample::parse(raw) {
            Ok(sample) => {
                self.apply_sample(sample);
                true
            }
            Err(e) => {
                self.malformed += 1;
                warn!(error = %e, "invalid telemetry payload");
                false
            }
        }
    }

    pub fn apply_sample(&mut self, sample: TelemetrySample) {
        let now = Local::now().format(LABEL_FORMAT).to_string();
        self.apply_sample_at(sample, now);
    }

    /// Apply one sample, labelling live chart points with `now`.
    pub fn apply_sample_at(&mut self, sample: TelemetrySample, now: String) {
        // 1. bootstrap history
        if self.hydration.reconcile(
            sample.history.as_deref(),
            &mut self.cpu_window,
            &mut self.mem_window,
        ) {
            info!(points = self.cpu_window.len(), "history loaded");
        }

        // 2. scalar displays
        if self.view.shows_system() {
            if let Some(sys) = sample.system {
                self.system = Some(sys);
            }
        }
        self.scalars = Some(Scalars {
            cpu: sample.cpu,
            memory: sample.memory,
            disk_percent: sample.disk_percent,
            net_sent: sample.net_sent,
            net_recv: sample.net_recv,
            updated_at: sample.updated_at,
            received_at: now.clone(),
        });

        // 3. live points
        if self.hydration.is_loaded() {
            self.cpu_window.append(now.clone(), sample.cpu);
            self.mem_window.append(now, sample.memory);
        }

        // 4. processes, 5. incidents
        self.table.replace(sample.processes);
        self.incidents.replace(sample.incidents);
    }

    pub fn request_terminate(&mut self, pid: u32) {
        match self.kill.request(pid) {
            Ok(()) => {}
            Err(KillRefused::Busy(busy)) => {
                self.notice = Some(Notice::Info(format!(
                    "Still waiting on process {busy}, try again shortly."
                )));
            }
        }
    }

    /// Terminate the selected row, if any.
    pub fn request_terminate_selected(&mut self) {
        if let Some(pid) = self.table.selected_pid() {
            self.request_terminate(pid);
        }
    }

    /// The pid to send to the server, if a request was awaiting confirmation.
    pub fn confirm_terminate(&mut self) -> Option<u32> {
        self.kill.confirm()
    }

    pub fn cancel_terminate(&mut self) {
        self.kill.cancel();
    }

    pub fn on_terminate_result(&mut self, pid: u32, res: Result<String, KillError>) {
        self.kill.finish(pid, &res);
        let text = outcome_text(&res);
        self.notice = Some(match res {
            Ok(_) => Notice::Info(text),
            Err(_) => Notice::Error(text),
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    pub fn conn_state(&self) -> Option<ConnState> {
        self.conn
    }
    pub fn history_loaded(&self) -> bool {
        self.hydration.is_loaded()
    }
    pub fn scalars(&self) -> Option<&Scalars> {
        self.scalars.as_ref()
    }
    pub fn system(&self) -> Option<&SystemInfo> {
        self.system.as_ref()
    }
    pub fn cpu_window(&self) -> &TimeSeriesWindow {
        &self.cpu_window
    }
    pub fn mem_window(&self) -> &TimeSeriesWindow {
        &self.mem_window
    }
    pub fn table(&self) -> &ProcessTable {
        &self.table
    }
    pub fn table_mut(&mut self) -> &mut ProcessTable {
        &mut self.table
    }
    pub fn incidents(&self) -> &IncidentFeed {
        &self.incidents
    }
    pub fn kill_phase(&self) -> KillPhase {
        self.kill.phase()
    }
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
    pub fn view(&self) -> View {
        self.view
    }
    pub fn malformed_count(&self) -> u64 {
        self.malformed
    }
}
