//! App main loop: terminal setup, input handling, and dispatch of connection
//! events and terminate results into the dashboard.

use std::io;

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::ClientConfig;
use crate::dashboard::Dashboard;
use crate::kill::{KillError, KillPhase, ProcessControl};
use crate::ui::processes::{page_rows, processes_handle_key};
use crate::ws::{Supervisor, WsEvent};

pub type KillResult = (u32, Result<String, KillError>);

pub struct App<P: ProcessControl> {
    dash: Dashboard,
    control: P,
    searching: bool,
    should_quit: bool,
    last_procs_area: Option<Rect>,
}

impl<P: ProcessControl> App<P> {
    pub fn new(control: P) -> Self {
        Self {
            dash: Dashboard::new(),
            control,
            searching: false,
            should_quit: false,
            last_procs_area: None,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dash
    }

    pub async fn run(&mut self, cfg: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, cfg).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        cfg: &ClientConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (ws_tx, mut ws_rx) = mpsc::channel(64);
        let supervisor =
            Supervisor::new(cfg.url.clone(), cfg.tls_ca.clone(), cfg.reconnect_delay).start(ws_tx);
        let (kill_tx, mut kill_rx) = mpsc::unbounded_channel::<KillResult>();
        let mut input = EventStream::new();

        loop {
            terminal.draw(|f| {
                self.last_procs_area = crate::ui::draw(f, &self.dash, self.searching);
            })?;

            tokio::select! {
                ev = ws_rx.recv() => match ev {
                    Some(WsEvent::State(s)) => self.dash.on_connection(s),
                    Some(WsEvent::Message(raw)) => {
                        self.dash.on_message(&raw);
                    }
                    None => break,
                },
                Some((pid, res)) = kill_rx.recv() => {
                    self.dash.on_terminate_result(pid, res);
                }
                maybe = input.next() => match maybe {
                    Some(Ok(Event::Key(k))) if k.kind == KeyEventKind::Press => {
                        self.handle_key(k, &kill_tx);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        supervisor.abort();
                        return Err(e.into());
                    }
                    None => break,
                },
            }

            if self.should_quit {
                break;
            }
        }

        info!("shutting down");
        supervisor.abort();
        Ok(())
    }

    fn page_size(&self) -> usize {
        self.last_procs_area.map(page_rows).unwrap_or(10)
    }

    pub fn handle_key(&mut self, k: KeyEvent, kill_tx: &mpsc::UnboundedSender<KillResult>) {
        if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        // A notice swallows the next key.
        if self.dash.notice().is_some() {
            self.dash.dismiss_notice();
            return;
        }
        if let KillPhase::Confirming(_) = self.dash.kill_phase() {
            match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    if let Some(pid) = self.dash.confirm_terminate() {
                        self.spawn_terminate(pid, kill_tx);
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.dash.cancel_terminate()
                }
                _ => {}
            }
            return;
        }
        if self.searching {
            match k.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                KeyCode::Backspace => self.dash.table_mut().pop_query_char(),
                KeyCode::Char(c) => self.dash.table_mut().push_query_char(c),
                _ => {
                    let page = self.page_size();
                    processes_handle_key(self.dash.table_mut(), k, page);
                }
            }
            return;
        }

        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Tab => self.dash.toggle_view(),
            KeyCode::Char('k') | KeyCode::Delete => self.dash.request_terminate_selected(),
            _ => {
                let page = self.page_size();
                processes_handle_key(self.dash.table_mut(), k, page);
            }
        }
    }

    fn spawn_terminate(&self, pid: u32, kill_tx: &mpsc::UnboundedSender<KillResult>) {
        info!(pid, "sending terminate");
        let control = self.control.clone();
        let tx = kill_tx.clone();
        tokio::spawn(async move {
            let res = control.terminate(pid).await;
            let _ = tx.send((pid, res));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProcessEntry, TelemetrySample};
    use std::future::Future;

    #[derive(Clone)]
    struct Refuse;

    impl ProcessControl for Refuse {
        fn terminate(&self, _pid: u32) -> impl Future<Output = Result<String, KillError>> + Send {
            async { Err(KillError::Refused("nope".into())) }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn seed(app: &mut App<Refuse>) {
        app.dash.apply_sample_at(
            TelemetrySample {
                cpu: 1.0,
                memory: 1.0,
                disk_percent: 1.0,
                net_sent: 0,
                net_recv: 0,
                updated_at: None,
                system: None,
                processes: vec![
                    ProcessEntry {
                        pid: 10,
                        name: "init".into(),
                        cpu_percent: 0.0,
                        memory_percent: 0.0,
                    },
                    ProcessEntry {
                        pid: 234,
                        name: "nginx".into(),
                        cpu_percent: 0.0,
                        memory_percent: 0.0,
                    },
                ],
                incidents: vec![],
                history: None,
            },
            "t".into(),
        );
    }

    #[test]
    fn search_mode_edits_query() {
        let mut app = App::new(Refuse);
        let (tx, _rx) = mpsc::unbounded_channel();
        seed(&mut app);
        app.handle_key(key(KeyCode::Char('/')), &tx);
        for c in "23x".chars() {
            app.handle_key(key(KeyCode::Char(c)), &tx);
        }
        app.handle_key(key(KeyCode::Backspace), &tx);
        app.handle_key(key(KeyCode::Enter), &tx);
        assert_eq!(app.dashboard().table().query(), "23");
        // 'q' typed while not searching quits
        app.handle_key(key(KeyCode::Char('q')), &tx);
        assert!(app.should_quit);
    }

    #[test]
    fn cancel_never_reaches_the_server() {
        let mut app = App::new(Refuse);
        let (tx, mut rx) = mpsc::unbounded_channel();
        seed(&mut app);
        app.handle_key(key(KeyCode::Char('k')), &tx);
        assert_eq!(app.dashboard().kill_phase(), KillPhase::Confirming(10));
        app.handle_key(key(KeyCode::Char('n')), &tx);
        assert_eq!(app.dashboard().kill_phase(), KillPhase::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn confirmed_failure_produces_notice() {
        let mut app = App::new(Refuse);
        let (tx, mut rx) = mpsc::unbounded_channel();
        seed(&mut app);
        app.handle_key(key(KeyCode::Down), &tx);
        app.handle_key(key(KeyCode::Char('k')), &tx);
        app.handle_key(key(KeyCode::Char('y')), &tx);
        assert_eq!(app.dashboard().kill_phase(), KillPhase::InFlight(234));
        let (pid, res) = rx.recv().await.unwrap();
        assert_eq!(pid, 234);
        app.dash.on_terminate_result(pid, res);
        assert_eq!(
            app.dashboard().notice().map(|n| n.text()),
            Some(crate::kill::KILL_FAILED_TEXT)
        );
        assert_eq!(app.dashboard().table().rows().len(), 2);
        // any key dismisses the notice
        app.handle_key(key(KeyCode::Char('x')), &tx);
        assert!(app.dashboard().notice().is_none());
    }
}
