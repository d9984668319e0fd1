//! Remote process termination: a two-phase (request, then confirm) command
//! sent as `POST /kill/{pid}` to the telemetry server.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::KillReply;

pub const KILL_FAILED_TEXT: &str = "Unable to terminate process.";
pub const KILL_OK_FALLBACK_TEXT: &str = "Process terminated.";

#[derive(Debug, thiserror::Error)]
pub enum KillError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("server refused: {0}")]
    Refused(String),
    #[error("cannot read CA bundle: {0}")]
    Ca(#[from] std::io::Error),
}

/// Something that can ask the server to terminate a process.
///
/// Resolves to the server's user-facing message on success.
pub trait ProcessControl: Clone + Send + Sync + 'static {
    fn terminate(&self, pid: u32) -> impl Future<Output = Result<String, KillError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpProcessControl {
    client: reqwest::Client,
    base: String,
}

impl HttpProcessControl {
    pub fn new(base: &str, tls_ca: Option<&Path>) -> Result<Self, KillError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(10));
        if let Some(path) = tls_ca {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }
        Ok(Self {
            client: builder.build()?,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn kill_url(&self, pid: u32) -> String {
        format!("{}/kill/{pid}", self.base)
    }
}

impl ProcessControl for HttpProcessControl {
    fn terminate(&self, pid: u32) -> impl Future<Output = Result<String, KillError>> + Send {
        let req = self.client.post(self.kill_url(pid));
        async move {
            let resp = req.send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(KillError::Status(status));
            }
            let reply: KillReply = resp.json().await?;
            if let Some(err) = reply.error {
                let text = match err.as_str() {
                    Some(s) => s.to_string(),
                    None => err.to_string(),
                };
                return Err(KillError::Refused(text));
            }
            Ok(reply
                .message
                .unwrap_or_else(|| KILL_OK_FALLBACK_TEXT.to_string()))
        }
    }
}

/// User-facing text for a finished command.
pub fn outcome_text(res: &Result<String, KillError>) -> String {
    match res {
        Ok(msg) => msg.clone(),
        Err(_) => KILL_FAILED_TEXT.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillPhase {
    #[default]
    Idle,
    Confirming(u32),
    InFlight(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillRefused {
    Busy(u32),
}

/// Tracks the single terminate command the user may have pending.
#[derive(Debug, Default)]
pub struct KillFlow {
    phase: KillPhase,
}

impl KillFlow {
    pub fn phase(&self) -> KillPhase {
        self.phase
    }

    /// Phase one: record the intent and wait for confirmation.
    pub fn request(&mut self, pid: u32) -> Result<(), KillRefused> {
        if let KillPhase::InFlight(busy) = self.phase {
            return Err(KillRefused::Busy(busy));
        }
        debug!(pid, "terminate requested");
        self.phase = KillPhase::Confirming(pid);
        Ok(())
    }

    /// Phase two: the pid to send, if a request is awaiting confirmation.
    pub fn confirm(&mut self) -> Option<u32> {
        match self.phase {
            KillPhase::Confirming(pid) => {
                self.phase = KillPhase::InFlight(pid);
                Some(pid)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.phase, KillPhase::Confirming(_)) {
            self.phase = KillPhase::Idle;
        }
    }

    pub fn finish(&mut self, pid: u32, res: &Result<String, KillError>) {
        if let Err(e) = res {
            warn!(pid, error = %e, "terminate failed");
        }
        if self.phase == KillPhase::InFlight(pid) {
            self.phase = KillPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_phase_flow() {
        let mut f = KillFlow::default();
        assert_eq!(f.confirm(), None);
        f.request(42).unwrap();
        assert_eq!(f.phase(), KillPhase::Confirming(42));
        assert_eq!(f.confirm(), Some(42));
        assert_eq!(f.phase(), KillPhase::InFlight(42));
        assert_eq!(f.request(7), Err(KillRefused::Busy(42)));
        f.finish(42, &Ok("done".into()));
        assert_eq!(f.phase(), KillPhase::Idle);
    }

    #[test]
    fn cancel_discards_intent_without_sending() {
        let mut f = KillFlow::default();
        f.request(5).unwrap();
        f.cancel();
        assert_eq!(f.phase(), KillPhase::Idle);
        assert_eq!(f.confirm(), None);
    }

    #[test]
    fn outcome_text_is_generic_on_failure() {
        let err: Result<String, KillError> = Err(KillError::Status(StatusCode::NOT_FOUND));
        assert_eq!(outcome_text(&err), KILL_FAILED_TEXT);
        assert_eq!(outcome_text(&Ok("Process 9 terminated.".into())), "Process 9 terminated.");
    }

    #[test]
    fn kill_url_joins_base() {
        let ctl = HttpProcessControl::new("http://127.0.0.1:5000/", None).unwrap();
        assert_eq!(ctl.kill_url(12), "http://127.0.0.1:5000/kill/12");
    }
}
