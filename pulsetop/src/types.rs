//! Types that mirror the telemetry server's JSON schema.

use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Wall-clock label format used for chart points and timestamps.
pub const LABEL_FORMAT: &str = "%H:%M:%S";

// Fractional epochs below this are seconds, above it milliseconds.
const SECONDS_CUTOFF: f64 = 1e11;

/// A point in time as the server sends it: RFC 3339 text, integer epoch
/// milliseconds, or a fractional epoch (seconds or milliseconds).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Epoch(f64),
    Text(String),
}

impl Timestamp {
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            Timestamp::Millis(ms) => Local.timestamp_millis_opt(*ms).single(),
            Timestamp::Epoch(v) if v.is_finite() => {
                let ms = if v.abs() < SECONDS_CUTOFF { v * 1000.0 } else { *v };
                Local.timestamp_millis_opt(ms.round() as i64).single()
            }
            Timestamp::Epoch(_) => None,
            Timestamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Local)),
        }
    }

    /// Local `HH:MM:SS`; unparsable text is returned verbatim.
    pub fn label(&self) -> String {
        match self.to_local() {
            Some(dt) => dt.format(LABEL_FORMAT).to_string(),
            None => match self {
                Timestamp::Text(s) => s.clone(),
                Timestamp::Millis(ms) => ms.to_string(),
                Timestamp::Epoch(v) => v.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub memory_percent: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentLevel {
    Info,
    Warning,
    Critical,
}

impl IncidentLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentLevel::Info => "INFO",
            IncidentLevel::Warning => "WARNING",
            IncidentLevel::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct IncidentEvent {
    pub level: IncidentLevel,
    pub message: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: Timestamp,
    pub cpu: f64,
    pub memory: f64,
}

/// Static host facts, shown on the details view.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub cpu_count: Option<u32>,
    // MHz
    pub cpu_freq: Option<f64>,
    pub mem_total: Option<u64>,
    pub disk_total: Option<u64>,
    pub disk_free: Option<u64>,
    pub boot_time: Option<String>,
    pub os_name: Option<String>,
}

/// One telemetry tick. Consumed immediately by the dashboard, never retained.
///
/// The five scalars are required. Everything else decodes leniently: `null`
/// or a value of the wrong shape counts as absent, and list entries that do
/// not decode are dropped one by one.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySample {
    pub cpu: f64,
    pub memory: f64,
    pub disk_percent: f64,
    // cumulative totals reported by the server
    pub net_sent: u64,
    pub net_recv: u64,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub updated_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub system: Option<SystemInfo>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub processes: Vec<ProcessEntry>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub incidents: Vec<IncidentEvent>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub history: Option<Vec<HistoryPoint>>,
}

fn lenient_opt<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    if v.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(v) {
        Ok(t) => Ok(Some(t)),
        Err(e) => {
            debug!(error = %e, "ignoring undecodable field");
            Ok(None)
        }
    }
}

fn lenient_opt_vec<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(None);
    };
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.len() < total {
        debug!(dropped = total - kept.len(), "ignoring undecodable entries");
    }
    Ok(Some(kept))
}

fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(lenient_opt_vec(d)?.unwrap_or_default())
}

impl TelemetrySample {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Reply body of `POST /kill/{pid}`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct KillReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_server_payload() {
        let raw = r#"{
            "cpu": 12.5, "memory": 40.0, "disk_percent": 71.2,
            "net_sent": 1024, "net_recv": 2048,
            "processes": [{"pid": 1, "name": "init", "cpu_percent": 0.1, "memory_percent": 0.2}],
            "system": {"cpu_count": 8, "cpu_freq": 2400.0, "mem_total": 1, "disk_total": 2,
                       "disk_free": 1, "boot_time": "2024-01-01T00:00:00+00:00", "os_name": "posix"},
            "updated_at": "2024-01-01T00:00:01+00:00"
        }"#;
        let s = TelemetrySample::parse(raw).unwrap();
        assert_eq!(s.processes.len(), 1);
        assert!(s.incidents.is_empty());
        assert!(s.history.is_none());
        assert_eq!(s.system.unwrap().cpu_count, Some(8));
    }

    #[test]
    fn missing_scalar_is_malformed() {
        let raw = r#"{"cpu": 1.0, "memory": 2.0, "net_sent": 0, "net_recv": 0}"#;
        assert!(TelemetrySample::parse(raw).is_err());
        assert!(TelemetrySample::parse("not json").is_err());
    }

    #[test]
    fn incident_levels_are_uppercase() {
        let raw = r#"{"level": "CRITICAL", "message": "disk full", "timestamp": 1700000000000}"#;
        let inc: IncidentEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(inc.level, IncidentLevel::Critical);
        assert_eq!(inc.timestamp, Timestamp::Millis(1_700_000_000_000));
        assert!(IncidentLevel::Critical > IncidentLevel::Warning);
        assert!(IncidentLevel::Warning > IncidentLevel::Info);
    }

    #[test]
    fn bad_nested_records_do_not_poison_the_sample() {
        let raw = r#"{
            "cpu": 55.0, "memory": 40.0, "disk_percent": 10.0, "net_sent": 1, "net_recv": 2,
            "incidents": [
                {"level": "ERROR", "message": "unknown level", "timestamp": 1},
                {"level": "WARNING", "message": "hot", "timestamp": 1700000000000}
            ],
            "processes": [
                {"pid": 3, "name": null, "cpu_percent": 0.0, "memory_percent": 0.0},
                {"pid": 4, "name": "sshd", "cpu_percent": 0.5, "memory_percent": 0.1}
            ],
            "history": [{"timestamp": 1700000000.5, "cpu": 1.0, "memory": 2.0}],
            "system": "n/a",
            "updated_at": null
        }"#;
        let s = TelemetrySample::parse(raw).unwrap();
        assert_eq!(s.cpu, 55.0);
        assert_eq!(s.incidents.len(), 1);
        assert_eq!(s.incidents[0].level, IncidentLevel::Warning);
        assert_eq!(s.processes.len(), 1);
        assert_eq!(s.processes[0].pid, 4);
        let history = s.history.unwrap();
        assert_eq!(history[0].timestamp, Timestamp::Epoch(1_700_000_000.5));
        assert!(s.system.is_none());
        assert!(s.updated_at.is_none());
    }

    #[test]
    fn null_lists_are_empty() {
        let raw = r#"{"cpu": 1.0, "memory": 2.0, "disk_percent": 3.0, "net_sent": 0, "net_recv": 0,
                      "processes": null, "incidents": null, "history": null}"#;
        let s = TelemetrySample::parse(raw).unwrap();
        assert!(s.processes.is_empty());
        assert!(s.incidents.is_empty());
        assert!(s.history.is_none());
    }

    #[test]
    fn fractional_epochs_accept_seconds_or_millis() {
        let secs = Timestamp::Epoch(1_700_000_000.5).to_local().unwrap();
        let millis = Timestamp::Epoch(1_700_000_000_500.0).to_local().unwrap();
        assert_eq!(secs, millis);
        assert_eq!(secs.timestamp_millis(), 1_700_000_000_500);
        assert!(Timestamp::Epoch(f64::NAN).to_local().is_none());
    }

    #[test]
    fn timestamp_labels() {
        let bad = Timestamp::Text("yesterday".into());
        assert_eq!(bad.label(), "yesterday");
        let ok = Timestamp::Text("2024-01-01T10:20:30+00:00".into());
        let label = ok.label();
        assert_eq!(label.len(), 8);
        assert_eq!(&label[2..3], ":");
    }
}
