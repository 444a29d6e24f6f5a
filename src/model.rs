// src/model.rs

//! Wire records exchanged with the replay service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A storm the service can replay, as returned by `GET /storms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StormDescriptor {
    #[serde(default)]
    pub name: String,
    pub year: i32,

    /// First advisory available for replay.
    pub minstartadv: u32,

    /// Last advisory available for replay.
    pub maxendadv: u32,
}

/// `GET /storms`, keyed by storm name.
pub type StormCatalog = BTreeMap<String, StormDescriptor>;

/// `GET /status`, keyed by storm name.
pub type StatusReport = BTreeMap<String, StormStatusRecord>;

/// One running (or stopped) replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormStatusRecord {
    pub config: ReplayConfig,
    pub status: ReplayState,
}

/// The options a replay was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub name: String,
    pub frequency: u64,
    pub startadv: u32,
    pub endadv: u32,
    #[serde(rename = "loop", default)]
    pub loop_replay: bool,
    #[serde(default)]
    pub notify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub stormnumber: u32,
}

/// Live progress of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayState {
    /// e.g. `running`, `stopped`
    pub state: String,

    /// Current advisory number.
    pub adv: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coldstartdate: Option<String>,

    /// Hindcast length in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hindcastlength: Option<f64>,

    /// Content hash naming this replay's feed directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ftp: Option<FtpSite>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss: Option<RssSite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtpSite {
    pub host: String,
    pub dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssSite {
    pub host: String,
    pub port: u16,
}

/// Body of `POST /configure`.
///
/// Built fresh per invocation from flags and config defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub name: String,
    pub frequency: u64,
    pub startadv: u32,
    pub endadv: u32,
    #[serde(rename = "loop")]
    pub loop_replay: bool,
    pub notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// `GET /uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub uuid: u64,
    pub md5: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_request_uses_wire_names() {
        let req = StartRequest {
            name: "irma".into(),
            frequency: 21600,
            startadv: 1,
            endadv: 40,
            loop_replay: true,
            notify: false,
            email: None,
        };

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "name": "irma",
                "frequency": 21600,
                "startadv": 1,
                "endadv": 40,
                "loop": true,
                "notify": false,
            })
        );
    }

    #[test]
    fn status_record_tolerates_missing_optional_fields() {
        let raw = json!({
            "irma": {
                "config": { "frequency": 60, "startadv": 1, "endadv": 9, "loop": false },
                "status": { "state": "running", "adv": 3 }
            }
        });

        let report: StatusReport = serde_json::from_value(raw).unwrap();
        let irma = &report["irma"];
        assert_eq!(irma.status.state, "running");
        assert!(!irma.config.notify);
        assert!(irma.status.hash.is_none());
    }
}
