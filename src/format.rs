// src/format.rs

//! Rendering of service responses.
//!
//! Every function here is pure: it takes decoded records and returns the
//! exact text to print, so output formats are covered by unit tests.

use anyhow::{bail, Context, Result};

use crate::model::{Identity, StatusReport, StormCatalog, StormStatusRecord};

/// `"No storms found!"` or `"<NN> storm(s) found!"`.
///
/// Counts are always two digits, so a single storm reads `01 storm found!`,
/// never `1 storm found!`. Only a count of exactly one is singular.
pub fn count_header(count: usize) -> String {
    match count {
        0 => "No storms found!".to_string(),
        1 => format!("{:02} storm found!", count),
        n => format!("{:02} storms found!", n),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/* ---------------- storms ---------------- */

pub fn storms_json(catalog: &StormCatalog) -> Result<String> {
    serde_json::to_string(catalog).context("Failed to format storms as JSON")
}

pub fn storms_text(catalog: &StormCatalog) -> String {
    let mut out = count_header(catalog.len());
    for (name, storm) in catalog {
        out.push_str(&format!(
            "\n- {} ({}); (adv: {}-{})",
            name, storm.year, storm.minstartadv, storm.maxendadv
        ));
    }
    out
}

/* ---------------- status ---------------- */

pub fn status_line(name: &str, record: &StormStatusRecord) -> String {
    let config = &record.config;
    let notify = match (config.notify, config.email.as_deref()) {
        (true, Some(email)) if !email.is_empty() => email,
        (flag, _) => yes_no(flag),
    };

    format!(
        "- {} ({}, adv {:02} @ {:05} sec, loop: {}, notify: {})",
        name,
        record.status.state,
        record.status.adv,
        config.frequency,
        yes_no(config.loop_replay),
        notify
    )
}

pub fn status_text(report: &StatusReport) -> String {
    let mut out = count_header(report.len());
    for (name, record) in report {
        out.push('\n');
        out.push_str(&status_line(name, record));
    }
    out
}

/// Shell configuration block pointing a forecast system at one replay's feeds.
pub fn status_config(report: &StatusReport, name: &str) -> Result<String> {
    let Some(record) = report.get(name) else {
        bail!("Storm \"{}\" doesn't exist in status results!", name);
    };

    let config = &record.config;
    let status = &record.status;

    let coldstart = status
        .coldstartdate
        .as_deref()
        .with_context(|| format!("Status for {} is missing coldstartdate", name))?;
    let hindcast = status
        .hindcastlength
        .with_context(|| format!("Status for {} is missing hindcastlength", name))?;
    let hash = status
        .hash
        .as_deref()
        .with_context(|| format!("Status for {} is missing hash", name))?;
    let ftp = status
        .ftp
        .as_ref()
        .with_context(|| format!("Status for {} is missing ftp", name))?;
    let rss = status
        .rss
        .as_ref()
        .with_context(|| format!("Status for {} is missing rss", name))?;

    let feed_dir = format!("{}/{}", ftp.dir.trim_end_matches('/'), hash);

    Ok(format!(
        "# replayd configuration for {name}\n\
         COLDSTARTDATE={coldstart}\n\
         HINDCASTLENGTH={hindcast:.1}\n\
         STORM={storm:02}\n\
         YEAR={year}\n\
         STARTADV={startadv}\n\
         ENDADV={endadv}\n\
         TRIGGER=rssembedded\n\
         FTPSITE={ftp_host}\n\
         FDIR={feed_dir}\n\
         HDIR={feed_dir}\n\
         RSSSITE={rss_host}:{rss_port}/rss/{hash}",
        name = name,
        coldstart = coldstart,
        hindcast = hindcast,
        storm = config.stormnumber,
        year = config.year,
        startadv = config.startadv,
        endadv = config.endadv,
        ftp_host = ftp.host,
        feed_dir = feed_dir,
        rss_host = rss.host,
        rss_port = rss.port,
        hash = hash,
    ))
}

/* ---------------- uuid ---------------- */

pub fn identity(id: &Identity) -> String {
    format!("uuid: {:05} (md5: {})", id.uuid, id.md5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FtpSite, ReplayConfig, ReplayState, RssSite, StormDescriptor};

    fn record(state: &str, notify: bool, email: Option<&str>) -> StormStatusRecord {
        StormStatusRecord {
            config: ReplayConfig {
                name: "irma".into(),
                frequency: 3600,
                startadv: 5,
                endadv: 40,
                loop_replay: true,
                notify,
                email: email.map(str::to_string),
                year: 2017,
                stormnumber: 11,
            },
            status: ReplayState {
                state: state.into(),
                adv: 7,
                coldstartdate: Some("2017082100".into()),
                hindcastlength: Some(20.0),
                hash: Some("d41d8cd9".into()),
                ftp: Some(FtpSite {
                    host: "ftp.stormreplay.com".into(),
                    dir: "/replay/".into(),
                }),
                rss: Some(RssSite {
                    host: "stormreplay.com".into(),
                    port: 8080,
                }),
            },
        }
    }

    #[test]
    fn count_header_pluralises() {
        assert_eq!(count_header(0), "No storms found!");
        assert_eq!(count_header(1), "01 storm found!");
        assert_eq!(count_header(2), "02 storms found!");
        assert_eq!(count_header(12), "12 storms found!");
    }

    #[test]
    fn single_count_is_padded_and_singular() {
        let header = count_header(1);
        assert_eq!(header, "01 storm found!");
        assert_ne!(header, "1 storm found!");
        assert!(!header.contains("storms"));
    }

    #[test]
    fn storms_text_lists_ranges() {
        let mut catalog = StormCatalog::new();
        catalog.insert(
            "irma".into(),
            StormDescriptor {
                name: "irma".into(),
                year: 2017,
                minstartadv: 1,
                maxendadv: 52,
            },
        );

        assert_eq!(
            storms_text(&catalog),
            "01 storm found!\n- irma (2017); (adv: 1-52)"
        );
        assert_eq!(storms_text(&StormCatalog::new()), "No storms found!");
    }

    #[test]
    fn status_line_formats_fields() {
        assert_eq!(
            status_line("irma", &record("running", false, None)),
            "- irma (running, adv 07 @ 03600 sec, loop: yes, notify: no)"
        );
        assert_eq!(
            status_line("irma", &record("stopped", true, None)),
            "- irma (stopped, adv 07 @ 03600 sec, loop: yes, notify: yes)"
        );
        assert_eq!(
            status_line("irma", &record("running", true, Some("ops@example.com"))),
            "- irma (running, adv 07 @ 03600 sec, loop: yes, notify: ops@example.com)"
        );
    }

    #[test]
    fn status_text_has_header_and_lines() {
        let mut report = StatusReport::new();
        report.insert("irma".into(), record("running", false, None));
        report.insert("maria".into(), record("stopped", false, None));

        let text = status_text(&report);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "02 storms found!");
        assert!(lines[1].starts_with("- irma (running"));
        assert!(lines[2].starts_with("- maria (stopped"));
    }

    #[test]
    fn status_config_emits_shell_block() {
        let mut report = StatusReport::new();
        report.insert("irma".into(), record("running", false, None));

        let block = status_config(&report, "irma").unwrap();
        assert_eq!(
            block,
            "# replayd configuration for irma\n\
             COLDSTARTDATE=2017082100\n\
             HINDCASTLENGTH=20.0\n\
             STORM=11\n\
             YEAR=2017\n\
             STARTADV=5\n\
             ENDADV=40\n\
             TRIGGER=rssembedded\n\
             FTPSITE=ftp.stormreplay.com\n\
             FDIR=/replay/d41d8cd9\n\
             HDIR=/replay/d41d8cd9\n\
             RSSSITE=stormreplay.com:8080/rss/d41d8cd9"
        );
    }

    #[test]
    fn status_config_pads_storm_number() {
        let mut rec = record("running", false, None);
        rec.config.stormnumber = 3;
        rec.status.hindcastlength = Some(12.26);
        let mut report = StatusReport::new();
        report.insert("irma".into(), rec);

        let block = status_config(&report, "irma").unwrap();
        assert!(block.contains("\nSTORM=03\n"));
        assert!(block.contains("\nHINDCASTLENGTH=12.3\n"));
    }

    #[test]
    fn status_config_rejects_unknown_storm() {
        let err = status_config(&StatusReport::new(), "andrew").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Storm \"andrew\" doesn't exist in status results!"
        );
    }

    #[test]
    fn status_config_requires_feed_details() {
        let mut rec = record("running", false, None);
        rec.status.rss = None;
        let mut report = StatusReport::new();
        report.insert("irma".into(), rec);

        let err = status_config(&report, "irma").unwrap_err();
        assert!(err.to_string().contains("missing rss"));
    }

    #[test]
    fn identity_pads_uuid() {
        let id = Identity {
            uuid: 42,
            md5: "abc".into(),
        };
        assert_eq!(identity(&id), "uuid: 00042 (md5: abc)");
    }
}
