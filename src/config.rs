// src/config.rs

use anyhow::{bail, Context, Result};
use ini::{Ini, ParseOption, Properties};
use std::path::{Path, PathBuf};

/// Base URL of the public replay service.
pub const DEFAULT_API_URL: &str = "https://stormreplay.com/api";

/// Seconds between advisories when neither the config file nor a flag says otherwise.
pub const DEFAULT_FREQUENCY: u64 = 21600;

const CONFIG_FILE_NAME: &str = "asgs-global.conf";
const SECTION: &str = "replayd";

/// Settings read from the `[replayd]` section of `asgs-global.conf`.
///
/// Example:
///
/// [replayd]
/// apikey = 00042
/// apisecret = ...
/// frequency = 3600
/// loop = yes
/// notify = no
/// email = ops@example.com
///
/// Loaded once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API key sent in the Authorization header.
    ///
    /// Empty when not configured; the server rejects the call in that case.
    pub apikey: String,

    /// Shared secret mixed into every request signature.
    pub apisecret: String,

    /// Service base URL, without a trailing slash.
    pub url: String,

    /// Default `start --frequency`.
    pub frequency: u64,

    /// Default `start --loop`.
    pub loop_replay: bool,

    /// Default `start --notify`.
    pub notify: bool,

    /// Default `start --email`.
    pub email: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            apikey: String::new(),
            apisecret: String::new(),
            url: DEFAULT_API_URL.to_string(),
            frequency: DEFAULT_FREQUENCY,
            loop_replay: false,
            notify: false,
            email: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `$HOME/asgs-global.conf` when no path is given.
    ///
    /// A missing file yields defaults. Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = Self::read_file(path)?;

        settings.apply_env(|key| std::env::var(key).ok());

        if settings.apikey.is_empty() || settings.apisecret.is_empty() {
            tracing::warn!("apikey/apisecret not configured; the server will reject signed calls");
        }

        Ok(settings)
    }

    /// Settings from the INI file alone, without environment overrides.
    pub fn read_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        match path {
            Some(p) if p.exists() => {
                tracing::debug!(path = %p.display(), "loading config");
                let ini = Ini::load_from_file_opt(&p, parse_option())
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                Self::from_ini(&ini)
                    .with_context(|| format!("Invalid [{}] section in {:?}", SECTION, p))
            }
            Some(p) => {
                tracing::debug!(path = %p.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from INI text.
    #[cfg(test)]
    pub fn from_ini_str(raw: &str) -> Result<Self> {
        let ini = Ini::load_from_str_opt(raw, parse_option()).context("Failed to parse INI config")?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self> {
        let mut settings = Self::default();

        let Some(section) = ini.section(Some(SECTION)) else {
            return Ok(settings);
        };

        if let Some(v) = value(section, "apikey") {
            settings.apikey = v.to_string();
        }
        if let Some(v) = value(section, "apisecret") {
            settings.apisecret = v.to_string();
        }
        if let Some(v) = value(section, "url") {
            settings.url = normalise_url(v);
        }
        if let Some(v) = value(section, "frequency") {
            settings.frequency = v
                .parse()
                .with_context(|| format!("frequency must be a whole number of seconds, got {:?}", v))?;
        }
        if let Some(v) = value(section, "loop") {
            settings.loop_replay = parse_bool("loop", v)?;
        }
        if let Some(v) = value(section, "notify") {
            settings.notify = parse_bool("notify", v)?;
        }
        if let Some(v) = value(section, "email") {
            settings.email = Some(v.to_string());
        }

        Ok(settings)
    }

    /// Apply `REPLAYD_*` overrides.
    ///
    /// `lookup` abstracts the process environment so tests stay hermetic.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("REPLAYD_APIKEY") {
            self.apikey = v;
        }
        if let Some(v) = lookup("REPLAYD_APISECRET") {
            self.apisecret = v;
        }
        if let Some(v) = lookup("REPLAYD_URL") {
            self.url = normalise_url(&v);
        }
    }

    /// Apply the global `--url` flag.
    pub fn override_url(&mut self, url: Option<&str>) {
        if let Some(u) = url {
            self.url = normalise_url(u);
        }
    }
}

/// Values are taken verbatim: secrets may contain backslashes and quotes.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Non-empty, trimmed value for `key`.
fn value<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn normalise_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{} must be a boolean (yes/no, true/false, 1/0), got {:?}", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_replayd_section() {
        let raw = r#"
[other]
apikey = wrong

[replayd]
apikey = 00042
apisecret = s3cret
frequency = 3600
loop = yes
notify = 1
email = ops@example.com
"#;
        let s = Settings::from_ini_str(raw).unwrap();

        assert_eq!(s.apikey, "00042");
        assert_eq!(s.apisecret, "s3cret");
        assert_eq!(s.frequency, 3600);
        assert!(s.loop_replay);
        assert!(s.notify);
        assert_eq!(s.email.as_deref(), Some("ops@example.com"));
        assert_eq!(s.url, DEFAULT_API_URL);
    }

    #[test]
    fn missing_section_yields_defaults() {
        let s = Settings::from_ini_str("[asgs]\nfoo = bar\n").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.frequency, DEFAULT_FREQUENCY);
    }

    #[test]
    fn rejects_bad_boolean() {
        let err = Settings::from_ini_str("[replayd]\nloop = sometimes\n").unwrap_err();
        assert!(format!("{:#}", err).contains("loop must be a boolean"));
    }

    #[test]
    fn rejects_bad_frequency() {
        assert!(Settings::from_ini_str("[replayd]\nfrequency = hourly\n").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut s = Settings::from_ini_str("[replayd]\napikey = file\nurl = http://a/api/\n").unwrap();
        assert_eq!(s.url, "http://a/api");

        let env: HashMap<&str, &str> = [("REPLAYD_APIKEY", "env"), ("REPLAYD_URL", "http://b/")]
            .into_iter()
            .collect();
        s.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(s.apikey, "env");
        assert_eq!(s.url, "http://b");

        s.override_url(Some("http://c/api/"));
        assert_eq!(s.url, "http://c/api");
    }

    #[test]
    fn secrets_are_taken_verbatim() {
        let raw = "[replayd]\napikey = \"quoted\"\napisecret = ab\\tcd\\\\ef\n";
        let s = Settings::from_ini_str(raw).unwrap();

        assert_eq!(s.apikey, "\"quoted\"");
        assert_eq!(s.apisecret, r"ab\tcd\\ef");
    }

    #[test]
    fn read_file_parses_disk_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asgs-global.conf");
        std::fs::write(&path, "[replayd]\napisecret = from\\disk\nfrequency = 900\n").unwrap();

        let s = Settings::read_file(Some(&path)).unwrap();
        assert_eq!(s.apisecret, r"from\disk");
        assert_eq!(s.frequency, 900);
    }

    #[test]
    fn load_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::read_file(Some(&dir.path().join("nope.conf"))).unwrap();
        assert_eq!(s, Settings::default());
    }
}
