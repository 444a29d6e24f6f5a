// src/runner.rs

use crate::api::{ApiClient, ApiResponse};
use crate::cli::{Cli, Command, StartArgs, StatusFormat, StormsFormat};
use crate::config::Settings;
use crate::format;
use crate::model::{Identity, StatusReport, StormCatalog};
use crate::validate::{precheck_start, resolve_start};

use anyhow::{bail, Context, Result};

/// What a subcommand wants printed to stdout, and whether it succeeded.
///
/// Local failures are returned as `Err` instead; only a non-success
/// response from the service produces `success = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    fn remote_failure(resp: &ApiResponse) -> Self {
        tracing::warn!(status = resp.status.as_u16(), "service rejected request");
        Self {
            text: format!("Error (HTTP {}): {}", resp.status.as_u16(), resp.message()),
            success: false,
        }
    }
}

/// Process exit status for any failed run, local or remote.
pub const FAILURE_STATUS: u8 = 255;

/// Map a finished run to the process exit status.
pub fn exit_status(result: &Result<CommandOutput>) -> u8 {
    match result {
        Ok(out) if out.success => 0,
        _ => FAILURE_STATUS,
    }
}

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<CommandOutput> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.override_url(cli.url.as_deref());

    let api = ApiClient::from_settings(&settings)?;

    match cli.command {
        Command::Storms { render } => storms(&api, render).await,
        Command::Start { args } => start(&api, &settings, &args).await,
        Command::Status { render, name } => status(&api, render, name.as_deref()).await,
        Command::NextAdv { name } => next_adv(&api, name.as_deref()).await,
        Command::Delete { name } => delete(&api, name.as_deref()).await,
        Command::Uuid => uuid(&api).await,
    }
}

/* ---------------- storms ---------------- */

/// Fetch the storm catalog; any non-success status aborts.
pub async fn lookup_storms(api: &ApiClient) -> Result<StormCatalog> {
    let resp = api.storms().await?;
    if !resp.is_success() {
        bail!(
            "Failed to fetch storms (HTTP {}): {}",
            resp.status.as_u16(),
            resp.message()
        );
    }

    let mut catalog: StormCatalog = resp.json().context("Failed to parse storm list")?;
    for (name, storm) in catalog.iter_mut() {
        if storm.name.is_empty() {
            storm.name = name.clone();
        }
    }

    Ok(catalog)
}

async fn storms(api: &ApiClient, render: Option<StormsFormat>) -> Result<CommandOutput> {
    let catalog = lookup_storms(api).await?;

    let text = match render {
        Some(StormsFormat::Json) => format::storms_json(&catalog)?,
        None => format::storms_text(&catalog),
    };

    Ok(CommandOutput::ok(text))
}

/* ---------------- start ---------------- */

async fn start(api: &ApiClient, settings: &Settings, args: &StartArgs) -> Result<CommandOutput> {
    precheck_start(args)?;

    let catalog = lookup_storms(api).await?;
    let request = resolve_start(args, settings, &catalog)?;

    tracing::info!(
        name = %request.name,
        startadv = request.startadv,
        endadv = request.endadv,
        frequency = request.frequency,
        "starting replay"
    );

    let resp = api.configure(&request).await?;
    if !resp.is_success() {
        return Ok(CommandOutput::remote_failure(&resp));
    }

    Ok(CommandOutput::ok(format!(
        "Started {} (adv {:02}-{:02} @ {:05} sec)",
        request.name, request.startadv, request.endadv, request.frequency
    )))
}

/* ---------------- status ---------------- */

async fn status(
    api: &ApiClient,
    render: Option<StatusFormat>,
    name: Option<&str>,
) -> Result<CommandOutput> {
    if render == Some(StatusFormat::Config) && name.is_none() {
        bail!("--name is required with --as config");
    }

    let resp = api.status().await?;
    if !resp.is_success() {
        return Ok(CommandOutput::remote_failure(&resp));
    }

    if render == Some(StatusFormat::Json) {
        return Ok(CommandOutput::ok(resp.body));
    }

    let report: StatusReport = resp.json().context("Failed to parse status report")?;

    let text = match (render, name) {
        (Some(StatusFormat::Config), Some(n)) => format::status_config(&report, n)?,
        _ => format::status_text(&report),
    };

    Ok(CommandOutput::ok(text))
}

/* ---------------- nextAdv / delete ---------------- */

fn require_name<'a>(name: Option<&'a str>, command: &str) -> Result<&'a str> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(n),
        _ => bail!("--name is required for {}", command),
    }
}

async fn next_adv(api: &ApiClient, name: Option<&str>) -> Result<CommandOutput> {
    let name = require_name(name, "nextAdv")?;

    let resp = api.next_adv(name).await?;
    if !resp.is_success() {
        return Ok(CommandOutput::remote_failure(&resp));
    }

    Ok(CommandOutput::ok(format!("Issued next advisory for {}", name)))
}

async fn delete(api: &ApiClient, name: Option<&str>) -> Result<CommandOutput> {
    let name = require_name(name, "delete")?;

    let resp = api.delete(name).await?;
    if !resp.is_success() {
        return Ok(CommandOutput::remote_failure(&resp));
    }

    Ok(CommandOutput::ok(format!("Deleted {}", name)))
}

/* ---------------- uuid ---------------- */

async fn uuid(api: &ApiClient) -> Result<CommandOutput> {
    let resp = api.uuid().await?;
    if !resp.is_success() {
        return Ok(CommandOutput::remote_failure(&resp));
    }

    let id: Identity = resp.json().context("Failed to parse identity")?;
    Ok(CommandOutput::ok(format::identity(&id)))
}
