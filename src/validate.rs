// src/validate.rs

//! Resolution of `start` flags into a `StartRequest`.

use anyhow::{bail, Result};

use crate::cli::StartArgs;
use crate::config::Settings;
use crate::model::{StartRequest, StormCatalog};

/// Checks that need no server data.
///
/// Clamping can only raise `startadv` and lower `endadv`, so an inverted
/// pair supplied on the command line can never become valid.
pub fn precheck_start(args: &StartArgs) -> Result<&str> {
    let name = match args.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => bail!("(unspecified) is not a supported storm!"),
    };

    if let (Some(start), Some(end)) = (args.startadv, args.endadv) {
        if start > end {
            bail!("startadv ({}) must not be greater than endadv ({})", start, end);
        }
    }

    Ok(name)
}

/// Merge flags over config defaults and clamp advisories to the storm's range.
pub fn resolve_start(
    args: &StartArgs,
    settings: &Settings,
    catalog: &StormCatalog,
) -> Result<StartRequest> {
    let name = precheck_start(args)?;

    let Some(storm) = catalog.get(name) else {
        bail!("{} is not a supported storm!", name);
    };

    let startadv = match args.startadv {
        Some(a) if a >= storm.minstartadv => a,
        requested => {
            tracing::debug!(?requested, min = storm.minstartadv, "clamping startadv");
            storm.minstartadv
        }
    };

    let endadv = match args.endadv {
        Some(a) if a <= storm.maxendadv => a,
        requested => {
            tracing::debug!(?requested, max = storm.maxendadv, "clamping endadv");
            storm.maxendadv
        }
    };

    if startadv > endadv {
        bail!(
            "startadv ({}) must not be greater than endadv ({}) for {}",
            startadv,
            endadv,
            name
        );
    }

    Ok(StartRequest {
        name: name.to_string(),
        frequency: args.frequency.unwrap_or(settings.frequency),
        startadv,
        endadv,
        loop_replay: args.loop_replay || settings.loop_replay,
        notify: args.notify || settings.notify,
        email: args.email.clone().or_else(|| settings.email.clone()),
    })
}
