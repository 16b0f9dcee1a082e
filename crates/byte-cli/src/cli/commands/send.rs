//! Send command handler.

use anyhow::{Context, Result, bail};
use byte_core::config::Config;
use byte_core::dashboard::DispatchOutcome;
use byte_core::item::BucketKind;

use super::Session;

pub async fn run(config: &Config, selections: &[String], dry_run: bool) -> Result<()> {
    let wanted = selections
        .iter()
        .map(|raw| parse_selection(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut session = Session::from_config(config)?;
    session.load().await;
    tracing::debug!(selections = wanted.len(), "applying selections");

    let dashboard = &mut session.dashboard;
    for (kind, token) in &wanted {
        let Some(id) = dashboard.store().bucket(*kind).resolve(token).cloned() else {
            bail!("No {} item with id {token} is loaded", kind.label());
        };
        if !dashboard.selection().is_selected(*kind, &id) {
            dashboard.toggle(*kind, &id);
        }
    }

    if dry_run {
        let payload = dashboard.payload();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("serialize digest payload")?
        );
        return Ok(());
    }

    let outcome = dashboard.dispatch(&session.composer).await;
    let text = dashboard
        .notifications()
        .current()
        .map(|notification| notification.text)
        .unwrap_or_default();
    match outcome {
        DispatchOutcome::Sent { items } => {
            println!("{text} ({items} items)");
            Ok(())
        }
        DispatchOutcome::Busy => bail!("A digest is already being sent"),
        DispatchOutcome::Empty | DispatchOutcome::Failed(_) => bail!("{text}"),
    }
}

/// Splits `KIND:ID` into the bucket and the raw id token.
///
/// The token is resolved against the loaded bucket later: `posts:12`,
/// `posts:42` for a text id, or `external-events:#0` by position.
fn parse_selection(raw: &str) -> Result<(BucketKind, String)> {
    let Some((kind, token)) = raw.split_once(':') else {
        bail!("Invalid selection '{raw}' (expected KIND:ID)");
    };
    let kind: BucketKind = kind.parse()?;
    let token = token.trim();
    if token.is_empty() {
        bail!("Invalid selection '{raw}' (missing id)");
    }
    Ok((kind, token.to_string()))
}
