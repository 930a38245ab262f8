//! Generate command handler.

use super::params::build_request;
use sahayak::{Catalog, FlowKind, SahayakConfig};
use std::path::Path;
use tracing::{info, warn};

/// Runs one flow and prints its output.
#[tracing::instrument(skip_all, fields(flow = %flow))]
pub async fn handle_generate_command(
    config: &SahayakConfig,
    flow: &str,
    params: &[String],
    input: Option<&Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let kind: FlowKind = flow
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown flow '{}'; run `sahayak flows` to list them", flow))?;

    let catalog = Catalog::new()?;
    let request = build_request(catalog.spec(kind).schema(), input, params)?;
    let runner = config.runner()?;

    let outcome = catalog.run(&runner, kind, &request).await?;
    match outcome.fallback() {
        Some(event) => warn!(
            request_id = %outcome.request_id(),
            variants = %event.variants.join(","),
            "Output contains placeholder content"
        ),
        None => info!(request_id = %outcome.request_id(), "Generation complete"),
    }

    let rendered = if compact {
        serde_json::to_string(outcome.value())?
    } else {
        serde_json::to_string_pretty(outcome.value())?
    };
    println!("{}", rendered);
    Ok(())
}
