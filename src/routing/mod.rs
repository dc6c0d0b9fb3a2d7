use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::cloudflare::EmailRouting;
use crate::telemetry::{self};
use crate::telemetry::ops::routing::Phase as RoutingPhase;

/// vuzon routing enable
#[derive(Args)]
pub struct RoutingCmd {
    #[command(subcommand)]
    pub cmd: RoutingSub,
}

#[derive(Subcommand)]
pub enum RoutingSub {
    /// Turn on email routing for the zone (adds the MX/SPF records upstream)
    Enable {
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

#[derive(Serialize)]
struct EnablePlan {
    action: &'static str,
    zone_id: String,
}

pub async fn run(api: &EmailRouting, args: RoutingCmd) -> Result<()> {
    match args.cmd {
        RoutingSub::Enable { apply } => {
            enable_routing(api, apply).await?;
        }
    }
    Ok(())
}

async fn enable_routing(api: &EmailRouting, apply: bool) -> Result<Option<Value>> {
    let log = telemetry::routing();
    let zone_id = api.config().zone_id().to_string();
    let _g = log.root_span_kv([("zone_id", zone_id.clone()), ("apply", apply.to_string())]).entered();

    if !apply {
        let _s = log.span(&RoutingPhase::Plan).entered();
        // Always log plan summary
        log.info(format!("📝 Routing plan — enable DNS for zone {}", zone_id));
        log.info("   Use --apply to execute.");
        // Emit structured plan when in JSON mode (stdout)
        if telemetry::config::json_mode() {
            log.plan(&EnablePlan { action: "enable_dns", zone_id })?;
        }
        return Ok(None);
    }

    let _s = log.span(&RoutingPhase::EnableDns).entered();
    let response = api.enable_dns().await?;
    log.info("📨 Email routing enabled");
    // Emit structured result when in JSON mode (stdout)
    if telemetry::config::json_mode() {
        log.result(&response)?;
    }
    Ok(Some(response))
}
