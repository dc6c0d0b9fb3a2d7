use std::time::Instant;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::cloudflare::EmailRouting;
use crate::output::types::Meta;
use crate::telemetry::{self};
use crate::telemetry::ops::rules::Phase as RulesPhase;
use crate::util::validate;

pub mod types;

/// vuzon rules ls/add/rm/enable/disable
#[derive(Args)]
pub struct RulesCmd {
    #[command(subcommand)]
    pub cmd: RulesSub,
}

#[derive(Subcommand)]
pub enum RulesSub {
    /// List every routing rule of the zone
    Ls {
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Forward <local_part>@DOMAIN to <dest_email> (plan-only by default; use --apply to write)
    Add {
        local_part: String,
        dest_email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    /// Delete a rule
    Rm {
        id: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    /// Enable a rule
    Enable {
        id: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    /// Disable a rule
    Disable {
        id: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

pub async fn run(api: &EmailRouting, args: RulesCmd) -> Result<()> {
    let log = telemetry::rules();
    let _g = log.root_span().entered();
    match args.cmd {
        RulesSub::Ls { per_page } => ls_rules(api, per_page).await?,
        RulesSub::Add { local_part, dest_email, name, apply } => {
            add_rule(api, &local_part, &dest_email, name.as_deref(), apply).await?;
        }
        RulesSub::Rm { id, apply } => {
            rm_rule(api, id, apply).await?;
        }
        RulesSub::Enable { id, apply } => {
            toggle_rule(api, id, true, apply).await?;
        }
        RulesSub::Disable { id, apply } => {
            toggle_rule(api, id, false, apply).await?;
        }
    }
    Ok(())
}

async fn ls_rules(api: &EmailRouting, per_page: Option<u32>) -> Result<()> {
    let log = telemetry::rules();
    let _g = log.root_span_kv([("per_page", format!("{:?}", per_page))]).entered();
    let _s = log.span(&RulesPhase::List).entered();
    let t0 = Instant::now();

    let collection = api.list_rules(per_page).await?;
    // one line per rule, then totals
    for rule in &collection.items {
        log.rule_line(rule);
    }
    let enabled = collection
        .items
        .iter()
        .filter(|r| r.get("enabled").and_then(Value::as_bool).unwrap_or(false))
        .count();
    log.totals(collection.items.len(), enabled);

    // Emit structured result when in JSON mode (stdout)
    if telemetry::config::json_mode() {
        let meta = Meta::since(t0).with_count(collection.items.len());
        telemetry::emit::print_result("rules", &collection, Some(meta))?;
    }
    Ok(())
}

async fn add_rule(
    api: &EmailRouting,
    local_part: &str,
    dest_email: &str,
    name: Option<&str>,
    apply: bool,
) -> Result<Option<Value>> {
    let log = telemetry::rules();
    // validate before any upstream I/O
    let local_part = validate::local_part(local_part)?;
    let destination = validate::email(dest_email)?;
    let alias = format!("{}@{}", local_part, api.config().domain());
    let body = types::forward_rule_body(&alias, &destination, name);

    let _g = log.root_span_kv([
        ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
        ("alias", alias.clone()),
        ("destination", destination.clone()),
    ]).entered();

    if !apply {
        let _s = log.span(&RulesPhase::Plan).entered();
        // Always log plan summary
        log.info(format!("📝 Rule plan — add {} -> {}", alias, destination));
        log.info("   Use --apply to execute.");
        // Emit structured plan when in JSON mode (stdout)
        if telemetry::config::json_mode() {
            let plan = types::RuleCreatePlan { action: "add", alias, destination, body };
            log.plan(&plan)?;
        }
        return Ok(None);
    }

    let _s = log.span(&RulesPhase::Create).entered();
    let response = api.create_rule(body).await?;
    log.info(format!("➕ Rule created: {} -> {}", alias, destination));
    if telemetry::config::json_mode() {
        log.result(&response)?;
    }
    Ok(Some(response))
}

async fn rm_rule(api: &EmailRouting, id: String, apply: bool) -> Result<Option<Value>> {
    let log = telemetry::rules();
    let _g = log.root_span_kv([("id", id.clone()), ("apply", apply.to_string())]).entered();

    if !apply {
        let _s = log.span(&RulesPhase::Plan).entered();
        log.info(format!("📝 Rule plan — delete {}", id));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&types::RuleChangePlan { action: "delete", id })?;
        }
        return Ok(None);
    }

    let _s = log.span(&RulesPhase::Delete).entered();
    let response = api.delete_rule(&id).await?;
    log.info(format!("🗑️ Rule deleted: {}", id));
    if telemetry::config::json_mode() {
        log.result(&response)?;
    }
    Ok(Some(response))
}

async fn toggle_rule(api: &EmailRouting, id: String, enabled: bool, apply: bool) -> Result<Option<Value>> {
    let log = telemetry::rules();
    let action = if enabled { "enable" } else { "disable" };
    let _g = log.root_span_kv([("id", id.clone()), ("action", action.to_string()), ("apply", apply.to_string())]).entered();

    if !apply {
        let _s = log.span(&RulesPhase::Plan).entered();
        log.info(format!("📝 Rule plan — {} {}", action, id));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&types::RuleChangePlan { action, id })?;
        }
        return Ok(None);
    }

    // Apply: read-modify-write through the reconciler
    let _s = log.span(&RulesPhase::Toggle).entered();
    let response = match api.set_rule_enabled(&id, enabled).await {
        Ok(response) => response,
        Err(err) => {
            // surface status and retryability before bailing
            log.error_kv("rule update failed", [
                ("id", id.clone()),
                ("status", err.status().map(|s| s.as_u16().to_string()).unwrap_or_default()),
                ("retryable", err.is_retryable().to_string()),
            ]);
            return Err(err.into());
        }
    };
    log.info(format!("{} Rule {}d: {}", if enabled { "▶️" } else { "⏸️" }, action, id));
    if telemetry::config::json_mode() {
        log.result(&response)?;
    }
    Ok(Some(response))
}
