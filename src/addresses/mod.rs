use std::time::Instant;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::cloudflare::EmailRouting;
use crate::output::types::Meta;
use crate::telemetry::{self};
use crate::telemetry::ops::addresses::Phase as AddressesPhase;
use crate::util::validate;

pub mod types;

/// vuzon addresses ls/add/rm
#[derive(Args)]
pub struct AddressesCmd {
    #[command(subcommand)]
    pub cmd: AddressesSub,
}

#[derive(Subcommand)]
pub enum AddressesSub {
    /// List destination addresses of the account
    Ls {
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Register a destination address; upstream sends it a verification mail
    Add {
        email: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    /// Remove a destination address
    Rm {
        id: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

pub async fn run(api: &EmailRouting, args: AddressesCmd) -> Result<()> {
    let log = telemetry::addresses();
    let _g = log.root_span().entered();
    match args.cmd {
        AddressesSub::Ls { per_page } => ls_addresses(api, per_page).await?,
        AddressesSub::Add { email, apply } => {
            add_address(api, &email, apply).await?;
        }
        AddressesSub::Rm { id, apply } => {
            rm_address(api, id, apply).await?;
        }
    }
    Ok(())
}

async fn ls_addresses(api: &EmailRouting, per_page: Option<u32>) -> Result<()> {
    let log = telemetry::addresses();
    let _g = log.root_span_kv([("per_page", format!("{:?}", per_page))]).entered();
    let _s = log.span(&AddressesPhase::List).entered();
    let t0 = Instant::now();

    let collection = api.list_addresses(per_page).await?;
    log.info(format!("📬 Destination addresses: {}", collection.items.len()));
    for address in &collection.items {
        log.address_line(address);
    }
    // Emit structured result when in JSON mode (stdout)
    if telemetry::config::json_mode() {
        let meta = Meta::since(t0).with_count(collection.items.len());
        telemetry::emit::print_result("addresses", &collection, Some(meta))?;
    }
    Ok(())
}

async fn add_address(api: &EmailRouting, email: &str, apply: bool) -> Result<Option<Value>> {
    let log = telemetry::addresses();
    // reject malformed addresses before any upstream I/O
    let email = validate::email(email)?;
    let _g = log.root_span_kv([("email", email.clone()), ("apply", apply.to_string())]).entered();

    if !apply {
        let _s = log.span(&AddressesPhase::Plan).entered();
        // Always log plan summary
        log.info(format!("📝 Address plan — add {}", email));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&types::AddressCreatePlan { action: "add", email })?;
        }
        return Ok(None);
    }

    let _s = log.span(&AddressesPhase::Create).entered();
    // upstream sends the verification mail
    let response = api.create_address(&email).await?;
    log.info(format!("➕ Address added: {} (check the inbox to verify)", email));
    if telemetry::config::json_mode() {
        log.result(&response)?;
    }
    Ok(Some(response))
}

async fn rm_address(api: &EmailRouting, id: String, apply: bool) -> Result<Option<Value>> {
    let log = telemetry::addresses();
    let _g = log.root_span_kv([("id", id.clone()), ("apply", apply.to_string())]).entered();

    if !apply {
        let _s = log.span(&AddressesPhase::Plan).entered();
        log.info(format!("📝 Address plan — delete {}", id));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&types::AddressDeletePlan { action: "delete", id })?;
        }
        return Ok(None);
    }

    let _s = log.span(&AddressesPhase::Delete).entered();
    let response = api.delete_address(&id).await?;
    log.info(format!("🗑️ Address deleted: {}", id));
    if telemetry::config::json_mode() {
        log.result(&response)?;
    }
    Ok(Some(response))
}
