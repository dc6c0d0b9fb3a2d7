use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod addresses;
mod cloudflare;
mod output;
mod routing;
mod rules;
mod telemetry;
mod util;

use cloudflare::{CloudflareConfig, EmailRouting};

#[derive(Parser)]
#[command(name = "vuzon", about = "Email routing admin console")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Rules(rules::RulesCmd),
    Addresses(addresses::AddressesCmd),
    Routing(routing::RoutingCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and VUZON_LOG_FORMAT
    telemetry::config::init_tracing();

    // refuse to start without credentials and ids
    let api = EmailRouting::from_config(CloudflareConfig::from_env())?;

    match cli.command {
        Commands::Rules(args) => rules::run(&api, args).await?,
        Commands::Addresses(args) => addresses::run(&api, args).await?,
        Commands::Routing(args) => routing::run(&api, args).await?,
    }

    Ok(())
}
