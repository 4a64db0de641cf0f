use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wallet_report::{BalanceAggregator, Config, ErrorBody, ReportError, WalletReport};

#[derive(Parser, Debug)]
#[command(name = "wallet-report")]
#[command(about = "Report native and ERC-20 token balances of an Ethereum address", long_about = None)]
struct Args {
    /// The account address to query (0x followed by 40 hex digits)
    #[arg(short, long)]
    address: String,

    /// Config file to use instead of the built-in one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides config and ETHEREUM_RPC_URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Extra token contract to include; metadata is read from the chain
    #[arg(short, long = "token", value_name = "CONTRACT")]
    tokens: Vec<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wallet_report=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = args.rpc_url.clone() {
        config.rpc_url = Some(url);
    }

    let mut aggregator = BalanceAggregator::from_config(&config)?;

    if !args.tokens.is_empty() {
        let mut extra = Vec::with_capacity(args.tokens.len());
        for token in &args.tokens {
            let contract = wallet_report::validate_address(token)
                .with_context(|| format!("--token {}", token))?;
            match aggregator.describe_token(contract).await {
                Ok(descriptor) => extra.push(descriptor),
                Err(e) => exit_with(&e, args.json),
            }
        }
        let catalog = aggregator.catalog().extended(extra)?;
        aggregator = aggregator.with_catalog(Arc::new(catalog));
    }

    match aggregator.fetch_report(&args.address).await {
        Ok(report) if args.json => println!("{}", serde_json::to_string_pretty(&report)?),
        Ok(report) => print_table(&report, &config.native_symbol),
        Err(e) => exit_with(&e, args.json),
    }

    Ok(())
}

fn print_table(report: &WalletReport, native_symbol: &str) {
    println!("Address: {}", report.address);
    println!("{}", "=".repeat(60));
    println!("{:6} | {:>20}", native_symbol, report.eth_balance);

    if report.token_balances.is_empty() {
        println!("No token balances");
    }
    for token in &report.token_balances {
        println!("{:6} | {:>20} ({})", token.symbol, token.balance, token.name);
    }

    println!("{}", "=".repeat(60));
}

fn exit_with(err: &ReportError, json: bool) -> ! {
    let body = ErrorBody::from(err);
    if json {
        match serde_json::to_string_pretty(&body) {
            Ok(out) => println!("{}", out),
            Err(_) => eprintln!("Error: {}", body.message),
        }
    } else {
        eprintln!("Error: {}", body.message);
    }

    std::process::exit(if body.kind.is_client_error() { 2 } else { 1 })
}
