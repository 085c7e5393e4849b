use bourse_exchange::{Exchange, ExchangeConfig};
use bourse_ports::Ledger;
use log::info;

fn print_help() {
    eprintln!(
        r#"Bourse - single-instrument spot exchange

USAGE:
    bourse [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run with defaults (BTC/BRL, empty book)
    bourse

    # Run with accounts and seed orders from a file
    bourse --config config.json
"#
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            ExchangeConfig::from_file(&path)?
        }
        None => {
            info!("Using default configuration");
            ExchangeConfig::default()
        }
    };
    info!("Exchange: {}", config.name);
    info!("Instrument: {}", config.instrument);
    info!("Accounts: {}", config.accounts.len());
    info!("Seed orders: {}", config.seed_orders.len());

    let exchange = Exchange::from_config(&config)?;

    for account in exchange.ledger().accounts() {
        let balances = exchange.balances(account.clone())?;
        info!("{}: {:?}", account, balances);
    }
    if let Some(price) = exchange.last_price() {
        info!("Last price: {}", price);
    }

    println!("{}", serde_json::to_string_pretty(&exchange.snapshot(None))?);
    Ok(())
}
