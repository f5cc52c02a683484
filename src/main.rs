use std::path::Path;

use crate::holding::Holding;
use crate::portfolio::Portfolio;
use crate::spot::{
    resolve_spot_prices, GoldApi, SnapshotDb, SpotCache, SpotFile, SpotQuote,
};
use crate::wallet::Wallet;

use clap::{arg, Command};
use colored::Colorize;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod error;
mod holding;
mod portfolio;
mod position;
mod spot;
mod wallet;

#[derive(Serialize, Deserialize)]
struct Config {
    wallet_file: String,
    spot_file: String,
    snapshot_db: String,
    api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_file: "wallet.json".to_string(),
            spot_file: "spot_prices.json".to_string(),
            snapshot_db: "spot_snapshot".to_string(),
            api_key: String::new(),
        }
    }
}

fn cli() -> Command {
    Command::new("bullion_rs")
        .about("A simple precious-metal wallet tool")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("holdings")
                .about("List the raw wallet entries with their positions")
                .arg(
                    arg!(<FILE> "JSON file with your wallet")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("balances")
                .about("Show the current value of your wallet")
                .arg(
                    arg!(<FILE> "JSON file with your wallet")
                        .required(false)
                        .default_value(""),
                )
                .arg(arg!(--metal <METAL> "Only show one metal").required(false)),
        )
        .subcommand(
            Command::new("allocation")
                .about("Show the current allocation of your wallet")
                .arg(
                    arg!(<FILE> "JSON file with your wallet")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Record a new purchase in the wallet")
                .arg(arg!(<METAL> "Metal identifier (gold, silver, copper)"))
                .arg(
                    arg!(<WEIGHT> "Weight per unit in troy ounces")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(arg!(<QUANTITY> "Number of units").value_parser(clap::value_parser!(u32)))
                .arg(
                    arg!(<PRICE> "Purchase price per ounce")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!([DESIGN] "Coin or bar design label")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete the wallet entry at a position")
                .arg(arg!(<INDEX> "Entry position, see 'holdings'")
                    .value_parser(clap::value_parser!(usize))),
        )
        .subcommand(Command::new("spot").about("Show the current spot prices"))
}

/// Snapshot stand-in used when the local database cannot be opened, so a
/// broken cache degrades the chain instead of aborting the command.
struct NoSnapshot;

impl SpotCache for NoSnapshot {
    fn read(&self) -> Option<SpotQuote> {
        None
    }

    fn write(&self, _quote: &SpotQuote) -> Result<(), crate::error::SpotError> {
        Err(crate::error::SpotError::Cache(
            "snapshot database unavailable".to_string(),
        ))
    }
}

async fn resolve_quote(cfg: &Config) -> SpotQuote {
    let provider = GoldApi::new(cfg.api_key.clone());
    let spot_file = SpotFile::new(&cfg.spot_file);

    match SnapshotDb::open(Path::new(&cfg.snapshot_db)) {
        Ok(snapshot) => resolve_spot_prices(&provider, &snapshot, &spot_file).await,
        Err(e) => {
            warn!("local spot snapshot unavailable: {}", e);
            resolve_spot_prices(&provider, &NoSnapshot, &spot_file).await
        }
    }
}

fn print_holdings(holdings: &[Holding]) {
    use comfy_table::{
        presets::UTF8_FULL, Attribute, Cell, CellAlignment, ContentArrangement, Table,
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);

    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Metal").add_attribute(Attribute::Bold),
        Cell::new("Design").add_attribute(Attribute::Bold),
        Cell::new("Weight").add_attribute(Attribute::Bold),
        Cell::new("Qty").add_attribute(Attribute::Bold),
        Cell::new("Buy Price").add_attribute(Attribute::Bold),
    ]);

    for (i, holding) in holdings.iter().enumerate() {
        let design = if holding.design.is_empty() {
            "-".to_string()
        } else {
            holding.design.clone()
        };
        table.add_row(vec![
            Cell::new(i).set_alignment(CellAlignment::Right),
            Cell::new(&holding.metal),
            Cell::new(design),
            Cell::new(format!("{} oz", holding.weight)).set_alignment(CellAlignment::Right),
            Cell::new(holding.quantity).set_alignment(CellAlignment::Right),
            Cell::new(format!("${:.2}", holding.buy_price)).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
}

fn print_spot(quote: &SpotQuote) {
    println!("{} ${:.2}", "Gold:".yellow().bold(), quote.gold);
    println!("{} ${:.2}", "Silver:".white().bold(), quote.silver);
    println!("{} ${:.2}", "Copper:".red().bold(), quote.copper);

    match quote.last_updated {
        Some(at) => {
            let local = at.with_timezone(&chrono::Local);
            println!("Last updated: {}", local.format("%Y-%m-%d %H:%M:%S"));
        }
        None => println!("Last updated: N/A"),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg: Config = confy::load("bullion", "config")?;

    let matches = cli().get_matches();

    if matches.subcommand_matches("config").is_some() {
        println!(
            "Your config file is located here: \n{}",
            confy::get_configuration_file_path("bullion", "config")?.display()
        );
    }

    if let Some(matches) = matches.subcommand_matches("add") {
        let holding = Holding::new(
            matches.get_one::<String>("METAL").unwrap(),
            matches.get_one::<String>("DESIGN").unwrap(),
            *matches.get_one::<f64>("WEIGHT").unwrap(),
            *matches.get_one::<u32>("QUANTITY").unwrap(),
            *matches.get_one::<f64>("PRICE").unwrap(),
        );

        let wallet = Wallet::new(&cfg.wallet_file);
        wallet.append(holding.clone())?;
        println!(
            "Added {} x {} oz {} at ${:.2}/oz",
            holding.quantity, holding.weight, holding.metal, holding.buy_price
        );
    }

    if let Some(matches) = matches.subcommand_matches("remove") {
        let index = *matches.get_one::<usize>("INDEX").unwrap();
        let wallet = Wallet::new(&cfg.wallet_file);
        let removed = wallet.delete_at(index)?;
        println!(
            "Removed {} x {} oz {} from position {}",
            removed.quantity, removed.weight, removed.metal, index
        );
    }

    if matches.subcommand_matches("spot").is_some() {
        let quote = resolve_quote(&cfg).await;
        print_spot(&quote);
    }

    for subcommand in ["holdings", "balances", "allocation"].iter() {
        if let Some(matches) = matches.subcommand_matches(subcommand) {
            let mut filename = String::new();

            // try to get filename as argument
            if let Ok(Some(f)) = matches.try_get_one::<String>("FILE") {
                filename = f.to_string();
            }
            // if no argument is given, try to get filename from config
            if filename.is_empty() {
                filename.clone_from(&cfg.wallet_file);
            }
            // if no argument and no config is given, print help
            if filename.is_empty() {
                cli().print_help()?;
                return Ok(());
            }

            let wallet = Wallet::new(&filename);
            let holdings = wallet.load()?;

            match subcommand as &str {
                "holdings" => {
                    print_holdings(&holdings);
                }
                "balances" => {
                    let quote = resolve_quote(&cfg).await;
                    let filter = matches.get_one::<String>("metal").map(|s| s.as_str());
                    let portfolio = Portfolio::from_holdings(&holdings);
                    portfolio.print(&quote, filter);
                }
                "allocation" => {
                    let quote = resolve_quote(&cfg).await;
                    let portfolio = Portfolio::from_holdings(&holdings);
                    portfolio.draw_pie_chart(&quote);
                    portfolio.print_allocation(&quote);
                }
                _ => (),
            }
        }
    }

    Ok(())
}
