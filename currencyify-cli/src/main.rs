//! Currencyify CLI
//!
//! Command-line interface for the Currencyify API.

use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use currencyify_client::CurrencyifyClient;

#[derive(Parser)]
#[command(name = "currencyify")]
#[command(author, version, about = "Currencyify API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Currencyify API
    #[arg(
        long,
        env = "CURRENCYIFY_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
        /// Source currency code
        #[arg(long)]
        from: String,
        /// Target currency code
        #[arg(long)]
        to: String,
    },
    /// Look up exchange rates against a base currency
    Rates {
        /// Base currency code
        #[arg(long, default_value = "USD")]
        base: String,
        /// Target currency codes (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<String>,
    },
    /// Check API health
    Health,
}

fn parse_amount(s: &str) -> std::result::Result<Decimal, String> {
    Decimal::from_str(s.trim()).map_err(|_| format!("Invalid amount: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = CurrencyifyClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is alive");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Convert { amount, from, to } => {
            let resp = client.convert(&from, &to, amount).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }

        Commands::Rates { base, targets } => {
            let targets: Vec<&str> = targets
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            let resp = client.exchange_rates(&base, &targets).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rates_targets() {
        let cli = Cli::parse_from(["currencyify", "rates", "--targets", "INR,JPY"]);
        match cli.command {
            Commands::Rates { base, targets } => {
                assert_eq!(base, "USD");
                assert_eq!(targets, vec!["INR", "JPY"]);
            }
            _ => panic!("expected rates command"),
        }
    }

    #[test]
    fn test_parse_convert_amount() {
        let cli = Cli::parse_from(["currencyify", "convert", "12.5", "--from", "usd", "--to", "inr"]);
        match cli.command {
            Commands::Convert { amount, from, to } => {
                assert_eq!(amount, Decimal::from_str("12.5").unwrap());
                assert_eq!(from, "usd");
                assert_eq!(to, "inr");
            }
            _ => panic!("expected convert command"),
        }
        assert!(parse_amount("ten").is_err());
    }
}
