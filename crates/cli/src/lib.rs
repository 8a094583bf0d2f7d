pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "insight",
    about = "Insight operator CLI",
    long_about = "Assign customer segments, find similar products, and check artifact readiness.",
    after_help = "Examples:\n  insight classify --recency 325 --frequency 1 --monetary 765322\n  \
                  insight recommend WHITE METAL LANTERN --top-n 3\n  insight doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Assign a customer segment from recency, frequency and monetary values")]
    Classify {
        #[arg(
            long,
            default_value_t = 325.0,
            allow_negative_numbers = true,
            help = "Days since last purchase"
        )]
        recency: f64,
        #[arg(
            long,
            default_value_t = 1,
            allow_negative_numbers = true,
            help = "Number of purchases"
        )]
        frequency: i64,
        #[arg(
            long,
            default_value_t = 765_322.0,
            allow_negative_numbers = true,
            help = "Total spend"
        )]
        monetary: f64,
    },
    #[command(about = "List the products most similar to the given product name")]
    Recommend {
        #[arg(
            required = true,
            num_args = 1..,
            help = "Product name; punctuation and case are ignored"
        )]
        product: Vec<String>,
        #[arg(long, allow_negative_numbers = true, help = "Number of products to return")]
        top_n: Option<i64>,
    },
    #[command(about = "List distinct catalog product names")]
    Products,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and report per-feature artifact readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Classify { recency, frequency, monetary } => {
            commands::classify::run(recency, frequency, monetary)
        }
        Command::Recommend { product, top_n } => {
            commands::recommend::run(&product.join(" "), top_n)
        }
        Command::Products => commands::products::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => {
            let (passed, output) = commands::doctor::run(json);
            commands::CommandResult { exit_code: if passed { 0 } else { 1 }, output }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn negative_frequency_reaches_validation() {
        let cli = Cli::try_parse_from(["insight", "classify", "--frequency", "-1"])
            .expect("negative frequency should parse");

        assert!(matches!(cli.command, Command::Classify { frequency: -1, .. }));
    }

    #[test]
    fn classify_defaults_match_reference_customer() {
        let cli = Cli::try_parse_from(["insight", "classify"]).expect("defaults should parse");

        let Command::Classify { recency, frequency, monetary } = cli.command else {
            panic!("expected classify command");
        };
        assert_eq!((recency, frequency, monetary), (325.0, 1, 765_322.0));
    }
}
