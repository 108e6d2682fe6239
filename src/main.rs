use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, Read};
use tracing::info;

use mumbai_kit::{
    analyze_upi_transactions, analyze_upi_transactions_value, generate_local_pass_value,
    parse_whatsapp_message, read_transactions_csv,
};

/// Mumbai Kit - pass printer, chat line parser and UPI log analyzer.
///
/// Every command reads stdin and writes stdout.
#[derive(Parser)]
#[command(name = "mumbai-kit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a local pass for a JSON passenger object.
    Pass,

    /// Parse chat export lines, one JSON object (or null) per line.
    Chat,

    /// Summarize a JSON array of transactions.
    Upi {
        /// Read `id,type,amount,to,category,date` CSV instead of JSON.
        #[arg(long)]
        csv: bool,

        /// Print a plain-text report instead of JSON.
        #[arg(long)]
        report: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pass => run_pass(),
        Commands::Chat => run_chat(cli.pretty),
        Commands::Upi { csv, report } => run_upi(csv, report, cli.pretty),
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    Ok(input)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn run_pass() -> Result<()> {
    let input = read_stdin()?;
    let passenger: Value = serde_json::from_str(&input).context("Passenger is not valid JSON")?;
    println!("{}", generate_local_pass_value(&passenger));
    Ok(())
}

fn run_chat(pretty: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut parsed = 0usize;
    let mut total = 0usize;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let message = parse_whatsapp_message(&line);
        total += 1;
        if message.is_some() {
            parsed += 1;
        }
        print_json(&message, pretty)?;
    }

    info!(parsed, total, "chat lines processed");
    Ok(())
}

fn run_upi(csv: bool, report: bool, pretty: bool) -> Result<()> {
    let summary = if csv {
        let transactions = read_transactions_csv(io::stdin().lock())?;
        info!(rows = transactions.len(), "loaded CSV transactions");
        analyze_upi_transactions(&transactions)
    } else {
        let input = read_stdin()?;
        let value: Value = serde_json::from_str(&input).context("Transactions are not valid JSON")?;
        analyze_upi_transactions_value(&value)
    };

    if report {
        match summary {
            Some(summary) => println!("{}", summary.report()),
            None => println!("No valid transactions"),
        }
        return Ok(());
    }

    print_json(&summary, pretty)
}
