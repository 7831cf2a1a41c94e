//! Gauss-Jackson Coefficient Tool
//!
//! Prints the predictor and corrector ladder for a Gauss-Jackson integrator
//! of a given order, either as aligned text or as JSON.
//!
//! Usage:
//!   cargo run --bin gj_coeffs -- [--json] [--config path/to/config.json] [order]

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde::Serialize;

use astrodyn::integration::{CoefficientPair, CoefficientTable, GaussJacksonConfig};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Gauss-Jackson Coefficient Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prints Gauss-Jackson and summed-Adams coefficient tables",
    long_about = None
)]
struct Args {
    /// Emit the table as JSON
    #[arg(short, long, action = ArgAction::SetTrue)]
    json: bool,

    /// Read max_order/order from a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Integration order (overrides the configuration file)
    order: Option<usize>,
}

#[derive(Serialize)]
struct TableReport<'a> {
    order: usize,
    predictor: &'a CoefficientPair,
    correctors: &'a [CoefficientPair],
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Prints both arrays of a coefficient pair, oldest sample first
fn print_pair(pair: &CoefficientPair) {
    println!("{:>6} {:>26} {:>26}", "index", "summed-Adams", "Gauss-Jackson");
    for (i, (sa, gj)) in pair
        .summed_adams()
        .iter()
        .zip(pair.gauss_jackson())
        .enumerate()
    {
        println!("{:>6} {:>26.17e} {:>26.17e}", i, sa, gj);
    }
}

fn load_config(args: &Args) -> Result<GaussJacksonConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            GaussJacksonConfig::from_json_str(&text)?
        }
        None => GaussJacksonConfig::default(),
    };

    if let Some(order) = args.order {
        config.order = order;
        config.max_order = config.max_order.max(order);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let table: CoefficientTable = config.build_table()?;

    if args.json {
        let report = TableReport {
            order: table.order(),
            predictor: table.predictor(),
            correctors: table.correctors(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Gauss-Jackson coefficients, order {} (capacity {})",
        config.order, config.max_order
    );

    print_section_header("Predictor");
    print_pair(table.predictor());

    for (index, pair) in table.correctors().iter().enumerate().rev() {
        print_section_header(&format!("Corrector {}", index));
        print_pair(pair);
    }

    Ok(())
}
