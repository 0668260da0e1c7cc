//! expense-settlement CLI
//!
//! Settle a group's shared expenses from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Settle a ledger from a JSON file
//! expense-settlement settle --input ledger.json
//!
//! # Output as JSON, banker's rounding
//! expense-settlement settle --input ledger.json --format json --rounding half-even
//!
//! # Report payment cycles left after pairwise netting
//! expense-settlement cycles --input ledger.json
//!
//! # Generate a random ledger for testing
//! expense-settlement generate --members 6 --debts 4
//! ```

use expense_settlement::core::ledger::{Ledger, LedgerInput};
use expense_settlement::graph::cycle_detection::find_cycles;
use expense_settlement::matrix::balance_matrix::BalanceMatrix;
use expense_settlement::settlement::engine::{NetTransfer, SettlementEngine};
use expense_settlement::settlement::rounding::{RoundingMode, RoundingPolicy, MAX_SCALE};
use expense_settlement::simulation::generator::{generate_random_ledger, GroupConfig};
use log::info;
use std::fmt::Display;
use std::fs;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"expense-settlement — settle shared expenses with pairwise netting

USAGE:
    expense-settlement <COMMAND> [OPTIONS]

COMMANDS:
    settle      Compute net transfers for a ledger
    cycles      Report payment cycles among the net transfers
    generate    Generate a random ledger (for testing)
    help        Show this message

OPTIONS (settle, cycles):
    --input <FILE>        Path to JSON ledger file
    --format <FORMAT>     Output format: text (default) or json
    --scale <N>           Decimal places kept in transfers (default: 2)
    --rounding <MODE>     half-up (default) or half-even

OPTIONS (generate):
    --members <N>         Number of members (default: 5)
    --debts <N>           Number of direct debts (default: 3)
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    expense-settlement settle --input ledger.json
    expense-settlement settle --input ledger.json --format json --scale 0
    expense-settlement cycles --input ledger.json
    expense-settlement generate --members 8 --debts 5 --output group.json"#
    );
}

/// Print an error and exit.
fn fail(msg: impl Display) -> ! {
    eprintln!("Error: {}", msg);
    process::exit(1);
}

/// JSON output schema for a settlement.
#[derive(serde::Serialize)]
struct SettlementOutput {
    scale: u32,
    rounding: String,
    transfers: Vec<NetTransfer>,
    gross_total: String,
    net_total: String,
    savings_percent: f64,
}

#[derive(serde::Serialize)]
struct CycleOutput {
    members: Vec<String>,
    bottleneck: String,
    potential_savings: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{other}', expected 'text' or 'json'")),
        }
    }
}

struct CommonArgs {
    input: String,
    format: OutputFormat,
    policy: RoundingPolicy,
}

fn parse_common(args: &[String]) -> CommonArgs {
    let mut input_path = None;
    let mut format = OutputFormat::Text;
    let mut policy = RoundingPolicy::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--format" => {
                i += 1;
                format = args
                    .get(i)
                    .ok_or_else(|| "--format requires 'text' or 'json'".to_string())
                    .and_then(|s| s.parse::<OutputFormat>())
                    .unwrap_or_else(|e| fail(e));
            }
            "--scale" => {
                i += 1;
                policy.scale = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .filter(|scale| *scale <= MAX_SCALE)
                    .unwrap_or_else(|| {
                        fail(format!("--scale requires a number from 0 to {MAX_SCALE}"))
                    });
            }
            "--rounding" => {
                i += 1;
                policy.mode = args
                    .get(i)
                    .ok_or_else(|| "--rounding requires 'half-up' or 'half-even'".to_string())
                    .and_then(|s| s.parse::<RoundingMode>())
                    .unwrap_or_else(|e| fail(e));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    CommonArgs {
        input: input_path.unwrap_or_else(|| fail("--input <FILE> is required")),
        format,
        policy,
    }
}

fn load_ledger(path: &str) -> Ledger {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));

    let input: LedgerInput = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "members": ["A", "B", "C"],
  "expenses": {{ "A": "14.98", "B": "16.65", "C": "33.14" }},
  "direct_debts": [ {{ "debtor": "C", "creditor": "A", "amount": "5" }} ]
}}"#
        );
        fail(format!("invalid ledger JSON: {}", e))
    });

    let ledger = Ledger::from_input(&input).unwrap_or_else(|e| fail(e));
    info!(
        "loaded ledger '{}': {} members, {} direct debts",
        path,
        ledger.member_count(),
        ledger.direct_debts().len()
    );
    ledger
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn cmd_settle(args: &[String]) {
    let args = parse_common(args);
    let ledger = load_ledger(&args.input);
    let matrix = BalanceMatrix::build(&ledger).unwrap_or_else(|e| fail(e));
    let engine = SettlementEngine::new(args.policy);
    let transfers = engine.settle(&matrix);
    let summary = engine.summarize(&matrix, &transfers);

    if args.format == OutputFormat::Json {
        let output = SettlementOutput {
            scale: args.policy.scale,
            rounding: args.policy.mode.to_string(),
            gross_total: summary.gross_total.round_dp(args.policy.scale).to_string(),
            net_total: summary.net_total.to_string(),
            savings_percent: summary.savings_percent(),
            transfers,
        };
        println!("{}", to_json(&output));
    } else {
        println!("=== Transfers ===");
        if transfers.is_empty() {
            println!("  Everyone is settled up.");
        }
        for t in &transfers {
            println!("  {}", t);
        }
        println!();
        println!("{}", summary);
    }
}

fn cmd_cycles(args: &[String]) {
    let args = parse_common(args);
    let ledger = load_ledger(&args.input);
    let transfers = SettlementEngine::new(args.policy)
        .settle_ledger(&ledger)
        .unwrap_or_else(|e| fail(e));
    let cycles = find_cycles(&transfers);

    if args.format == OutputFormat::Json {
        let output: Vec<CycleOutput> = cycles
            .iter()
            .map(|c| CycleOutput {
                members: c.members.iter().map(|m| m.to_string()).collect(),
                bottleneck: c.bottleneck.to_string(),
                potential_savings: c.potential_savings().to_string(),
            })
            .collect();
        println!("{}", to_json(&output));
    } else if cycles.is_empty() {
        println!("No cycles detected.");
    } else {
        for (i, cycle) in cycles.iter().enumerate() {
            let members: Vec<String> = cycle.members.iter().map(|m| m.to_string()).collect();
            println!("  Cycle {}: {} → (back to start)", i, members.join(" → "));
            println!("    Bottleneck:        {}", cycle.bottleneck);
            println!("    Potential savings: {}", cycle.potential_savings());
        }
        println!("\nTotal cycles: {}", cycles.len());
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                config.member_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--members requires a number"));
            }
            "--debts" => {
                i += 1;
                config.direct_debt_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--debts requires a number"));
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let ledger = generate_random_ledger(&config).unwrap_or_else(|e| fail(e));
    let json = to_json(&ledger.to_input());

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} members with {} direct debts → {}",
            ledger.member_count(),
            ledger.direct_debts().len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "cycles" => cmd_cycles(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
