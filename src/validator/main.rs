//! Standalone validator for group seed files.
//!
//! Checks a groups JSON file for unique ids, valid limits and well-formed
//! blacklist handles before it is handed to the bot.

use std::process::ExitCode;

use clap::Parser;

use group_config_bot::config::{BotConfig, GroupConfig};

/// Group configuration validator.
#[derive(Parser, Debug)]
#[command(name = "validate_groups")]
#[command(about = "Validates group seed files for the configuration bot")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file to validate.
    #[arg(short, long, default_value = "groups.json")]
    file: String,

    /// Generate an example configuration file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show detailed information for each group.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_config(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = BotConfig::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example configuration written to: {output_path}");
            println!("\nThe file contains {} example groups.", example.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_config(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let config = match BotConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.is_empty() {
        println!("✗ Validation failed: the file defines no groups");
        return ExitCode::FAILURE;
    }

    let results = config.validate_all();
    let mut errors = 0;

    for (group, result) in config.groups.iter().zip(&results) {
        if verbose {
            describe(group);
        }

        match result {
            Ok(()) if verbose => println!("  ✓ OK"),
            Ok(()) => {}
            Err(e) => {
                errors += 1;
                println!("  ✗ Error: {e}");
            }
        }
    }

    println!();

    let total = config.len();
    if errors == 0 {
        println!("✓ All {total} groups are valid!");
        println!("  Activation window: {}", config.time_window);
        if !config.time_window.is_in_range() {
            println!("  ⚠ Warning: the activation window is not a valid clock range");
        }
        ExitCode::SUCCESS
    } else {
        println!("✗ Validation failed: {errors} error(s) in {total} groups");
        println!("  Valid: {}/{total}", total - errors);
        ExitCode::FAILURE
    }
}

fn describe(group: &GroupConfig) {
    println!(
        "[{}] \"{}\" (ETH {}, SOL {}, {} blacklisted)",
        group.id,
        group.display_name(),
        group.eth_limit,
        group.sol_limit,
        group.blacklist.len()
    );
}
