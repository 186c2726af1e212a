use clap::Parser;
use ispd_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // The store snapshot is only written once a command completes, so an
        // interrupted ingest leaves the previous snapshot untouched.
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                match signal {
                    Ok(()) => Err(anyhow::anyhow!("Processing interrupted by user")),
                    Err(e) => Err(anyhow::anyhow!("Failed to listen for CTRL+C: {}", e)),
                }
            }
        }
    });

    match result {
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn show_help_and_commands() {
    println!("ISPD Processor - Historical Surface-Pressure Record Store");
    println!("=========================================================");
    println!();
    println!("Decode fixed-width composite or 41-column delimited observation records");
    println!("into a partitioned record store, and export them by date with optional");
    println!("ICOADS quality-control trimming.");
    println!();
    println!("USAGE:");
    println!("    ispd-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ingest      Decode input files into the record store");
    println!("    export      Write the records of one date");
    println!("    count       Report stored rows per section for one date");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Ingest a month of records, creating inventory entries:");
    println!("    ispd-processor ingest -i data/1950-01/*.imma");
    println!();
    println!("    # Bind standalone attachment lines, skipping ones already stored:");
    println!("    ispd-processor ingest -e -u feedback/");
    println!();
    println!("    # Export a date with trimming and continuation lines:");
    println!("    ispd-processor export --date 1950-01-15 --trim --optf 1 --all");
    println!();
    println!("For detailed help on any command, use:");
    println!("    ispd-processor <COMMAND> --help");
}
