use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use debarrel_rewrite::Config;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "debarrel")]
#[command(about = "Rewrite imports that go through barrel files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite barrel imports to import from the module that defines each binding
    Rewrite(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Rewrite(cfg) => {
            let num_threads = rayon::current_num_threads();
            info!(
                "Running import rewrite ({} mode, using {} threads)",
                if cfg.write { "write" } else { "check" },
                num_threads
            );
            debug!(
                "Config: root={:?}, bundler_config={:?}[{}], entry_glob={:?}, on_unresolved={:?}",
                cfg.root,
                cfg.bundler_config,
                cfg.bundler_config_index,
                cfg.entry_glob,
                cfg.on_unresolved
            );

            let result = debarrel_rewrite::run_rewrite(cfg)?;
            debug!(
                "Found {} files with rewrites and {} failures",
                result.rewrites.len(),
                result.failures.len()
            );

            let elapsed_ms = start.elapsed().as_millis();

            if result.rewrites.is_empty() && result.failures.is_empty() {
                info!("No imports to rewrite");
                debarrel_rewrite::print_no_changes_message(&mut stdout, result.files_analyzed)?;
            } else {
                debarrel_rewrite::print_rewrite_tree(&mut stdout, &result)?;
            }

            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files (using {} threads).",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                result.files_analyzed.to_string().cyan(),
                num_threads.to_string().cyan()
            )?;
            stdout.flush()?;

            // Non-zero exit to fail CI on pending rewrites or broken files
            let pending = !result.written && !result.rewrites.is_empty();
            if pending || !result.failures.is_empty() {
                std::process::exit(1);
            }

            Ok(())
        }
    }
}
