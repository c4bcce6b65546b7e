use std::{
    env,
    io::{self, Write},
    path::Path,
};

use colored::Colorize;
use debarrel_core::make_relative;
use log::{debug, trace};

use crate::types::{FileFailure, FileRewrite, RunResult};

/// Relativize a path to the current working directory for clickable links
fn relativize_to_cwd(path: &Path) -> String {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => {
            debug!("Failed to get current directory");
            return path.display().to_string();
        }
    };

    match make_relative(path, &cwd) {
        Some(rel_path) => {
            let result = rel_path.to_string_lossy().to_string();
            trace!("Relativized '{}' to '{}'", path.display(), result);
            result
        }
        None => path.display().to_string(),
    }
}

/// Collapses a possibly multi-line statement onto one line.
fn one_line(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn print_no_changes_message<W: Write>(writer: &mut W, files_analyzed: usize) -> io::Result<()> {
    debug!("No imports to rewrite");
    writeln!(
        writer,
        "{} All imports already point at their origin ({} files checked)",
        "✓".green().bold(),
        files_analyzed
    )?;
    writer.flush()?;
    Ok(())
}

pub fn print_rewrite_tree<W: Write>(writer: &mut W, result: &RunResult) -> io::Result<()> {
    debug!("Printing rewrite tree for {} files", result.rewrites.len());

    if !result.rewrites.is_empty() {
        let (marker, heading) = if result.written {
            ("✓".green().bold(), "Rewrote barrel imports")
        } else {
            ("⚠".yellow().bold(), "Barrel imports to rewrite")
        };
        writeln!(writer, "{} {}\n", marker, heading)?;
    }

    for rewrite in &result.rewrites {
        print_file(writer, rewrite)?;
    }

    if !result.failures.is_empty() {
        print_failures(writer, &result.failures)?;
    }

    print_summary(writer, result)?;

    writer.flush()?;
    Ok(())
}

fn print_file<W: Write>(writer: &mut W, rewrite: &FileRewrite) -> io::Result<()> {
    trace!("Printing {} statements of {}", rewrite.statements.len(), rewrite.path.display());
    writeln!(
        writer,
        "{} ({} imports)",
        relativize_to_cwd(&rewrite.path).blue(),
        rewrite.statements.len().to_string().yellow()
    )?;

    for (idx, statement) in rewrite.statements.iter().enumerate() {
        let is_last = idx == rewrite.statements.len() - 1;
        let (prefix, continuation) = if is_last { ("└──", "    ") } else { ("├──", "│   ") };

        writeln!(
            writer,
            "{}  {} {}",
            prefix.dimmed(),
            format!("L{}", statement.line).dimmed(),
            one_line(&statement.original).red()
        )?;
        for replacement in &statement.replacements {
            writeln!(writer, "{}    {} {}", continuation.dimmed(), "→".dimmed(), replacement.green())?;
        }
    }

    writeln!(writer)?;
    Ok(())
}

fn print_failures<W: Write>(writer: &mut W, failures: &[FileFailure]) -> io::Result<()> {
    writeln!(writer, "{} Files that could not be processed\n", "✗".red().bold())?;
    for failure in failures {
        writeln!(writer, "{}", relativize_to_cwd(&failure.path).blue())?;
        writeln!(writer, "{}  {}", "└──".dimmed(), failure.error)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, result: &RunResult) -> io::Result<()> {
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(
        writer,
        "  Import statements {}: {}",
        if result.written { "rewritten" } else { "to rewrite" },
        result.statements_rewritten().to_string().yellow().bold()
    )?;
    writeln!(writer, "  Files affected: {}", result.rewrites.len().to_string().yellow())?;
    writeln!(writer, "  Modules indexed: {}", result.modules_indexed.to_string().cyan())?;
    if !result.failures.is_empty() {
        writeln!(writer, "  Failed files: {}", result.failures.len().to_string().red().bold())?;
    }
    if !result.written && !result.rewrites.is_empty() {
        writeln!(writer, "  Run with {} to apply", "--write".bold())?;
    }
    Ok(())
}
