use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::{debug, info};

use ldif_diff::{compute_diff_with, Entry};
use ldif_model::{split_lines, LdifLine, Line};

use crate::cli::*;
use crate::config::Config;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &config, &cli.format),
        Command::Lint(args) => cmd_lint(args, &cli.format),
        Command::Config => cmd_config(&config),
    }
}

fn load_entry(path: &Path) -> anyhow::Result<Entry> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid entry snapshot", path.display()))
}

fn cmd_diff(args: DiffArgs, config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let before = load_entry(&args.before)?;
    let after = load_entry(&args.after)?;
    info!(dn = %before.dn(), "diffing entry snapshots");

    let Some(record) = compute_diff_with(&before, &after, &config.encoding) else {
        match format {
            OutputFormat::Text => println!("No differences."),
            OutputFormat::Json => println!("{}", json!({ "dn": before.dn(), "changed": false })),
        }
        return Ok(());
    };

    let ldif = record.serialize(&config.format);
    match format {
        OutputFormat::Text => print!("{ldif}"),
        OutputFormat::Json => {
            let mod_specs: Vec<_> = record
                .mod_specs()
                .map(|spec| {
                    json!({
                        "kind": spec.kind().as_str(),
                        "attribute": spec.attribute_description(),
                        "values": spec.attr_vals().len(),
                    })
                })
                .collect();
            let out = json!({
                "dn": record.dn(),
                "changed": true,
                "mod_specs": mod_specs,
                "ldif": ldif,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_lint(args: LintArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut line_no = 1;
    let mut total = 0;
    let mut problems = Vec::new();
    for raw in split_lines(&text) {
        let line = LdifLine::parse(raw);
        total += 1;
        if let Some(reason) = line.invalid_reason() {
            problems.push((line_no, line.type_name(), reason));
        }
        line_no += raw.matches('\n').count();
    }
    debug!(file = %args.file.display(), lines = total, invalid = problems.len(), "lint finished");

    match format {
        OutputFormat::Text => {
            for (line_no, kind, reason) in &problems {
                println!(
                    "{}:{}: {} {}",
                    args.file.display(),
                    line_no.to_string().yellow(),
                    format!("[{kind}]").dimmed(),
                    reason.red()
                );
            }
            if problems.is_empty() {
                println!("{} {} lines, no problems", "✓".green().bold(), total);
            }
        }
        OutputFormat::Json => {
            let out: Vec<_> = problems
                .iter()
                .map(|(line, kind, reason)| json!({ "line": line, "kind": kind, "reason": reason }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    if !problems.is_empty() {
        bail!("{} of {} lines are invalid", problems.len(), total);
    }
    Ok(())
}

fn cmd_config(config: &Config) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
