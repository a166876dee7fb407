//! Operations command - lists the endpoint catalog.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use eksi_client::Endpoint;
use serde::Serialize;

use super::Context;

/// Arguments for the operations command.
#[derive(Args, Debug)]
pub struct OperationsArgs {}

/// Catalog entry for JSON output.
#[derive(Debug, Serialize)]
struct OperationOutput {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    requires_auth: bool,
    summary: &'static str,
}

/// Run the operations command. Needs no network or credentials.
pub fn run(_args: OperationsArgs, ctx: &Context) -> Result<()> {
    let operations: Vec<OperationOutput> = Endpoint::ALL
        .iter()
        .map(|e| {
            let d = e.descriptor();
            OperationOutput {
                name: d.name,
                method: d.method.as_str(),
                path: d.path_template,
                requires_auth: d.requires_auth,
                summary: d.summary,
            }
        })
        .collect();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&operations)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!("{}", style("Operations").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    for op in &operations {
        println!(
            "  {:<16} {:<5} {:<36} {}",
            op.name,
            op.method,
            op.path,
            dim.apply_to(op.summary)
        );
    }
    println!();
    Ok(())
}
