//! Me command - logs in and shows the bound identity.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, print_response};

/// Arguments for the me command.
#[derive(Args, Debug)]
pub struct MeArgs {
    /// Also fetch the account's public profile
    #[arg(short, long)]
    pub profile: bool,
}

/// Run the me command.
pub async fn run(args: MeArgs, ctx: &Context) -> Result<()> {
    let (client, session) = ctx.login().await?;

    if ctx.json_output && !args.profile {
        let output = serde_json::json!({
            "nick": session.nick,
            "user_id": session.user_id,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !ctx.json_output {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Logged in").bold());
        println!("  {} {}", dim.apply_to("Nick:"), session.nick);
        println!("  {} {}", dim.apply_to("User id:"), session.user_id);
        println!();
    }

    if args.profile {
        let response = client.users().me().await?;
        print_response(&response, ctx)?;
    }
    Ok(())
}
