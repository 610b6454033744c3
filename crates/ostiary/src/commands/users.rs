//! Users command - lists the user directory.

use anyhow::Result;
use clap::Args;

use super::{Context, load_directory};

/// Arguments for the users command.
#[derive(Args, Debug)]
pub struct UsersArgs {}

/// Run the users command.
///
/// Prints subject, login id and name. Passwords are never shown.
pub async fn run(_args: UsersArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let directory = load_directory(&loaded.config.directory())?;

    println!("{:<12} {:<16} NAME", "SUBJECT", "LOGIN ID");
    for user in directory.iter() {
        println!("{:<12} {:<16} {}", user.subject, user.login_id, user.full_name());
    }

    if ctx.verbose {
        println!("\n{} user(s)", directory.len());
    }

    Ok(())
}
