//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration with secrets masked
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Show the user configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;

    println!("# Ostiary Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)\n");
    } else {
        for source in &sources {
            println!("# from {}", source.display());
        }
        println!();
    }

    print!("{}", loaded.config.redacted().to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;

    println!("Config layers (later overrides earlier):");
    for source in &loaded.sources {
        let status = if source.loaded { "loaded" } else { "not found" };
        println!("  {:<10} {}", status, source.path.display());
    }

    if !loaded.overrides.is_empty() {
        println!("\nEnvironment overrides:");
        for applied in &loaded.overrides {
            println!("  {}", applied);
        }
    }

    Ok(())
}

fn cmd_path() -> Result<()> {
    match ostiary_config::user_config_path() {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("could not determine the user config directory"),
    }
    Ok(())
}
