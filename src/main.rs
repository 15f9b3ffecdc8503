mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "site_purge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cli::check(cli.config.as_deref(), cli.root.as_deref())?;
        }
        Commands::Extract { file, ext, format } => {
            cli::extract(
                cli.config.as_deref(),
                cli.root.as_deref(),
                file.as_deref(),
                ext.as_deref(),
                &format,
            )?;
        }
        Commands::Scan { format, watch } => {
            cli::scan(cli.config.as_deref(), cli.root.as_deref(), &format, watch)?;
        }
        Commands::Plan { format } => {
            cli::plan(cli.config.as_deref(), cli.root.as_deref(), &format)?;
        }
        Commands::Init {
            css,
            output,
            format,
            force,
        } => {
            cli::init(
                cli.config.as_deref(),
                cli.root.as_deref(),
                css,
                output,
                &format,
                force,
            )?;
        }
        Commands::Schema => {
            cli::print_schema()?;
        }
    }

    Ok(())
}
