//! turn-adapter binary entry point

use std::io::Write;

use clap::Parser;
use color_eyre::Result;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;
use turn_adapter::{
    cli::{Cli, Commands},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only model output
    let filter = if cli.verbose {
        EnvFilter::new("turn_adapter=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { turn, model } => {
            let mut config = Config::load(cli.config.as_deref())?;
            turn.apply(&mut config)?;
            if let Some(model) = model {
                config.model.model_name = model;
            }

            let adapter = config.build_adapter()?;
            let parts = turn.to_parts()?;
            let mut output = Box::pin(adapter.process_parts(parts));

            let mut stdout = std::io::stdout().lock();
            while let Some(part) = output.next().await {
                write!(stdout, "{}", part?.text_content())?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
        Commands::Messages { turn } => {
            let mut config = Config::load(cli.config.as_deref())?;
            turn.apply(&mut config)?;

            let payload = config.formatter()?.payload(&turn.to_parts()?)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Version => {
            println!("turn-adapter version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
