use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use vast_vmap::async_api;
use vast_vmap::{Error, ParseOptions};

/// VAST and VMAP parser and validator
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a VAST 2/3 document
    Vast(DocumentArgs),

    /// Parse a VMAP 1.x document
    Vmap(DocumentArgs),
}

#[derive(Args)]
struct DocumentArgs {
    /// Path to the XML file
    #[arg(short, long)]
    input: PathBuf,

    /// Print the mapped document even if it does not validate
    #[arg(long)]
    skip_validation: bool,

    /// Pretty print the output
    #[arg(short, long)]
    pretty: bool,
}

impl DocumentArgs {
    fn options(&self) -> ParseOptions {
        ParseOptions {
            skip_validation: self.skip_validation,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match command {
        Commands::Vast(args) => {
            let xml = tokio::fs::read_to_string(&args.input).await?;
            let vast = async_api::parse_vast(xml, args.options()).await?;
            render(&vast, args.pretty)
        }
        Commands::Vmap(args) => {
            let xml = tokio::fs::read_to_string(&args.input).await?;
            let vmap = async_api::parse_vmap(xml, args.options()).await?;
            render(&vmap, args.pretty)
        }
    }
}

fn render<T: Serialize>(document: &T, pretty: bool) -> Result<String, Box<dyn std::error::Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(json)
}

fn report(err: &(dyn std::error::Error + 'static)) {
    eprintln!("error: {}", err);
    if let Some(Error::Validation(validation)) = err.downcast_ref::<Error>() {
        for violation in validation.details() {
            eprintln!("  {}", violation);
        }
        return;
    }
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}
