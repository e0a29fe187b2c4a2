use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod util;

#[derive(Parser)]
#[command(name = "sgraph", version, about = "Schema graph utilities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert schemas exported from a schema module to JSON Schema
    ToJsonSchema(commands::to_json_schema::Args),
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::ToJsonSchema(args) => commands::to_json_schema::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
