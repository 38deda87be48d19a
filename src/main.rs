//! CSExport CLI - export CrowdStrike Falcon policies, exclusions and indicators to Excel

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;
use log::LevelFilter;

mod cli;
mod client;
mod config;
mod error;
mod export;
mod output;

use cli::{Cli, ClientCommands, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    // Answers `COMPLETE=<shell> csexport ...` and exits; no-op otherwise
    CompleteEnv::with_factory(Cli::command).complete();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Export(args) => cli::export::run(&args, &opts).await,
        Commands::Client(client_cmd) => match client_cmd {
            ClientCommands::Create { name, fields } => {
                cli::client::create(name.as_deref(), &fields, &opts)
            }
            ClientCommands::Edit { name, fields } => cli::client::edit(&name, &fields, &opts),
            ClientCommands::List => cli::client::list(&opts),
            ClientCommands::Delete { name, yes } => cli::client::delete(&name, yes, &opts),
        },
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "csexport",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
