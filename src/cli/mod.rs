pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "orgchart")]
#[command(about = "orgchart - run and administer the organisation chart API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server")]
    Serve {
        #[arg(long, help = "Override the listening port")]
        port: Option<u16>,
        #[arg(long, help = "Load the built-in sample organisation before serving")]
        seed: bool,
    },

    #[command(about = "Load fixture data into the configured store")]
    Seed(commands::seed::SeedArgs),

    #[command(about = "Create the collection tables if they are missing")]
    Schema,

    #[command(about = "Issue a JWT for a user in the configured directory")]
    Token {
        #[arg(long, help = "Username")]
        username: String,
        #[arg(long, help = "Password")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let mut config = crate::config::config().clone();

    match cli.command {
        Commands::Serve { port, seed } => {
            if let Some(port) = port {
                config.api.port = port;
            }
            crate::server::run(&config, seed).await
        }
        Commands::Seed(args) => commands::seed::handle(args, &config, output_format).await,
        Commands::Schema => commands::schema::handle(&config, output_format).await,
        Commands::Token { username, password } => {
            commands::token::handle(&username, &password, &config, output_format).await
        }
    }
}
