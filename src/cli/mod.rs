use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::StoreBackend;
use crate::database::DatabaseManager;

#[derive(Parser, Debug)]
#[command(name = "course-api")]
#[command(about = "Course API - users, courses and HTTP Basic authentication")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides API_PORT")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of postgres")]
        memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = crate::config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => {
            if let Some(port) = port {
                config.api.port = port;
            }
            if memory {
                config.database.backend = StoreBackend::Memory;
            }
            crate::server::serve(config).await
        }
        Commands::Migrate => {
            let store = DatabaseManager::connect_postgres(&config.database)
                .await
                .context("failed to connect to postgres")?;
            DatabaseManager::migrate(&store)
                .await
                .context("failed to apply migrations")?;
            println!("Migrations applied");
            Ok(())
        }
    }
}
