pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use client::{ApiClient, ClientError};

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "goalpost")]
#[command(about = "Goalpost CLI - route classification, redirect simulation and goal API access")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL (default: $GOALPOST_SERVER or http://localhost:3000)")]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Session token sent as a Bearer header (default: $GOALPOST_TOKEN)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the API server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides config)")]
        port: Option<u16>,
    },

    #[command(about = "Classify request paths the way the route gate does")]
    Classify {
        #[arg(required = true, help = "Paths to classify, query strings allowed")]
        paths: Vec<String>,
    },

    #[command(about = "Simulate the auth-state redirector over a sequence of events")]
    Redirect(commands::redirect::RedirectArgs),

    #[command(about = "Mint a development session token")]
    Token {
        #[arg(help = "User id to place in the token subject")]
        user_id: String,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, help = "Expiry in hours (default: config)")]
        hours: Option<u64>,
    },

    #[command(about = "User profile operations")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Goal operations")]
    Goals {
        #[command(subcommand)]
        cmd: commands::goals::GoalCommands,
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

impl Cli {
    fn api_client(&self) -> anyhow::Result<ApiClient> {
        let server = self
            .server
            .clone()
            .or_else(|| std::env::var("GOALPOST_SERVER").ok())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let token = self.token.clone().or_else(|| std::env::var("GOALPOST_TOKEN").ok());

        Ok(ApiClient::new(server, token)?)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Classify { ref paths } => commands::classify::handle(paths, output_format),
        Commands::Redirect(ref args) => commands::redirect::handle(args, output_format),
        Commands::Token { ref user_id, ref email, hours } => {
            commands::token::handle(user_id, email.clone(), hours, output_format)
        }
        Commands::User { ref cmd } => commands::user::handle(cmd, &cli.api_client()?, output_format).await,
        Commands::Goals { ref cmd } => commands::goals::handle(cmd, &cli.api_client()?, output_format).await,
    }
}
