use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_json, output_success};
use crate::cli::{ApiClient, OutputFormat};
use crate::database::models::UserProfile;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Show a user profile")]
    Get {
        #[arg(help = "User id")]
        user_id: String,
    },

    #[command(about = "Create or replace a user profile")]
    Put {
        #[arg(help = "User id")]
        user_id: String,
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "First name")]
        first_name: Option<String>,
        #[arg(long, help = "Last name")]
        last_name: Option<String>,
    },

    #[command(about = "Update fields of an existing profile")]
    Patch {
        #[arg(help = "User id")]
        user_id: String,
        #[arg(long, help = "Email address")]
        email: Option<String>,
        #[arg(long, help = "First name")]
        first_name: Option<String>,
        #[arg(long, help = "Last name")]
        last_name: Option<String>,
    },
}

pub async fn handle(cmd: &UserCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Get { user_id } => {
            let profile = client.fetch_user_profile(user_id).await?;
            print_profile(&profile, &output_format)
        }
        UserCommands::Put { user_id, email, first_name, last_name } => {
            let profile = client
                .provision_user(user_id, email, first_name.as_deref(), last_name.as_deref())
                .await?;
            output_success(
                &output_format,
                &format!("Provisioned user {}", user_id),
                Some(json!({ "profile": profile })),
            )
        }
        UserCommands::Patch { user_id, email, first_name, last_name } => {
            let mut changes = serde_json::Map::new();
            if let Some(email) = email {
                changes.insert("email".into(), json!(email));
            }
            if let Some(first_name) = first_name {
                changes.insert("firstName".into(), json!(first_name));
            }
            if let Some(last_name) = last_name {
                changes.insert("lastName".into(), json!(last_name));
            }
            if changes.is_empty() {
                anyhow::bail!("nothing to update: pass --email, --first-name or --last-name");
            }

            let profile = client.update_profile(user_id, Value::Object(changes)).await?;
            output_success(
                &output_format,
                &format!("Updated user {}", user_id),
                Some(json!({ "profile": profile })),
            )
        }
    }
}

fn print_profile(profile: &Value, output_format: &OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(profile),
        OutputFormat::Text => {
            let profile: UserProfile = serde_json::from_value(profile.clone())?;
            println!("User:    {}", profile.id);
            println!("Email:   {}", profile.email);
            println!("Name:    {}", profile.display_name());
            println!("Created: {}", profile.created_at.to_rfc3339());
            if let Some(updated_at) = profile.updated_at {
                println!("Updated: {}", updated_at.to_rfc3339());
            }
            Ok(())
        }
    }
}
