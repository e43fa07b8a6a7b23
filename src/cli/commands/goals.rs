use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_empty_collection, output_json, output_success};
use crate::cli::{ApiClient, OutputFormat};
use crate::database::models::GoalStatus;

#[derive(Subcommand)]
pub enum GoalCommands {
    #[command(about = "List a user's goals")]
    List {
        #[arg(help = "User id")]
        user_id: String,
    },

    #[command(about = "Create a goal")]
    Add {
        #[arg(help = "User id")]
        user_id: String,
        #[arg(help = "Goal title")]
        title: String,
        #[arg(long, help = "Initial status: active, completed or expired")]
        status: Option<String>,
        #[arg(long, help = "Extra goal fields as a JSON object")]
        extra: Option<String>,
    },

    #[command(about = "Goal counts by status")]
    Summary {
        #[arg(help = "User id")]
        user_id: String,
    },
}

pub async fn handle(cmd: &GoalCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GoalCommands::List { user_id } => {
            let goals = client.list_goals(user_id).await?;
            if goals.is_empty() {
                return output_empty_collection(&output_format, "goals", &format!("No goals for {}", user_id));
            }

            match output_format {
                OutputFormat::Json => output_json(&goals),
                OutputFormat::Text => {
                    for goal in &goals {
                        let field = |key: &str| goal.get(key).and_then(Value::as_str).unwrap_or("-");
                        println!("{:<34} {:<10} {}", field("id"), field("status"), field("title"));
                    }
                    Ok(())
                }
            }
        }
        GoalCommands::Add { user_id, title, status, extra } => {
            let goal = build_goal(title, status.as_deref(), extra.as_deref())?;
            let created = client.post_goal(user_id, goal).await?;
            let id = created.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            output_success(
                &output_format,
                &format!("Created goal {}", id),
                Some(json!({ "goal": created })),
            )
        }
        GoalCommands::Summary { user_id } => {
            let summary = client.goal_summary(user_id).await?;
            match output_format {
                OutputFormat::Json => output_json(&summary),
                OutputFormat::Text => {
                    let count = |key: &str| summary["byStatus"][key].as_u64().unwrap_or(0);
                    println!("Total:     {}", summary["total"].as_u64().unwrap_or(0));
                    println!("Active:    {}", count("active"));
                    println!("Completed: {}", count("completed"));
                    println!("Expired:   {}", count("expired"));
                    Ok(())
                }
            }
        }
    }
}

/// Assemble the `goal` object from CLI arguments
fn build_goal(title: &str, status: Option<&str>, extra: Option<&str>) -> anyhow::Result<Value> {
    let mut goal = match extra {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            _ => anyhow::bail!("--extra must be a JSON object"),
        },
        None => serde_json::Map::new(),
    };

    goal.insert("title".into(), json!(title));
    if let Some(label) = status {
        let status = GoalStatus::from_label(label)
            .ok_or_else(|| anyhow::anyhow!("unknown status '{}'", label))?;
        goal.insert("status".into(), serde_json::to_value(status)?);
    }

    Ok(Value::Object(goal))
}
