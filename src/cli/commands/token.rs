use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

pub fn handle(
    user_id: &str,
    email: Option<String>,
    hours: Option<u64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let security = &config::config().security;
    let user_id = user_id.trim();
    if user_id.is_empty() {
        anyhow::bail!("user id is required");
    }

    let claims = Claims::new(user_id, email, hours.unwrap_or(security.jwt_expiry_hours));
    let token = generate_jwt(&claims, security)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for {}", user_id),
            Some(json!({ "token": token, "expires_at": claims.exp })),
        ),
        // Bare token so `export GOALPOST_TOKEN=$(goalpost token u1)` works
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
