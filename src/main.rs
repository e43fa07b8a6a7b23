use goalpost_api::{config, is_production, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    server::init_tracing();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();

    if is_production!() && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }

    server::serve(config).await
}
