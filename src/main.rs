//! DermaScan Server binary: load configuration and serve.

use dermascan::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up .env before reading the environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    dermascan::start_server(config).await?;

    Ok(())
}
