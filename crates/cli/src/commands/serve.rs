//! `loupe serve`: start the HTTP gateway.

use loupe_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Loupe agent backend");
    println!("   Listening:   http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:       {}", config.model);
    println!("   CORS origin: {}", config.gateway.cors_origin);

    loupe_gateway::start(config).await?;

    Ok(())
}
