use pride::{LogSender, PrideError, PrideServerBuilder, ServerConfig, StaticCredentials};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), PrideError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;
    let verifier = StaticCredentials::new(config.accounts.clone());

    let server = PrideServerBuilder::new()
        .config(config)
        .build(verifier, LogSender)
        .await?;

    server.run().await
}
