use vidlink::common::{AnyResult, logger};
use vidlink::configs::Config;
use vidlink::server;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Falling back to default configuration: {}", e);
        Config::default()
    });

    logger::init(&config);

    server::serve(config).await?;

    Ok(())
}
