//! serve command - run the webhook

use anyhow::Result;
use objstamp_api::WebhookServer;
use objstamp_core::config::ObjstampConfig;
use tracing::info;

pub async fn execute(config: ObjstampConfig) -> Result<()> {
    info!("Starting Objstamp {}...", objstamp_core::VERSION);
    info!("Object store endpoint: {}", config.storage.endpoint);

    WebhookServer::new(config).run().await?;

    Ok(())
}
