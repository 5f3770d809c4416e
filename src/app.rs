use tracing::{error, info};

use crate::cli::{Args, Mode};
use crate::client::IagClient;
use crate::config::IagConfig;
use crate::error::Result;
use crate::model::InventoryDocument;
use crate::output;

/// Log in, fetch the devices and build the inventory.
pub async fn fetch_inventory(config: &IagConfig) -> Result<InventoryDocument> {
    let client = IagClient::new(config)?;
    let token = client.login(&config.credentials).await?;
    let devices = client.devices(&token).await?;

    let inventory = InventoryDocument::from_devices(&devices)?;
    info!(
        devices = devices.len(),
        hosts = inventory.hosts().len(),
        "Built inventory"
    );
    Ok(inventory)
}

/// Any failure, including bad configuration, yields the empty inventory.
/// The reason is logged to stderr; stdout only ever sees a valid document.
pub async fn load_inventory(config: Result<IagConfig>) -> InventoryDocument {
    let result = match config {
        Ok(config) => fetch_inventory(&config).await,
        Err(err) => Err(err),
    };

    result.unwrap_or_else(|err| {
        error!(%err, "Failed to build inventory from IAG");
        InventoryDocument::empty()
    })
}

/// Render what `args` asked for from an already built inventory.
pub fn render(args: &Args, inventory: &InventoryDocument) -> Result<String> {
    let format = args.format();
    match args.mode() {
        Mode::List => output::render(inventory, format),
        Mode::Host(host) => output::render(&inventory.host_vars(&host), format),
    }
}

pub async fn run(args: &Args, config: Result<IagConfig>) -> Result<String> {
    let inventory = load_inventory(config).await;
    render(args, &inventory)
}
