//! Collection client binary: terminal rendering of the home and mint views.

use clap::{Parser, Subcommand};
use collection_client::metrics::METRICS;
use collection_client::{ClientConfig, CollectionClient, Config, JsonRpcProvider, MintPhase, View};
use collection_types::{
    explorer_tx_url, group_thousands, mint_button_label, progress_percent, short_address,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about = "Read collection stats and mint through a wallet provider", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collection overview: minted, max supply, price, progress.
    Home,
    /// Connect the wallet and mint.
    Mint {
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::load("collection-client", "COLLECTION")?;
    let client_config = config.client_config()?;
    let provider = JsonRpcProvider::from_config(&config)?;

    info!(
        contract = %client_config.contract_address,
        rpc = %provider.active_url(),
        "Configuration loaded"
    );

    let outcome = match args.command {
        Command::Home => home(client_config, provider).await,
        Command::Mint { quantity } => mint(client_config, provider, quantity).await,
    };

    debug!(metrics = %METRICS.render(), "Session metrics");
    outcome
}

async fn home(config: ClientConfig, provider: JsonRpcProvider) -> anyhow::Result<()> {
    let mut client = CollectionClient::new(config, View::Home, Some(provider));
    client.load().await;

    let c = client.collection();
    println!("Minted       {}", group_thousands(c.total_supply));
    println!("Max supply   {}", group_thousands(c.max_supply));
    println!("Mint price   {} ETH", client.mint_price_display());
    println!(
        "Progress     {:.1}% ({} remaining)",
        progress_percent(c.total_supply, c.max_supply),
        group_thousands(c.remaining_supply)
    );
    if let Some(available) = client.minting_available().await {
        println!("Minting      {}", if available { "open" } else { "closed" });
    }
    Ok(())
}

async fn mint(config: ClientConfig, provider: JsonRpcProvider, quantity: u32) -> anyhow::Result<()> {
    let explorer_url = config.explorer_url.clone();
    let mut client = CollectionClient::new(config, View::Mint, Some(provider));
    client.load().await;

    if !client.wallet().connected {
        client.connect_wallet().await?;
    }
    if let Some(account) = client.wallet().account {
        println!("Connected wallet  {}", short_address(&account));
    }

    let c = client.collection();
    println!(
        "Minted {} • {} remaining • {} ETH each",
        group_thousands(c.total_supply),
        group_thousands(c.remaining_supply),
        client.mint_price_display()
    );

    if client.is_sold_out() {
        anyhow::bail!("Sold Out");
    }
    if !client.set_quantity(quantity) {
        anyhow::bail!("quantity must be between 1 and {}", client.max_quantity());
    }
    let plural = if quantity > 1 { "s" } else { "" };
    println!(
        "Total cost  {} ETH ({quantity} NFT{plural} × {} ETH)",
        client.total_cost_display(),
        client.mint_price_display()
    );

    // `mint()` holds the client; progress is rendered from the phase channel.
    let remaining = client.collection().remaining_supply;
    let mut phases = client.subscribe();
    let watcher = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = phases.borrow_and_update().clone();
            match phase {
                MintPhase::AwaitingSignature => {
                    println!("{}", mint_button_label(quantity, remaining, phase.is_pending()));
                    println!("Waiting for wallet signature...");
                }
                MintPhase::AwaitingConfirmation { tx_hash } => {
                    println!("Transaction submitted! {}", explorer_tx_url(&explorer_url, &tx_hash))
                }
                _ => {}
            }
        }
    });

    println!("{}", client.mint_button_label());
    let result = client.mint().await;
    match &result {
        Ok(_) => {
            let c = client.collection();
            println!(
                "Minted {quantity} NFT{plural}. Collection now at {} / {}",
                group_thousands(c.total_supply),
                group_thousands(c.max_supply)
            );
        }
        Err(err) => {
            eprintln!("{err}");
            if let Some(link) = client.explorer_link() {
                eprintln!("Transaction: {link}");
            }
        }
    }

    // Closing the sender ends the watcher.
    drop(client);
    if let Err(e) = watcher.await {
        debug!(error = %e, "Phase watcher ended abnormally");
    }
    result.map(|_| ()).map_err(Into::into)
}
