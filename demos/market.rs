//! End-to-end demo: an importer runs a short auction, two wholesalers bid,
//! the background sweeper settles it.
//!
//! Run with: cargo run --example market

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use negoce::category::{Actor, Category};
use negoce::notify::MemorySink;
use negoce::offer::{OfferDraft, OfferType, TimeStamp};
use negoce::response::ResponseType;
use negoce::service::MarketService;
use negoce::sweeper::{self, SweeperConfig};
use negoce::utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let dir = tempfile::tempdir()?;
    let db = Arc::new(sled::open(dir.path().join("market.db"))?);
    let sink = Arc::new(MemorySink::new());
    let service = Arc::new(MarketService::new(db, sink.clone())?);

    let seller = Actor::new(utils::new_user_id()?, Category::Importateur);
    let alice = Actor::new(utils::new_user_id()?, Category::Grossiste);
    let bob = Actor::new(utils::new_user_id()?, Category::Grossiste);

    // an auction that ends almost immediately so the sweeper has work
    let now = TimeStamp::new();
    let offer = service.create_offer(
        &seller,
        OfferDraft::new()
            .set_title("Container of ceramic tiles")
            .set_description("First grade, 20ft container")
            .set_base_price(3_000)
            .set_min_quantity(100)
            .set_available_quantity(2_000)
            .set_offer_type(OfferType::Auction)
            .set_auction_window(now.clone(), now.offset(ChronoDuration::seconds(2))),
    )?;

    service.submit_response(&alice, &offer.id, ResponseType::Bid, 3_100, 500, None)?;
    service.submit_response(&bob, &offer.id, ResponseType::Bid, 3_250, 400, None)?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper = tokio::spawn(sweeper::run_sweeper(
        service.clone(),
        SweeperConfig {
            period: Duration::from_millis(500),
        },
        shutdown_rx,
    ));

    tokio::time::sleep(Duration::from_secs(3)).await;
    shutdown_tx.send(true)?;
    sweeper.await?;

    let settled = service.get_offer(&offer.id)?;
    println!(
        "offer {} is now {:?}, won by {:?} at {:?}",
        settled.id, settled.status, settled.current_bidder, settled.current_bid
    );
    for n in sink.take() {
        println!("notification to {:?}: {}", n.recipient, n.title);
    }

    Ok(())
}
