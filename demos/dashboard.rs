//! Home dashboard wiring: a registry of stores, a session gate, and a view
//! that re-renders on every store transition.

use pantry::domain::{market_store, metrics_store, Category, MarketQuery, MarketStore, MetricsStore};
use pantry::{Access, MemoryKv, SessionStore, Status, StoreConfig, StoreRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "pantry=debug".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = StoreConfig::from_json(r#"{ "fixture_latency_ms": 300 }"#)?;
    let registry = StoreRegistry::new();
    registry.insert(metrics_store(&config));
    registry.insert(market_store(&config));
    registry.insert(SessionStore::new());

    let kv = MemoryKv::new();
    let session = registry.require::<SessionStore>()?;
    session.hydrate(&kv).await?;
    if session.access() == Access::Denied {
        session.sign_in(&kv, 1001).await?;
    }

    let metrics = registry.require::<MetricsStore>()?;
    let _render = metrics.subscribe(|state| match state.status() {
        Status::Idle => {}
        Status::Loading => println!("[metrics] loading ({} cached)", state.len()),
        Status::Success => {
            for metric in state.items() {
                println!("[metrics] {:<20} {}", metric.label, metric.display_value());
            }
        }
        Status::Error => println!("[metrics] {}", state.error_message().unwrap_or_default()),
    });
    metrics.fetch().await;

    let market = registry.require::<MarketStore>()?;
    market.fetch_with(MarketQuery::category(Category::Fitness)).await;
    for posting in market.state().items() {
        println!("[market] {} {} ({})", posting.title, posting.display_price(), posting.seller);
    }

    Ok(())
}
