//! Local marketplace postings.

use crate::config::StoreConfig;
use crate::error::FetchError;
use crate::resource::{DataSource, FixtureSource, Record, ResourceStore};
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Produce,
    Fitness,
    Services,
    Household,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    pub title: String,
    pub price_cents: u64,
    pub category: Category,
    pub seller: String,
    pub location: String,
}

impl Record for Posting {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

impl Posting {
    /// Price formatted for display; zero reads as `Free`.
    pub fn display_price(&self) -> String {
        if self.price_cents == 0 {
            return "Free".to_owned();
        }
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// Fetch options for the market store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketQuery {
    /// Only postings in this category; all postings when `None`.
    pub category: Option<Category>,
}

impl MarketQuery {
    /// Postings of one category only.
    pub const fn category(category: Category) -> Self {
        Self { category: Some(category) }
    }
}

/// Fixture-backed postings feed that honors [`MarketQuery`].
#[derive(Debug, Clone)]
pub struct MarketSource {
    fixture: FixtureSource<Posting>,
}

impl MarketSource {
    /// Wrap a fixture holding every posting.
    pub fn new(fixture: FixtureSource<Posting>) -> Self {
        Self { fixture }
    }

    /// Handle to the underlying fixture, for re-scripting.
    pub const fn fixture(&self) -> &FixtureSource<Posting> {
        &self.fixture
    }
}

impl DataSource for MarketSource {
    type Record = Posting;
    type Query = MarketQuery;

    fn fetch(
        &self,
        query: MarketQuery,
    ) -> impl Future<Output = Result<Vec<Posting>, FetchError>> + Send {
        let all = self.fixture.fetch(());
        async move {
            let mut postings = all.await?;
            if let Some(category) = query.category {
                postings.retain(|posting| posting.category == category);
            }
            Ok(postings)
        }
    }
}

fn posting(
    id: &str,
    title: &str,
    price_cents: u64,
    category: Category,
    seller: &str,
    location: &str,
) -> Posting {
    Posting {
        id: id.to_owned(),
        title: title.to_owned(),
        price_cents,
        category,
        seller: seller.to_owned(),
        location: location.to_owned(),
    }
}

/// Sample data served by the fixture source.
pub fn fixtures() -> Vec<Posting> {
    vec![
        posting("p-1", "Organic kale bunch", 350, Category::Produce, "Green Row Farm", "Eastside"),
        posting("p-2", "Kettlebell 16 kg", 4500, Category::Fitness, "Sam", "Riverside"),
        posting("p-3", "Yoga mat, barely used", 1200, Category::Fitness, "Priya", "Old town"),
        posting("p-4", "Meal prep for the week", 6000, Category::Services, "Chef Lou", "Delivery"),
        posting("p-5", "Herb seedlings", 0, Category::Produce, "Community garden", "North park"),
        posting("p-6", "Water filter pitcher", 2199, Category::Household, "Dana", "Midtown"),
    ]
}

pub type MarketStore = ResourceStore<MarketSource>;

/// Market store backed by the fixture data.
pub fn market_store(config: &StoreConfig) -> MarketStore {
    let fixture = FixtureSource::new(fixtures()).with_latency(config.fixture_latency());
    ResourceStore::builder(MarketSource::new(fixture))
        .name("market")
        .config(config)
        .build()
}
