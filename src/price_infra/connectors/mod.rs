pub mod coingecko;

use async_trait::async_trait;
use crate::price_infra::outcome::PollOutcome;

/// One HTTP request per call, no internal retries. Every failure is
/// classified into a [`PollOutcome`] rather than returned as an error, so
/// all retry policy stays with the caller.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch(&self) -> PollOutcome;
    fn source_id(&self) -> &str;
}
