pub mod connectors;
pub mod outcome;

pub use connectors::PriceFetcher;
pub use connectors::coingecko::CoinGeckoFetcher;
pub use outcome::{OutcomeKind, PayloadFault, PollOutcome};
