use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header::ACCEPT, redirect::Policy};
use serde_json::Value;
use crate::config::PollerConfig;
use crate::error::{Error, Result};
use crate::price_infra::connectors::PriceFetcher;
use crate::price_infra::outcome::{PayloadFault, PollOutcome};
use crate::types::observation::Observation;
use crate::types::price::Price;
use crate::types::timestamp::Timestamp;

const LAST_UPDATED_FIELD: &str = "last_updated_at";
const MAX_REDIRECTS: usize = 5;
const PRICE_DECIMALS: u32 = 2;

/// Fetcher for the CoinGecko `simple/price` endpoint shape:
///
/// ```json
/// { "bitcoin": { "usd": 50000.0, "last_updated_at": 1700000000 } }
/// ```
pub struct CoinGeckoFetcher {
    source_id: String,
    client: Client,
    url: Url,
    asset_id: String,
    quote_currency: String,
}

impl CoinGeckoFetcher {
    pub fn new(config: &PollerConfig) -> Result<Self> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(CoinGeckoFetcher {
            source_id: "coingecko".to_string(),
            client,
            url,
            asset_id: config.asset_id.clone(),
            quote_currency: config.quote_currency.clone(),
        })
    }

    fn classify_status(status: StatusCode) -> Option<PollOutcome> {
        if status == StatusCode::TOO_MANY_REQUESTS {
            Some(PollOutcome::RateLimited)
        } else if status.as_u16() >= 500 {
            Some(PollOutcome::ServerError { status: status.as_u16() })
        } else if status != StatusCode::OK {
            Some(PollOutcome::MalformedPayload(PayloadFault::UnexpectedStatus(status.as_u16())))
        } else {
            None
        }
    }
}

#[async_trait]
impl PriceFetcher for CoinGeckoFetcher {
    async fn fetch(&self) -> PollOutcome {
        let response = match self.client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %self.url, "request failed: {}", e);
                return PollOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status();
        if let Some(outcome) = Self::classify_status(status) {
            tracing::debug!(status = status.as_u16(), "non-success status from {}", self.source_id);
            return outcome;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url = %self.url, "failed reading response body: {}", e);
                return PollOutcome::TransportError(e.to_string());
            }
        };

        match parse_payload(&body, &self.asset_id, &self.quote_currency) {
            Ok(observation) => PollOutcome::Success(observation),
            Err(fault) => PollOutcome::MalformedPayload(fault),
        }
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}

/// Extracts the price and last-updated time for one asset/currency pair.
pub fn parse_payload(
    body: &str,
    asset_id: &str,
    quote_currency: &str,
) -> std::result::Result<Observation, PayloadFault> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| PayloadFault::Unparseable(e.to_string()))?;

    let asset = data.get(asset_id)
        .filter(|v| v.is_object())
        .ok_or_else(|| PayloadFault::Unparseable(format!("no `{}` object in response", asset_id)))?;

    let price = asset.get(quote_currency)
        .ok_or_else(|| PayloadFault::MissingField(quote_currency.to_string()))?
        .as_f64()
        .ok_or_else(|| PayloadFault::NonNumeric(quote_currency.to_string()))?;

    let updated = asset.get(LAST_UPDATED_FIELD)
        .ok_or_else(|| PayloadFault::MissingField(LAST_UPDATED_FIELD.to_string()))
        .and_then(epoch_secs)?;

    if price < 0.0 {
        return Err(PayloadFault::InvalidPrice);
    }
    let value = Price::from_f64_rounded(price, PRICE_DECIMALS)
        .ok_or(PayloadFault::InvalidPrice)?;

    Ok(Observation::new(Timestamp::from_epoch_secs(updated), value))
}

/// Integer seconds, or a float with no fractional part (`1700000000.0`).
fn epoch_secs(value: &Value) -> std::result::Result<i64, PayloadFault> {
    let non_numeric = || PayloadFault::NonNumeric(LAST_UPDATED_FIELD.to_string());
    if let Some(secs) = value.as_i64() {
        return Ok(secs);
    }

    let secs = value.as_f64().ok_or_else(non_numeric)?;
    if secs.fract() == 0.0 && secs >= i64::MIN as f64 && secs < i64::MAX as f64 {
        Ok(secs as i64)
    } else {
        Err(non_numeric())
    }
}
