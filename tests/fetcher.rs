use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use price_poller::config::PollerConfig;
use price_poller::price_infra::{CoinGeckoFetcher, PayloadFault, PollOutcome, PriceFetcher};
use price_poller::types::observation::Observation;
use price_poller::types::price::Price;
use price_poller::types::timestamp::Timestamp;

const PRICE_PATH: &str = "/api/v3/simple/price";

fn config_for(server: &MockServer) -> PollerConfig {
    PollerConfig {
        endpoint: format!(
            "{}{}?ids=bitcoin&vs_currencies=usd&include_last_updated_at=true",
            server.uri(),
            PRICE_PATH
        ),
        request_timeout_secs: 1,
        ..PollerConfig::default()
    }
}

async fn fetch_with(response: ResponseTemplate) -> PollOutcome {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRICE_PATH))
        .respond_with(response)
        .mount(&server)
        .await;

    let fetcher = CoinGeckoFetcher::new(&config_for(&server)).unwrap();
    fetcher.fetch().await
}

#[tokio::test]
async fn well_formed_response_is_success() {
    let outcome = fetch_with(
        ResponseTemplate::new(200)
            .set_body_json(json!({"bitcoin": {"usd": 50001.496, "last_updated_at": 1_700_000_015}})),
    )
    .await;

    assert_eq!(
        outcome,
        PollOutcome::Success(Observation::new(
            Timestamp::from_epoch_secs(1_700_000_015),
            Price::from_f64(50001.50).unwrap(),
        ))
    );
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let outcome = fetch_with(ResponseTemplate::new(429)).await;
    assert_eq!(outcome, PollOutcome::RateLimited);
}

#[tokio::test]
async fn server_errors_are_classified_with_status() {
    assert_eq!(
        fetch_with(ResponseTemplate::new(503)).await,
        PollOutcome::ServerError { status: 503 }
    );
    assert_eq!(
        fetch_with(ResponseTemplate::new(500)).await,
        PollOutcome::ServerError { status: 500 }
    );
}

#[tokio::test]
async fn other_statuses_are_malformed() {
    assert_eq!(
        fetch_with(ResponseTemplate::new(404)).await,
        PollOutcome::MalformedPayload(PayloadFault::UnexpectedStatus(404))
    );
    assert_eq!(
        fetch_with(ResponseTemplate::new(201).set_body_json(json!({}))).await,
        PollOutcome::MalformedPayload(PayloadFault::UnexpectedStatus(201))
    );
}

#[tokio::test]
async fn missing_price_field_is_retryable_malformed() {
    let outcome = fetch_with(
        ResponseTemplate::new(200).set_body_json(json!({"bitcoin": {"last_updated_at": 1}})),
    )
    .await;

    assert_eq!(outcome, PollOutcome::MalformedPayload(PayloadFault::MissingField("usd".into())));
    assert!(outcome.fatal_fault().is_none());
}

#[tokio::test]
async fn html_body_is_fatal_malformed() {
    let outcome = fetch_with(
        ResponseTemplate::new(200).set_body_string("<html><body>Down for maintenance</body></html>"),
    )
    .await;

    assert!(outcome.fatal_fault().is_some());
}

#[tokio::test]
async fn slow_response_times_out_as_transport_error() {
    let outcome = fetch_with(
        ResponseTemplate::new(200)
            .set_body_json(json!({"bitcoin": {"usd": 1.0, "last_updated_at": 1}}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    assert!(matches!(outcome, PollOutcome::TransportError(_)), "got {:?}", outcome);
}

#[tokio::test]
async fn redirect_loop_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let config = PollerConfig {
        endpoint: format!("{}/loop", server.uri()),
        ..PollerConfig::default()
    };
    let outcome = CoinGeckoFetcher::new(&config).unwrap().fetch().await;

    assert!(matches!(outcome, PollOutcome::TransportError(_)), "got {:?}", outcome);
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = PollerConfig {
        endpoint: format!("http://127.0.0.1:{}{}", port, PRICE_PATH),
        ..PollerConfig::default()
    };

    let outcome = CoinGeckoFetcher::new(&config).unwrap().fetch().await;

    assert!(matches!(outcome, PollOutcome::TransportError(_)), "got {:?}", outcome);
}
