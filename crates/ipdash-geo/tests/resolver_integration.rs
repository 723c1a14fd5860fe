//! Integration tests for GeoResolver failover against mock providers.

use ipdash_core::{Language, TransportContext};
use ipdash_geo::{GeoError, GeoResolver, Provider, NETWORK_ADVISORY};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn primary_success(ip: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "query": ip,
        "country": "United States",
        "countryCode": "US",
        "region": "CA",
        "regionName": "California",
        "city": "Mountain View",
        "zip": "94043",
        "lat": 37.4,
        "lon": -122.1,
        "timezone": "America/Los_Angeles",
        "isp": "Google LLC",
        "org": "Google Public DNS",
        "as": "AS15169 Google LLC",
        "mobile": false,
        "proxy": false,
        "hosting": true
    })
}

fn fallback_success(ip: &str) -> serde_json::Value {
    serde_json::json!({
        "ip": ip,
        "success": true,
        "country": "United States",
        "country_code": "US",
        "region": "California",
        "region_code": "CA",
        "city": "Mountain View",
        "latitude": 37.4,
        "longitude": -122.1,
        "postal": "94043",
        "timezone": {"id": "America/Los_Angeles"},
        "connection": {"asn": 15169, "org": "Google LLC", "isp": "Google LLC"}
    })
}

fn resolver(server: &MockServer, transport: TransportContext) -> GeoResolver {
    GeoResolver::new(
        &format!("{}/json/", server.uri()),
        &format!("{}/who/", server.uri()),
        transport,
    )
    .unwrap()
}

async fn requests_to(server: &MockServer, prefix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .count()
}

#[tokio::test]
async fn test_primary_success_is_returned_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/8.8.8.8"))
        .and(query_param("lang", "en"))
        .and(query_param("fields", ipdash_geo::schema::PRIMARY_FIELDS))
        .respond_with(ResponseTemplate::new(200).set_body_json(primary_success("8.8.8.8")))
        .mount(&server)
        .await;

    let rec = resolver(&server, TransportContext::Plain)
        .resolve_location("8.8.8.8", Language::English)
        .await
        .unwrap();

    assert_eq!(rec.query, "8.8.8.8");
    assert_eq!(rec.hosting, Some(true));
    assert_eq!(rec.source, Provider::Primary);
    assert_eq!(requests_to(&server, "/who/").await, 0);
}

#[tokio::test]
async fn test_empty_query_targets_own_address() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(primary_success("203.0.113.7")))
        .mount(&server)
        .await;

    let rec = resolver(&server, TransportContext::Plain)
        .resolve_location("", Language::English)
        .await
        .unwrap();

    assert_eq!(rec.query, "203.0.113.7");
}

#[tokio::test]
async fn test_secure_context_never_calls_primary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/who/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fallback_success("1.1.1.1")))
        .mount(&server)
        .await;

    let resolver = resolver(&server, TransportContext::Secure);
    for query in ["1.1.1.1", "1.1.1.1"] {
        let rec = resolver.resolve_location(query, Language::English).await.unwrap();
        assert_eq!(rec.source, Provider::Fallback);
    }

    assert_eq!(requests_to(&server, "/json/").await, 0);
    assert_eq!(requests_to(&server, "/who/").await, 2);
}

#[tokio::test]
async fn test_primary_fail_payload_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/8.8.4.4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "fail", "message": "quota exceeded"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/who/8.8.4.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fallback_success("8.8.4.4")))
        .mount(&server)
        .await;

    let resolver = resolver(&server, TransportContext::Plain);
    let via_failover = resolver
        .resolve_location("8.8.4.4", Language::English)
        .await
        .unwrap();

    // Same answer the fallback gives when the primary is skipped outright
    let direct = GeoResolver::new(
        &format!("{}/json/", server.uri()),
        &format!("{}/who/", server.uri()),
        TransportContext::Secure,
    )
    .unwrap()
    .resolve_location("8.8.4.4", Language::English)
    .await
    .unwrap();

    assert_eq!(via_failover, direct);
    assert_eq!(via_failover.asn, "AS15169 Google LLC");
    assert_eq!(via_failover.mobile, None);
}

#[tokio::test]
async fn test_primary_http_error_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/9.9.9.9"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/who/9.9.9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fallback_success("9.9.9.9")))
        .mount(&server)
        .await;

    let rec = resolver(&server, TransportContext::Plain)
        .resolve_location("9.9.9.9", Language::English)
        .await
        .unwrap();
    assert_eq!(rec.query, "9.9.9.9");
}

#[tokio::test]
async fn test_primary_garbage_body_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/9.9.9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/who/9.9.9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fallback_success("9.9.9.9")))
        .mount(&server)
        .await;

    let rec = resolver(&server, TransportContext::Plain)
        .resolve_location("9.9.9.9", Language::English)
        .await
        .unwrap();
    assert_eq!(rec.source, Provider::Fallback);
}

#[tokio::test]
async fn test_fallback_failure_is_terminal_with_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/who/not-an-ip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": false, "message": "invalid IP"})),
        )
        .mount(&server)
        .await;

    let err = resolver(&server, TransportContext::Secure)
        .resolve_location("not-an-ip", Language::English)
        .await
        .unwrap_err();

    assert!(matches!(err, GeoError::ProviderFailure(_)));
    assert_eq!(err.user_message(), "invalid IP");
}

#[tokio::test]
async fn test_fallback_http_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/who/1.2.3.4"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = resolver(&server, TransportContext::Secure)
        .resolve_location("1.2.3.4", Language::English)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Fallback IP API Error: Service Unavailable");
}

#[tokio::test]
async fn test_network_failure_on_both_attempts_yields_advisory() {
    // Reserve a free port, then release it so connections are refused
    let dead_uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let resolver = GeoResolver::new(
        &format!("{}/json/", dead_uri),
        &format!("{}/who/", dead_uri),
        TransportContext::Plain,
    )
    .unwrap();

    let err = resolver
        .resolve_location("8.8.8.8", Language::English)
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.user_message(), NETWORK_ADVISORY);
}

#[tokio::test]
async fn test_language_is_forwarded_to_both_providers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/1.1.1.1"))
        .and(query_param("lang", "zh-CN"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/who/1.1.1.1"))
        .and(query_param("lang", "zh-CN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fallback_success("1.1.1.1")))
        .mount(&server)
        .await;

    let rec = resolver(&server, TransportContext::Plain)
        .resolve_location("1.1.1.1", Language::ChineseSimplified)
        .await
        .unwrap();

    assert_eq!(rec.query, "1.1.1.1");
    assert_eq!(requests_to(&server, "/json/").await, 1);
}

#[tokio::test]
async fn test_repeated_lookup_is_idempotent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(primary_success("198.51.100.2")))
        .mount(&server)
        .await;

    let resolver = resolver(&server, TransportContext::Plain);
    let first = resolver.resolve_location("", Language::English).await.unwrap();
    let second = resolver.resolve_location("", Language::English).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_dot_segment_target_is_never_sent_as_own_address_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(primary_success("203.0.113.7")))
        .mount(&server)
        .await;

    let resolver = resolver(&server, TransportContext::Plain);
    for target in [".", ".."] {
        let err = resolver
            .resolve_location(target, Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, GeoError::UnroutableTarget(_)));
        assert!(err.user_message().contains(target));
    }

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_dotted_target_reaches_provider_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/..."))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "fail", "message": "invalid query"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/who/..."))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": false, "message": "Invalid IP address"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = resolver(&server, TransportContext::Plain)
        .resolve_location("...", Language::English)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid IP address");
}
