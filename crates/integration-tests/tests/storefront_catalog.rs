//! Integration tests for catalog browsing and health endpoints.
//!
//! These tests require a running storefront (cargo run -p servicecart-storefront).
//!
//! Run with: cargo test -p servicecart-integration-tests -- --ignored

use reqwest::StatusCode;

use servicecart_integration_tests::{Fixture, browser, storefront_base_url, store};

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_health_endpoints() {
    let client = browser();
    let base_url = storefront_base_url();

    for path in ["/health", "/health/ready"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to reach storefront");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_index_lists_classes_and_services() {
    let store = store().await;
    let fixture = Fixture::create(&store).await;
    let base_url = storefront_base_url();

    let resp = browser()
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to load index");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains(&fixture.class.name));
    assert!(body.contains(&fixture.service_path()));

    let resp = browser()
        .get(format!("{base_url}/services/{}/", fixture.class.slug))
        .send()
        .await
        .expect("Failed to load class page");
    assert_eq!(resp.status(), StatusCode::OK);

    fixture.cleanup(&store).await;
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_unknown_slugs_are_not_found() {
    let store = store().await;
    let fixture = Fixture::create(&store).await;
    let client = browser();
    let base_url = storefront_base_url();

    for path in [
        "/services/no-such-class/".to_string(),
        format!("/services/{}/no-such-service/", fixture.class.slug),
        format!("/services/no-such-class/{}/", fixture.service.slug),
    ] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to reach storefront");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }

    fixture.cleanup(&store).await;
}
