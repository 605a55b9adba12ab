// Collection redirect and base path handling

use crate::common::client::TestClient;
use crate::common::fake_cmr::FakeCmr;
use crate::common::fixtures::granules;
use crate::common::test_router::{build_test_router, build_test_router_with};
use axum::http::StatusCode;
use cmr_stac_api::config::Config;
use cmr_stac_api::validator::SchemaValidator;
use std::sync::Arc;

#[tokio::test]
async fn test_redirect_to_collection() {
    let client = TestClient::new(build_test_router(FakeCmr::with_collections(vec![])));

    let response = client.get("/stac/default/C1379757686-USGS_EROS").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        Some("http://localhost:3000/collections/C1379757686-USGS_EROS")
    );
}

#[tokio::test]
async fn test_redirect_ignores_catalog_id() {
    let client = TestClient::new(build_test_router(FakeCmr::with_collections(vec![])));

    for catalog_id in ["default", "PROV", "not-a-catalog"] {
        let response = client.get(&format!("/stac/{}/C2-PROV", catalog_id)).await;
        response.assert_status(StatusCode::FOUND);
        assert!(
            response
                .header("location")
                .unwrap()
                .ends_with("/collections/C2-PROV")
        );
    }
}

#[tokio::test]
async fn test_redirect_encodes_collection_id() {
    let client = TestClient::new(build_test_router(FakeCmr::with_collections(vec![])));

    let response = client.get("/stac/default/a%0Ab").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        Some("http://localhost:3000/collections/a%0Ab")
    );

    let response = client.get("/stac/default/C1%20PROV").await;
    assert_eq!(
        response.header("location"),
        Some("http://localhost:3000/collections/C1%20PROV")
    );
}

#[tokio::test]
async fn test_base_path_prefixes_routes_and_links() {
    let mut config = Config::for_tests();
    config.api_base_path = "/cmr-stac".to_string();
    let router = build_test_router_with(
        config,
        FakeCmr::with_granules(granules(1)),
        Arc::new(SchemaValidator::new().unwrap()),
    );
    let client = TestClient::new(router);

    let response = client.get("/cmr-stac/stac").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.links("child")[0]["href"],
        "http://localhost:3000/cmr-stac/stac/default"
    );

    let response = client.get("/cmr-stac/stac/default/C1-PROV").await;
    assert_eq!(
        response.header("location"),
        Some("http://localhost:3000/cmr-stac/collections/C1-PROV")
    );

    let response = client.get("/cmr-stac/stac/search?limit=1").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.links("self")[0]["href"],
        "http://localhost:3000/cmr-stac/stac/search?limit=1"
    );

    client.get("/stac").await.assert_status(StatusCode::NOT_FOUND);
}
