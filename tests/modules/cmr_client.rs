// HTTP CMR client against a mock CMR server

use cmr_stac_api::cmr::{CmrClient, CmrError, HttpCmrClient};
use mockito::{Matcher, Server};
use serde_json::json;

fn granule_feed() -> String {
    json!({
        "feed": {
            "updated": "2019-06-05T00:00:00.000Z",
            "id": "https://cmr.earthdata.nasa.gov/search/granules.json",
            "entry": [
                {
                    "id": "G1001-USGS_EROS",
                    "collection_concept_id": "C1379757686-USGS_EROS",
                    "title": "SC:G1001.001",
                    "time_start": "2019-06-01T00:00:00.000Z",
                    "boxes": ["-10 20 10 40"],
                    "links": []
                },
                {
                    "id": "G1002-USGS_EROS",
                    "collection_concept_id": "C1379757686-USGS_EROS",
                    "polygons": [["0 0 0 10 10 10 0 0"]]
                }
            ]
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_find_granules_reads_feed_and_hits() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search/granules.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("collection_concept_id".into(), "C1379757686-USGS_EROS".into()),
            Matcher::UrlEncoded("page_size".into(), "2".into()),
        ]))
        .match_header("client-id", "cmr-stac-api-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("CMR-Hits", "1234")
        .with_body(granule_feed())
        .create_async()
        .await;

    let client = HttpCmrClient::new(server.url(), "cmr-stac-api-test");
    let params = vec![
        (
            "collection_concept_id".to_string(),
            "C1379757686-USGS_EROS".to_string(),
        ),
        ("page_size".to_string(), "2".to_string()),
    ];
    let result = client.find_granules(&params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.granules.len(), 2);
    assert_eq!(result.granules[0].id, "G1001-USGS_EROS");
    assert_eq!(result.granules[1].polygons.len(), 1);
    assert_eq!(result.hits, Some(1234));
}

#[tokio::test]
async fn test_find_collections_reads_feed() {
    let mut server = Server::new_async().await;
    let body = json!({
        "feed": {
            "entry": [
                {"id": "C1-PROV", "title": "First", "href": "https://cmr/providers/PROV"},
                {"id": "C2-PROV", "title": "Second"}
            ]
        }
    });
    let mock = server
        .mock("GET", "/search/collections.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = HttpCmrClient::new(server.url(), "cmr-stac-api-test");
    let collections = client.find_collections().await.unwrap();

    mock.assert_async().await;
    assert_eq!(collections.len(), 2);
    assert_eq!(collections[0].href, Some(json!("https://cmr/providers/PROV")));
    assert!(collections[1].href.is_none());
}

#[tokio::test]
async fn test_empty_feed_has_no_entries() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/granules.json")
        .with_status(200)
        .with_body(r#"{"feed": {"entry": []}}"#)
        .create_async()
        .await;

    let client = HttpCmrClient::new(server.url(), "cmr-stac-api-test");
    let result = client.find_granules(&Vec::new()).await.unwrap();
    assert!(result.granules.is_empty());
    assert_eq!(result.hits, None);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/collections.json")
        .with_status(400)
        .with_body(r#"{"errors": ["Parameter [foo] was not recognized."]}"#)
        .create_async()
        .await;

    let client = HttpCmrClient::new(server.url(), "cmr-stac-api-test");
    let err = client.find_collections().await.unwrap_err();

    match err {
        CmrError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("not recognized"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/granules.json")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = HttpCmrClient::new(server.url(), "cmr-stac-api-test");
    let err = client.find_granules(&Vec::new()).await.unwrap_err();
    assert!(matches!(err, CmrError::Decode(_)));
}
