use super::{CmrClient, CmrCollection, CmrError, CmrGranule, CmrParams, GranuleSearch};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const CMR_HITS_HEADER: &str = "CMR-Hits";

#[derive(Deserialize)]
struct Feed<T> {
    feed: Entries<T>,
}

#[derive(Deserialize)]
struct Entries<T> {
    #[serde(default = "Vec::new")]
    entry: Vec<T>,
}

/// CMR search over HTTP, JSON response format.
#[derive(Clone)]
pub struct HttpCmrClient {
    client: Client,
    base_url: String,
    client_id: String,
}

impl HttpCmrClient {
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.cmr_url, &config.cmr_client_id)
    }

    fn search_url(&self, concept: &str) -> String {
        format!("{}/search/{}.json", self.base_url, concept)
    }

    async fn get(&self, url: &str, params: &CmrParams) -> Result<Response, CmrError> {
        debug!(url, ?params, "CMR search");
        let response = self
            .client
            .get(url)
            .header("Client-Id", &self.client_id)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmrError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

async fn read_entries<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, CmrError> {
    let bytes = response.bytes().await?;
    let feed: Feed<T> =
        serde_json::from_slice(&bytes).map_err(|e| CmrError::Decode(e.to_string()))?;
    Ok(feed.feed.entry)
}

fn read_hits(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CMR_HITS_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl CmrClient for HttpCmrClient {
    async fn find_granules(&self, params: &CmrParams) -> Result<GranuleSearch, CmrError> {
        let response = self.get(&self.search_url("granules"), params).await?;
        let hits = read_hits(&response);
        let granules: Vec<CmrGranule> = read_entries(response).await?;
        debug!(returned = granules.len(), ?hits, "CMR granules received");
        Ok(GranuleSearch { granules, hits })
    }

    async fn find_collections(&self) -> Result<Vec<CmrCollection>, CmrError> {
        let response = self
            .get(&self.search_url("collections"), &CmrParams::new())
            .await?;
        let collections: Vec<CmrCollection> = read_entries(response).await?;
        debug!(returned = collections.len(), "CMR collections received");
        Ok(collections)
    }
}
