//! Access to the Common Metadata Repository (CMR).
//!
//! Handlers only talk to the [`CmrClient`] trait so that tests can swap the
//! HTTP implementation for canned records.

pub mod client;
pub mod params;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use client::HttpCmrClient;
pub use params::{
    CmrParams, ConversionMap, ParamError, STAC_QUERY_PARAMS_CONVERSION_MAP,
    STAC_SEARCH_PARAMS_CONVERSION_MAP, convert_params, to_cmr_params,
};

#[derive(Debug, Error)]
pub enum CmrError {
    #[error("CMR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("CMR responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode CMR response: {0}")]
    Decode(String),
}

/// A link attached to a CMR granule record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmrLink {
    pub href: String,
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub inherited: Option<bool>,
}

/// Granule entry as returned by `search/granules.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmrGranule {
    pub id: String,
    #[serde(default)]
    pub collection_concept_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub data_center: Option<String>,
    #[serde(default)]
    pub boxes: Vec<String>,
    #[serde(default)]
    pub polygons: Vec<Vec<String>>,
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub links: Vec<CmrLink>,
    #[serde(default)]
    pub browse_flag: Option<bool>,
    #[serde(default)]
    pub online_access_flag: Option<bool>,
}

/// Collection entry as returned by `search/collections.json`.
///
/// `href` is kept untyped: CMR entries may omit it or carry something other
/// than a string, and link classification has to tell those cases apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmrCollection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub href: Option<Value>,
}

/// One page of granule results.
#[derive(Debug, Clone, Default)]
pub struct GranuleSearch {
    pub granules: Vec<CmrGranule>,
    /// Total number of matches reported in the `CMR-Hits` header.
    pub hits: Option<u64>,
}

#[async_trait]
pub trait CmrClient: Send + Sync {
    async fn find_granules(&self, params: &CmrParams) -> Result<GranuleSearch, CmrError>;

    async fn find_collections(&self) -> Result<Vec<CmrCollection>, CmrError>;
}
