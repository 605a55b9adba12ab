use crate::common::error::ApiError;
use crate::config::Config;
use axum::http::{HeaderMap, Uri, header};
use reqwest::Url;

/// Public addressing of the current request, used to build absolute links.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestContext {
    /// Scheme and host, e.g. `https://cmr.earthdata.nasa.gov`.
    pub origin: String,
    /// Configured API base path, `""` or `/something`.
    pub base_path: String,
    /// Path and query of the request as received.
    pub path_and_query: String,
}

impl RequestContext {
    pub fn from_request(headers: &HeaderMap, uri: &Uri, config: &Config) -> Self {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        RequestContext {
            origin: get_origin(headers),
            base_path: config.api_base_path.clone(),
            path_and_query,
        }
    }

    /// Root of the service, without the `/stac` segment.
    pub fn app_base_url(&self) -> String {
        format!("{}{}", self.origin, self.base_path)
    }

    pub fn stac_base_url(&self) -> String {
        format!("{}/stac", self.app_base_url())
    }

    pub fn request_url(&self) -> String {
        format!("{}{}", self.origin, self.path_and_query)
    }
}

pub fn get_stac_base_url(ctx: &RequestContext) -> String {
    ctx.stac_base_url()
}

/// Absolute URL for `path` relative to the service root.
pub fn create_redirect_url(ctx: &RequestContext, path: &str) -> String {
    format!("{}{}", ctx.app_base_url(), path)
}

/// Absolute URL of a collection, with the id percent-encoded as one path segment.
pub fn create_collection_url(ctx: &RequestContext, collection_id: &str) -> Result<String, ApiError> {
    let mut url = Url::parse(&create_redirect_url(ctx, "/collections"))
        .map_err(|e| ApiError::Internal(format!("invalid service URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Internal("service URL cannot carry a path".to_string()))?
        .push(collection_id);
    Ok(url.to_string())
}

fn get_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost:3000");

    let forwarded_proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|p| *p == "http" || *p == "https");

    let scheme = match forwarded_proto {
        Some(proto) => proto,
        None if host.contains("localhost") || host.starts_with("127.0.0.1") => "http",
        None => "https",
    };
    format!("{}://{}", scheme, host)
}
