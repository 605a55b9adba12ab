use crate::catalog::{
    CollectionLink, DEFAULT_CATALOG_TITLE, classify_collection, create_default_catalog,
    create_root_catalog,
};
use crate::cmr::{
    STAC_QUERY_PARAMS_CONVERSION_MAP, STAC_SEARCH_PARAMS_CONVERSION_MAP, convert_params,
    to_cmr_params,
};
use crate::common::context::{RequestContext, create_collection_url, get_stac_base_url};
use crate::common::error::ApiError;
use crate::common::models::ErrorBody;
use crate::common::state::AppState;
use crate::convert::{NextPage, Paging, cmr_granules_to_feature_collection};
use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Body returned when a produced document fails STAC validation.
pub const BAD_REQUEST_BODY: &str = "Bad Request";

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_search, post_search))
        .routes(routes!(get_root_catalog))
        .routes(routes!(get_catalog))
        .routes(routes!(redirect_collection))
        .with_state(state.clone())
}

/// 200 with the document when it is valid STAC, otherwise 400 "Bad Request".
fn validated_response(state: &AppState, document: Value) -> Response {
    let errors = state.validator.validation_errors(&document);
    if errors.is_empty() {
        (StatusCode::OK, Json(document)).into_response()
    } else {
        warn!(?errors, "Generated document is not valid STAC");
        (StatusCode::BAD_REQUEST, Json(json!(BAD_REQUEST_BODY))).into_response()
    }
}

/// Query pairs as search parameters. A repeated name collects its values
/// into an array, in request order.
fn query_to_params(query: &[(String, String)]) -> Map<String, Value> {
    let mut params = Map::new();
    for (name, value) in query {
        let value = Value::String(value.clone());
        match params.get_mut(name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(name.clone(), value);
            }
        }
    }
    params
}

fn read_u64(params: &Map<String, Value>, name: &str) -> Option<u64> {
    match params.get(name)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Shared search path: STAC parameters to CMR, CMR granules to STAC.
async fn search(
    state: &AppState,
    ctx: &RequestContext,
    params: Map<String, Value>,
    next: NextPage,
) -> Result<Value, ApiError> {
    let paging = Paging {
        limit: read_u64(&params, "limit").unwrap_or(state.config.default_limit),
        page: read_u64(&params, "page").unwrap_or(1),
        next,
    };

    let mut cmr_params = convert_params(STAC_SEARCH_PARAMS_CONVERSION_MAP, &params)?;
    cmr_params
        .entry("page_size")
        .or_insert_with(|| json!(paging.limit));

    let granules = state.cmr.find_granules(&to_cmr_params(&cmr_params)).await?;
    let item_collection =
        cmr_granules_to_feature_collection(ctx, &state.config.stac_version, granules, &paging)?;

    serde_json::to_value(item_collection).map_err(|e| ApiError::Internal(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/stac/search",
    params(
        ("limit" = Option<u64>, Query, description = "Number of items per page"),
        ("page" = Option<u64>, Query, description = "Page number, starting at 1"),
        ("bbox" = Option<String>, Query, description = "west,south,east,north"),
        ("time" = Option<String>, Query, description = "Single datetime or interval"),
        ("datetime" = Option<String>, Query, description = "Alias of time"),
        ("collectionId" = Option<String>, Query, description = "CMR collection concept id"),
        ("intersects" = Option<String>, Query, description = "GeoJSON polygon")
    ),
    responses(
        (status = 200, description = "STAC FeatureCollection"),
        (status = 400, description = "Invalid parameter or invalid STAC output"),
        (status = 502, description = "CMR request failed", body = ErrorBody)
    ),
    summary = "Search granules",
    description = "Converts STAC query parameters into a CMR granule search and returns the results as a STAC FeatureCollection."
)]
pub async fn get_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    info!("GET /stac/search");
    let ctx = RequestContext::from_request(&headers, &uri, &state.config);

    let params = convert_params(STAC_QUERY_PARAMS_CONVERSION_MAP, &query_to_params(&query))?;

    let result = search(&state, &ctx, params, NextPage::Query(query)).await?;
    Ok(validated_response(&state, result))
}

#[utoipa::path(
    post,
    path = "/stac/search",
    responses(
        (status = 200, description = "STAC FeatureCollection"),
        (status = 400, description = "Invalid parameter or invalid STAC output"),
        (status = 502, description = "CMR request failed", body = ErrorBody)
    ),
    summary = "Search granules with a JSON body",
    description = "Same as GET /stac/search with the STAC search parameters given as a JSON object."
)]
pub async fn post_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Json(body): Json<Map<String, Value>>,
) -> Result<Response, ApiError> {
    info!("POST /stac/search");
    let ctx = RequestContext::from_request(&headers, &uri, &state.config);

    let result = search(&state, &ctx, body.clone(), NextPage::Body(body)).await?;
    Ok(validated_response(&state, result))
}

#[utoipa::path(
    get,
    path = "/stac",
    responses(
        (status = 200, description = "Root STAC catalog")
    ),
    summary = "Root catalog",
    description = "Landing catalog with a single child link to the default catalog."
)]
pub async fn get_root_catalog(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Value>, ApiError> {
    info!("GET /stac - root catalog");
    let ctx = RequestContext::from_request(&headers, &uri, &state.config);

    let mut root_catalog =
        create_root_catalog(&get_stac_base_url(&ctx), &state.config.stac_version);
    root_catalog.add_child(DEFAULT_CATALOG_TITLE, "/default");

    let document = root_catalog
        .to_value()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    // Never gates the response, only reported
    let errors = state.validator.validation_errors(&document);
    if !errors.is_empty() {
        warn!(?errors, "Root catalog is not valid STAC");
    }
    Ok(Json(document))
}

#[utoipa::path(
    get,
    path = "/stac/{catalog_id}",
    params(
        ("catalog_id" = String, Path, description = "Catalog id, only `default` is published")
    ),
    responses(
        (status = 200, description = "Default catalog listing every CMR collection"),
        (status = 400, description = "Invalid STAC output"),
        (status = 502, description = "CMR request failed", body = ErrorBody)
    ),
    summary = "Catalog of collections"
)]
pub async fn get_catalog(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Path(catalog_id): Path<String>,
) -> Result<Response, ApiError> {
    info!(catalog_id = %catalog_id, "GET /stac/{{catalog_id}}");
    let ctx = RequestContext::from_request(&headers, &uri, &state.config);

    let collections = state.cmr.find_collections().await?;
    let mut catalog =
        create_default_catalog(&get_stac_base_url(&ctx), &state.config.stac_version);

    for collection in &collections {
        let path = format!("/{}", collection.id);
        if classify_collection(collection) == CollectionLink::ChildAndNext {
            catalog.add_next(&collection.title, &path);
        }
        catalog.add_child(&collection.title, &path);
    }

    let document = catalog
        .to_value()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(validated_response(&state, document))
}

#[utoipa::path(
    get,
    path = "/stac/{catalog_id}/{collection_id}",
    params(
        ("catalog_id" = String, Path, description = "Catalog id, ignored"),
        ("collection_id" = String, Path, description = "CMR collection concept id")
    ),
    responses(
        (status = 302, description = "Redirect to the collection")
    ),
    summary = "Collection redirect"
)]
pub async fn redirect_collection(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Path((_catalog_id, collection_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = RequestContext::from_request(&headers, &uri, &state.config);
    let location = create_collection_url(&ctx, &collection_id)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}
