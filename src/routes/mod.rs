pub mod stac;

use crate::common::state::AppState;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(state: &AppState) -> Router {
    #[derive(OpenApi)]
    #[openapi(info(
        title = "CMR STAC API",
        description = "STAC search and catalog browsing on top of the Common Metadata Repository"
    ))]
    struct ApiDoc;

    let base_path = state.config.api_base_path.clone();

    let api_router = OpenApiRouter::new()
        .merge(crate::common::views::router(state))
        .merge(stac::views::router(state));

    let api_router = if base_path.is_empty() {
        OpenApiRouter::with_openapi(ApiDoc::openapi()).merge(api_router)
    } else {
        OpenApiRouter::with_openapi(ApiDoc::openapi()).nest(&base_path, api_router)
    };

    let (router, api) = api_router.split_for_parts();

    router
        .merge(Scalar::with_url("/api/docs", api))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
