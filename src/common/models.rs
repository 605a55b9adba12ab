use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Serialize)]
pub struct HealthCheck {
    pub status: String,
}

/// Error body of the generic error channel.
#[derive(ToSchema, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}
