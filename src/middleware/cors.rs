use axum::http::{header::InvalidHeaderValue, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// Credentialed CORS for exactly one browser origin.
///
/// Wildcard methods/headers are not allowed together with credentials, so the
/// preflight's requested methods and headers are mirrored back instead.
pub fn single_origin_cors(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
