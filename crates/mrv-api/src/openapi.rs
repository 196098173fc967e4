//! OpenAPI document assembly.
//!
//! Aggregates the `utoipa` path annotations from the route modules into a
//! single document served at `/openapi.json`. Credential bodies are
//! documented by description rather than schema; their wire format is
//! owned by `mrv-vc` and fixed independently of this surface.

use utoipa::OpenApi;

/// Top-level OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MRV Usage & Credential API",
        description = "Device energy usage data, per-device statistics, and \
            Ed25519 verifiable credential issuance. Data routes are keyed: \
            the first path segment must be the configured API key.",
    ),
    paths(
        crate::routes::usage::device_usage,
        crate::routes::usage::device_stats,
        crate::routes::usage::all_stats,
        crate::routes::usage::daily_mrv,
        crate::routes::credentials::issue_daily_credential,
        crate::routes::verify::verify_signature,
    ),
    components(schemas(
        crate::state::UsageRow,
        crate::state::UsageStats,
        crate::state::DeviceStats,
        crate::routes::verify::VerifyResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "usage", description = "Raw usage rows and statistics"),
        (name = "credentials", description = "Verifiable credential issuance"),
        (name = "verify", description = "Standalone signature verification"),
    )
)]
pub struct ApiDoc;
