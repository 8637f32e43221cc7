//! Health check command

use crate::context::AppContext;
use crate::utils::health::HealthStatus;

/// Get service health.
///
/// # Example Response
/// ```json
/// {
///   "is_healthy": true,
///   "score": 1.0,
///   "message": null,
///   "components": [
///     { "name": "store", "is_healthy": true, "message": null },
///     { "name": "lemlist", "is_healthy": true, "message": null },
///     { "name": "stripe", "is_healthy": true, "message": null }
///   ],
///   "timestamp": 1698765432
/// }
/// ```
pub async fn get_app_health(ctx: &AppContext) -> HealthStatus {
    ctx.health_check().await
}
