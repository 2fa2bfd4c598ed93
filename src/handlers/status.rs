use actix_web::{web, HttpResponse};

use crate::config::ConfigReport;

/// GET /config/status
///
/// Which credential mode is active and whether the required settings are
/// present.
#[utoipa::path(
    get,
    path = "/config/status",
    responses(
        (status = 200, description = "Configuration report", body = ConfigReport),
    ),
    tag = "operations"
)]
pub async fn config_status(report: web::Data<ConfigReport>) -> HttpResponse {
    HttpResponse::Ok().json(report.get_ref())
}
