use actix_web::{HttpRequest, HttpResponse, Responder};

/// Liveness check, mounted by every service
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok()
}
