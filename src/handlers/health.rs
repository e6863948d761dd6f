use actix_web::{HttpResponse, web};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::store::AccountStore;

#[derive(Debug, Serialize)]
pub struct Services {
    pub dashboard: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Healthy {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub services: Services,
}

#[derive(Debug, Serialize)]
pub struct Unhealthy {
    pub status: &'static str,
    pub error: String,
    pub timestamp: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// GET /health: 200 while the store answers, 503 otherwise.
pub async fn health(store: web::Data<dyn AccountStore>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(Healthy {
            status: "healthy",
            timestamp: now(),
            version: env!("CARGO_PKG_VERSION"),
            services: Services {
                dashboard: "running",
                database: "connected",
            },
        }),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(Unhealthy {
                status: "unhealthy",
                error: e.to_string(),
                timestamp: now(),
            })
        }
    }
}
