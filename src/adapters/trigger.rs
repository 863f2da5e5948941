use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};

use crate::app::{AppError, LoadOutcome};

pub trait JobRunner: Send + Sync + 'static {
    fn run_once(&self) -> Result<LoadOutcome, AppError>;
}

#[derive(Clone)]
pub struct TriggerState {
    pub runner: Arc<dyn JobRunner>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(receive_push);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Push delivery of the scheduled message. The envelope is not inspected.
#[post("/")]
async fn receive_push(
    state: web::Data<TriggerState>,
    request: HttpRequest,
    event: web::Bytes,
) -> impl Responder {
    tracing::debug!(
        event_bytes = event.len(),
        user_agent = request
            .headers()
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default(),
        "push trigger received"
    );

    let runner = Arc::clone(&state.runner);
    match web::block(move || runner.run_once()).await {
        Ok(Ok(outcome)) => {
            tracing::info!(inserted = outcome.is_inserted(), "invocation finished");
            HttpResponse::NoContent().finish()
        }
        Ok(Err(error)) => {
            tracing::error!(error = %error, "invocation aborted");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": error.to_string()
            }))
        }
        Err(error) => {
            tracing::error!(error = %error, "invocation could not be scheduled");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "invocation could not be scheduled"
            }))
        }
    }
}
