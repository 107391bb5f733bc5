use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use evlog::meta;

use crate::db::store::MeetingStore;
use crate::event::BotInvocation;
use crate::handler::BotHandler;
use crate::runtime::get_logger;

pub fn build_router<S: MeetingStore + 'static>(handler: Arc<BotHandler<S>>) -> Router {
    Router::new()
        .route("/", get(probe::<S>).post(invoke::<S>))
        .with_state(handler)
}

async fn probe<S: MeetingStore + 'static>(State(handler): State<Arc<BotHandler<S>>>) -> String {
    handler.config().handle.clone()
}

async fn invoke<S: MeetingStore + 'static>(State(handler): State<Arc<BotHandler<S>>>, body: String) -> Response {
    let event = match BotInvocation::parse(&body).and_then(BotInvocation::classify) {
        Ok(v) => v,
        Err(e) => {
            get_logger().info("Rejected invocation payload.", meta! {
                "Error" => e,
            });
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match handler.handle(event, Local::now().date_naive()).await {
        Ok(Some(reply)) => Json(reply).into_response(),
        Ok(None) => String::new().into_response(),
        Err(e) => {
            get_logger().error("Error occurred in invocation handler.", meta! {
                "Error" => e,
            });
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
