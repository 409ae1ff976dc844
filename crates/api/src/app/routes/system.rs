use axum::{Json, http::StatusCode};

use crate::app::dto::WhoAmI;
use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(CallerContext(caller): CallerContext) -> Json<WhoAmI> {
    Json(caller.into())
}
