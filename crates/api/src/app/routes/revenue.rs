use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use revdesk_auth::{RoleLevel, TokenService};
use revdesk_core::RecordId;
use revdesk_reporting::{ListParams, OwnerSummary, Page, RawListQuery, RevenueDraft, RevenueView};

use crate::app::errors::{ApiResult, Payload};
use crate::app::services::AppServices;
use crate::context::CallerContext;
use crate::middleware::guarded;

pub fn router(tokens: &Arc<TokenService>) -> Router {
    Router::new()
        .route(
            "/",
            guarded(tokens, RoleLevel::USER, post(create_record))
                .merge(guarded(tokens, RoleLevel::MARKETER, get(list_records))),
        )
        .route(
            "/summary",
            guarded(tokens, RoleLevel::FINANCE, get(summary)),
        )
        .route(
            "/user/revenue",
            guarded(tokens, RoleLevel::USER, get(own_records)),
        )
        .route(
            "/:id",
            guarded(
                tokens,
                RoleLevel::MARKETER,
                get(get_record).put(update_record).delete(delete_record),
            ),
        )
}

pub async fn create_record(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Payload(body): Payload<RevenueDraft>,
) -> ApiResult<impl IntoResponse> {
    let view = services.create_revenue(&caller, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_record(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Path(id): Path<String>,
) -> ApiResult<Json<RevenueView>> {
    let id: RecordId = id.parse()?;
    Ok(Json(services.get_revenue(&caller, id)?))
}

pub async fn update_record(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Path(id): Path<String>,
    Payload(body): Payload<RevenueDraft>,
) -> ApiResult<Json<RevenueView>> {
    let id: RecordId = id.parse()?;
    Ok(Json(services.update_revenue(&caller, id, body, Utc::now())?))
}

pub async fn delete_record(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: RecordId = id.parse()?;
    services.delete_revenue(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_records(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<RawListQuery>,
) -> ApiResult<Json<Page<RevenueView>>> {
    let params = ListParams::from_raw(&query)?;
    Ok(Json(services.list_revenue(&params)?))
}

pub async fn own_records(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Query(query): Query<RawListQuery>,
) -> ApiResult<Json<Page<RevenueView>>> {
    let params = ListParams::from_raw(&query)?;
    Ok(Json(services.own_revenue(&caller, params)?))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<RawListQuery>,
) -> ApiResult<Json<Page<OwnerSummary>>> {
    let params = ListParams::from_raw(&query)?;
    Ok(Json(services.revenue_summary(&params)?))
}
