use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::Utc;

use revdesk_auth::{AdminUpdate, IdentityView, ProfileUpdate, RoleLevel, TokenService};
use revdesk_core::{DomainError, DomainResult, UserId};

use crate::app::dto::{self, DataList};
use crate::app::errors::{ApiResult, Payload};
use crate::app::services::AppServices;
use crate::context::CallerContext;
use crate::middleware::guarded;

pub fn router(tokens: &Arc<TokenService>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(sign_in))
        .route(
            "/profile",
            guarded(tokens, RoleLevel::USER, get(profile).put(update_profile)),
        )
        .route("/all", guarded(tokens, RoleLevel::MARKETER, get(list_marketers)))
        .route(
            "/admin/create",
            guarded(tokens, RoleLevel::SUPER_ADMIN, post(admin_create)),
        )
        .route(
            "/admin/all",
            guarded(tokens, RoleLevel::SUPER_ADMIN, get(admin_list)),
        )
        .route(
            "/admin/:id",
            guarded(tokens, RoleLevel::SUPER_ADMIN, put(admin_update)),
        )
        .route(
            "/:id",
            guarded(tokens, RoleLevel::SUPER_ADMIN, delete(delete_user)),
        )
}

/// Run password hashing on the blocking pool so it does not stall the
/// async workers.
async fn off_runtime<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(work).await.map_err(|err| {
        tracing::error!(error = %err, "password task failed");
        DomainError::internal("internal error")
    })?;
    Ok(outcome?)
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<dto::RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = off_runtime(move || services.register(body, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<dto::SignInRequest>,
) -> ApiResult<Json<dto::SignInResponse>> {
    Ok(Json(off_runtime(move || services.sign_in(body, Utc::now())).await?))
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
) -> ApiResult<Json<IdentityView>> {
    Ok(Json(services.profile(&caller)?))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Payload(body): Payload<ProfileUpdate>,
) -> ApiResult<Json<IdentityView>> {
    Ok(Json(services.update_profile(&caller, body, Utc::now())?))
}

pub async fn list_marketers(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<DataList<IdentityView>>> {
    Ok(Json(DataList {
        data: services.list_marketers()?,
    }))
}

pub async fn admin_list(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<DataList<IdentityView>>> {
    Ok(Json(DataList {
        data: services.admin_list()?,
    }))
}

pub async fn admin_create(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Payload(body): Payload<dto::AdminCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = off_runtime(move || services.admin_create(&caller, body, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn admin_update(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Path(id): Path<String>,
    Payload(body): Payload<AdminUpdate>,
) -> ApiResult<Json<IdentityView>> {
    let target: UserId = id.parse()?;
    Ok(Json(services.admin_update(&caller, target, body, Utc::now())?))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    CallerContext(caller): CallerContext,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let target: UserId = id.parse()?;
    services.delete_identity(&caller, target)?;
    Ok(StatusCode::NO_CONTENT)
}
