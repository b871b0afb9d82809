use actix_web::{web, HttpRequest, HttpResponse};
use crate::error::FinderError;
use crate::models::{ReviewStatusRequest, UpdateRoleRequest};
use crate::routes::AppState;

/// Configure owner and admin dashboard routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/owner/gyms", web::get().to(owned_gyms))
        .route("/admin/users", web::get().to(list_users))
        .route("/admin/users/{id}/role", web::patch().to(update_user_role))
        .route("/admin/reviews/{id}/status", web::patch().to(moderate_review));
}

/// GET /api/v1/owner/gyms
async fn owned_gyms(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let gyms = state.finder.owned_gyms(principal.as_ref()).await?;
    Ok(HttpResponse::Ok().json(gyms))
}

/// GET /api/v1/admin/users
async fn list_users(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let users = state.finder.all_users(principal.as_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// PATCH /api/v1/admin/users/{id}/role
async fn update_user_role(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateRoleRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let user = state
        .finder
        .update_user_role(principal.as_ref(), &path, req.role)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// PATCH /api/v1/admin/reviews/{id}/status
async fn moderate_review(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ReviewStatusRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let review = state
        .finder
        .moderate_review(principal.as_ref(), &path, req.status)
        .await?;

    Ok(HttpResponse::Ok().json(review))
}
