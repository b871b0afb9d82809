use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use validator::Validate;
use crate::core::{markers, Completion, SessionSnapshot};
use crate::error::FinderError;
use crate::models::{
    Coordinates, CreatedResponse, DirectionsQuery, FilterGymsRequest, Gym, GymListResponse, GymPatch,
    HealthResponse, MarkersResponse, SearchErrorResponse, SearchGymsRequest, SessionQuery,
    ToggleFilterRequest, VerificationRequest,
};
use crate::routes::AppState;

/// Configure search, filter and gym routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/catalog", web::get().to(get_catalog))
        .route("/gyms/search", web::post().to(search_gyms))
        .route("/gyms/filter", web::post().to(filter_gyms))
        .route("/gyms/filters/toggle", web::post().to(toggle_filter))
        .route("/gyms/markers", web::get().to(get_markers))
        .route("/gyms/{id}", web::get().to(get_gym))
        .route("/gyms/{id}", web::patch().to(update_gym))
        .route("/gyms/{id}/directions", web::get().to(get_directions))
        .route("/gyms/{id}/verification", web::post().to(send_verification));
}

fn list_response(snapshot: SessionSnapshot, gyms: Vec<Gym>, stale: bool) -> GymListResponse {
    GymListResponse {
        location: snapshot.location,
        total_results: gyms.len(),
        gyms,
        category: snapshot.category,
        filters: snapshot.filters,
        stale,
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = state.finder.directory_healthy().await;
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        backend: state.finder.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_sessions: state.sessions.stats().await.active_sessions,
        timestamp: chrono::Utc::now(),
    })
}

/// Categories and amenities for the filter panels
///
/// GET /api/v1/catalog
async fn get_catalog(state: web::Data<AppState>) -> Result<HttpResponse, FinderError> {
    let finder = state.finder.clone();
    let catalog = state
        .catalog
        .get_or_load(|| async move { finder.catalog().await })
        .await?;

    Ok(HttpResponse::Ok().json(catalog))
}

/// Search gyms near a location
///
/// POST /api/v1/gyms/search
///
/// Request body:
/// ```json
/// {
///   "sessionId": "string",
///   "location": "Tampa, FL",
///   "radius": 5000,
///   "keyword": "gym fitness"
/// }
/// ```
///
/// On failure the body carries the error together with the session's
/// last-known-good gyms.
async fn search_gyms(
    state: web::Data<AppState>,
    req: web::Json<SearchGymsRequest>,
) -> Result<HttpResponse, FinderError> {
    req.validate()?;

    let session = state.sessions.get_or_create(&req.session_id).await;
    let options = state
        .finder
        .defaults()
        .overridden(req.radius, req.keyword.as_deref());

    let outcome = state
        .finder
        .search_session(&session, &req.location, &options)
        .await;

    if let Some(e) = outcome.error {
        let status = e.status_code();
        return Ok(HttpResponse::build(status).json(SearchErrorResponse {
            error: e.code().to_string(),
            message: e.to_string(),
            status_code: status.as_u16(),
            location: outcome.snapshot.location,
            gyms: outcome.snapshot.gyms,
        }));
    }

    let stale = outcome.completion == Completion::Stale;
    let gyms = outcome.snapshot.gyms.clone();
    Ok(HttpResponse::Ok().json(list_response(outcome.snapshot, gyms, stale)))
}

/// Narrow the session's current results
///
/// POST /api/v1/gyms/filter
async fn filter_gyms(
    state: web::Data<AppState>,
    req: web::Json<FilterGymsRequest>,
) -> Result<HttpResponse, FinderError> {
    req.validate()?;

    let session = state.sessions.get_or_create(&req.session_id).await;
    let selection = match &req.filters {
        Some(filters) => filters.clone(),
        None => session.snapshot().await.filters,
    };

    let gyms = state
        .finder
        .filter_session(&session, req.category_id(), selection)
        .await?;

    tracing::info!(
        "Session {} filtered to {} gyms",
        req.session_id,
        gyms.len()
    );

    Ok(HttpResponse::Ok().json(list_response(session.snapshot().await, gyms, false)))
}

/// Flip one filter option and re-run the filter
///
/// POST /api/v1/gyms/filters/toggle
async fn toggle_filter(
    state: web::Data<AppState>,
    req: web::Json<ToggleFilterRequest>,
) -> Result<HttpResponse, FinderError> {
    req.validate()?;

    let session = state.sessions.get_or_create(&req.session_id).await;
    let selection = session.toggle_filter(req.group, &req.option).await;
    let snapshot = session.snapshot().await;

    let gyms = state
        .finder
        .filter(&snapshot.gyms, snapshot.category.as_deref(), &selection)
        .await?;

    Ok(HttpResponse::Ok().json(list_response(snapshot, gyms, false)))
}

/// Map markers for the session's filtered results
///
/// GET /api/v1/gyms/markers?sessionId=...
async fn get_markers(
    state: web::Data<AppState>,
    query: web::Query<SessionQuery>,
) -> Result<HttpResponse, FinderError> {
    query.validate()?;

    let session = state.sessions.get_or_create(&query.session_id).await;
    let snapshot = session.snapshot().await;
    let gyms = state
        .finder
        .filter(&snapshot.gyms, snapshot.category.as_deref(), &snapshot.filters)
        .await?;

    Ok(HttpResponse::Ok().json(MarkersResponse {
        markers: markers(&gyms),
    }))
}

/// GET /api/v1/gyms/{id}
async fn get_gym(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, FinderError> {
    let details = state.finder.gym_details(&path).await?;
    Ok(HttpResponse::Ok().json(details))
}

/// GET /api/v1/gyms/{id}/directions?fromLng=..&fromLat=..&mode=walking
async fn get_directions(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DirectionsQuery>,
) -> Result<HttpResponse, FinderError> {
    query.validate()?;

    let candidates = match &query.session_id {
        Some(session_id) => match state.sessions.get(session_id).await {
            Some(session) => session.candidates().await,
            None => vec![],
        },
        None => vec![],
    };

    let route = state
        .finder
        .directions(
            &path,
            &candidates,
            Coordinates::new(query.from_lng, query.from_lat),
            query.mode,
        )
        .await?;

    Ok(HttpResponse::Ok().json(route))
}

/// PATCH /api/v1/gyms/{id}
async fn update_gym(
    state: web::Data<AppState>,
    path: web::Path<String>,
    patch: web::Json<GymPatch>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let gym = state
        .finder
        .update_gym(principal.as_ref(), &path, patch.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(gym))
}

/// POST /api/v1/gyms/{id}/verification
async fn send_verification(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<VerificationRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let message = state
        .finder
        .send_verification(principal.as_ref(), &path, req.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse {
        success: true,
        id: message.id,
    }))
}
