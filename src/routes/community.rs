use actix_web::{web, HttpRequest, HttpResponse};
use crate::error::FinderError;
use crate::models::{CreatedResponse, SubmitFeedbackRequest, SubmitReviewRequest};
use crate::routes::AppState;

/// Configure feedback and review routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/feedback", web::post().to(submit_feedback))
        .route("/reviews", web::post().to(submit_review));
}

/// Listing accuracy feedback
///
/// POST /api/v1/feedback
///
/// Request body:
/// ```json
/// {
///   "gymId": "string",
///   "rating": 4,
///   "review": "string",
///   "amenitiesConfirmed": { "sauna": true },
///   "amenitiesMissing": ["pool"],
///   "isAccurate": false,
///   "inaccuracyDetails": "string"
/// }
/// ```
async fn submit_feedback(
    state: web::Data<AppState>,
    req: web::Json<SubmitFeedbackRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let feedback = state
        .finder
        .submit_feedback(principal.as_ref(), req.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse {
        success: true,
        id: feedback.id,
    }))
}

/// POST /api/v1/reviews
async fn submit_review(
    state: web::Data<AppState>,
    req: web::Json<SubmitReviewRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, FinderError> {
    let principal = state.principal(&http_req).await?;
    let review = state
        .finder
        .submit_review(principal.as_ref(), req.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse {
        success: true,
        id: review.id,
    }))
}
