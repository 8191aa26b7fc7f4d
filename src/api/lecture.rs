use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::attendance::{
    error::AttendanceError,
    service,
    store::AttendanceRoster,
};

/// Attendance summary for one lecture
#[utoipa::path(
    get,
    path = "/api/lectures/{lecture_id}/attendance",
    params(
        ("lecture_id" = String, Path, description = "Lecture ID")
    ),
    responses(
        (status = 200, description = "Attendance summary", body = crate::attendance::service::LectureSummary),
        (status = 404, description = "Lecture not found", body = Object, example = json!({
            "message": "Lecture not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Lecture"
)]
pub async fn attendance_summary<S>(
    store: web::Data<S>,
    path: web::Path<String>,
) -> Result<HttpResponse, AttendanceError>
where
    S: AttendanceRoster + 'static,
{
    let lecture_id = path.into_inner();
    let summary = service::summarize(store.get_ref(), &lecture_id).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Mark every enrolled student without a record as ABSENT
#[utoipa::path(
    post,
    path = "/api/lectures/{lecture_id}/finalize",
    params(
        ("lecture_id" = String, Path, description = "Lecture ID")
    ),
    responses(
        (status = 200, description = "Absentees recorded", body = Object, example = json!({
            "message": "Lecture finalized",
            "markedAbsent": 12
        })),
        (status = 404, description = "Lecture not found"),
        (status = 409, description = "Lecture has not ended yet", body = Object, example = json!({
            "message": "Lecture has not ended yet"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Lecture"
)]
pub async fn finalize<S>(
    store: web::Data<S>,
    path: web::Path<String>,
) -> Result<HttpResponse, AttendanceError>
where
    S: AttendanceRoster + 'static,
{
    let lecture_id = path.into_inner();
    let marked = service::finalize(store.get_ref(), &lecture_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Lecture finalized",
        "markedAbsent": marked
    })))
}
