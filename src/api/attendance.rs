use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::{
    attendance::{
        classifier::CheckInWindow,
        error::AttendanceError,
        service,
        store::{AttendanceRecorder, EnrollmentResolver},
    },
    model::attendance::AttendanceStatus,
};

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CheckInRequest {
    /// Card ID read by the scanner
    #[schema(example = "CARD-00042")]
    #[param(example = "CARD-00042")]
    pub student_card_id: Option<String>,
    #[schema(example = "lec-042")]
    #[param(example = "lec-042")]
    pub lecture_id: Option<String>,
}

impl CheckInRequest {
    fn validate(&self) -> Result<(&str, &str), AttendanceError> {
        let card_id = required(&self.student_card_id)
            .ok_or(AttendanceError::InvalidRequest("studentCardId is required"))?;
        let lecture_id = required(&self.lecture_id)
            .ok_or(AttendanceError::InvalidRequest("lectureId is required"))?;

        Ok((card_id, lecture_id))
    }
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "message": "Attendance record created",
    "status": "PRESENT"
}))]
pub struct CheckInResponse {
    pub message: String,
    pub status: AttendanceStatus,
}

/// Shared by both check-in routes; the observed time is the server clock.
async fn record_check_in<S>(
    store: &S,
    window: CheckInWindow,
    request: &CheckInRequest,
) -> Result<HttpResponse, AttendanceError>
where
    S: EnrollmentResolver + AttendanceRecorder,
{
    let (card_id, lecture_id) = request.validate()?;

    let record = service::check_in(store, window, card_id, lecture_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(CheckInResponse {
        message: "Attendance record created".to_string(),
        status: record.status,
    }))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = CheckInResponse),
        (status = 400, description = "Missing or malformed parameters", body = Object, example = json!({
            "message": "studentCardId is required"
        })),
        (status = 404, description = "Too early, or student/lecture/module/enrollment not found", body = Object, example = json!({
            "message": "Too early! Please retry closer to lecture start time."
        })),
        (status = 409, description = "Attendance already recorded", body = Object, example = json!({
            "message": "Attendance already recorded"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_check_in", skip_all, fields(lecture_id = ?payload.lecture_id))]
pub async fn check_in<S>(
    store: web::Data<S>,
    window: web::Data<CheckInWindow>,
    payload: web::Json<CheckInRequest>,
) -> Result<HttpResponse, AttendanceError>
where
    S: EnrollmentResolver + AttendanceRecorder + 'static,
{
    record_check_in(store.get_ref(), **window, &payload).await
}

/// Card reader check-in, parameters in the query string
#[utoipa::path(
    get,
    path = "/api/attendance/scan",
    params(CheckInRequest),
    responses(
        (status = 200, description = "Attendance recorded", body = CheckInResponse),
        (status = 400, description = "Missing or malformed parameters"),
        (status = 404, description = "Too early, or student/lecture/module/enrollment not found"),
        (status = 409, description = "Attendance already recorded"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_scan", skip_all, fields(lecture_id = ?query.lecture_id))]
pub async fn scan<S>(
    store: web::Data<S>,
    window: web::Data<CheckInWindow>,
    query: web::Query<CheckInRequest>,
) -> Result<HttpResponse, AttendanceError>
where
    S: EnrollmentResolver + AttendanceRecorder + 'static,
{
    record_check_in(store.get_ref(), **window, &query).await
}
