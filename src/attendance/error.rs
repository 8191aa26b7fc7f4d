use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use super::classifier::TooEarly;

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("{0}")]
    InvalidRequest(&'static str),

    #[error("Student not found")]
    StudentNotFound,

    #[error("Lecture not found")]
    LectureNotFound,

    #[error("Module not found")]
    ModuleNotFound,

    #[error("Enrollment not found")]
    EnrollmentNotFound,

    #[error("Too early! Please retry closer to lecture start time.")]
    TooEarly(#[from] TooEarly),

    #[error("Attendance already recorded")]
    AlreadyRecorded,

    #[error("Lecture has not ended yet")]
    LectureNotEnded,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::StudentNotFound
            | Self::LectureNotFound
            | Self::ModuleNotFound
            | Self::EnrollmentNotFound
            | Self::TooEarly(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRecorded | Self::LectureNotEnded => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Attendance store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AttendanceError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn too_early_maps_to_not_found_with_retry_message() {
        let (status, body) = body_of(TooEarly.into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["message"],
            "Too early! Please retry closer to lecture start time."
        );
    }

    #[actix_web::test]
    async fn lookup_failures_map_to_not_found() {
        for (err, message) in [
            (AttendanceError::StudentNotFound, "Student not found"),
            (AttendanceError::LectureNotFound, "Lecture not found"),
            (AttendanceError::ModuleNotFound, "Module not found"),
            (AttendanceError::EnrollmentNotFound, "Enrollment not found"),
        ] {
            let (status, body) = body_of(err).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], message);
        }
    }

    #[actix_web::test]
    async fn database_details_are_not_leaked() {
        let (status, body) = body_of(sqlx::Error::PoolTimedOut.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[test]
    fn conflicts_and_bad_requests() {
        assert_eq!(
            AttendanceError::AlreadyRecorded.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AttendanceError::LectureNotEnded.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AttendanceError::InvalidRequest("lectureId is required").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
