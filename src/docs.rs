use crate::api::attendance::{CheckInRequest, CheckInResponse};
use crate::attendance::service::LectureSummary;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "UniTrack Attendance API",
        version = "0.1.0",
        description = r#"
## UniTrack attendance service

Records student attendance at university lectures from card scans.

### Check-in rule
The scan time is compared to the lecture's scheduled start, in whole minutes:
- less than 15 minutes either side → **PRESENT**
- 15 minutes or more after the start → **LATE**
- 15 minutes or more before the start → rejected, retry closer to the start

Students, modules, lectures and enrollments are managed elsewhere; this API
only resolves them.

### Response Format
- JSON bodies; errors are `{ "message": "..." }`
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::scan,

        crate::api::lecture::attendance_summary,
        crate::api::lecture::finalize
    ),
    components(
        schemas(
            CheckInRequest,
            CheckInResponse,
            AttendanceStatus,
            AttendanceRecord,
            LectureSummary
        )
    ),
    tags(
        (name = "Attendance", description = "Card check-in APIs"),
        (name = "Lecture", description = "Per-lecture attendance APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/api/attendance/check-in",
            "/api/attendance/scan",
            "/api/lectures/{lecture_id}/attendance",
            "/api/lectures/{lecture_id}/finalize",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }

    #[test]
    fn description_matches_check_in_boundaries() {
        let doc = ApiDoc::openapi();
        let description = doc.info.description.unwrap_or_default();

        assert!(description.contains("less than 15 minutes either side"));
        assert!(description.contains("15 minutes or more after the start"));
        assert!(!description.contains("within 15 minutes"));
    }
}
