use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use super::{
    classifier::CheckInWindow,
    error::AttendanceError,
    store::{AttendanceRecorder, AttendanceRoster, EnrollmentResolver, NewAttendance},
};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Resolve, classify, persist. A too-early scan is never persisted.
pub async fn check_in<S>(
    store: &S,
    window: CheckInWindow,
    card_id: &str,
    lecture_id: &str,
    observed: DateTime<Utc>,
) -> Result<AttendanceRecord, AttendanceError>
where
    S: EnrollmentResolver + AttendanceRecorder,
{
    let enrolled = store.resolve(card_id, lecture_id).await?;

    debug!(
        student_id = %enrolled.student_id,
        starts_at = %enrolled.lecture.starts_at,
        %observed,
        "Classifying check-in"
    );

    let status = window.classify(enrolled.lecture.starts_at, observed)?;

    let record = store
        .record(NewAttendance {
            student_id: enrolled.student_id,
            lecture_id: enrolled.lecture.id,
            status,
            recorded_at: observed,
        })
        .await?;

    info!(record_id = %record.id, status = %record.status, "Attendance recorded");
    Ok(record)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LectureSummary {
    pub lecture_id: String,
    #[schema(value_type = String, format = "date-time")]
    pub starts_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub ends_at: DateTime<Utc>,
    pub enrolled: i64,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    /// Enrolled students with no record yet.
    pub unrecorded: i64,
    pub records: Vec<AttendanceRecord>,
}

pub async fn summarize<S: AttendanceRoster>(
    store: &S,
    lecture_id: &str,
) -> Result<LectureSummary, AttendanceError> {
    let lecture = store
        .lecture(lecture_id)
        .await?
        .ok_or(AttendanceError::LectureNotFound)?;

    let enrolled = store.enrolled_count(&lecture.module_id).await?;
    let records = store.records_for_lecture(&lecture.id).await?;
    let unrecorded = store.unrecorded_count(&lecture).await?;

    let count = |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count() as i64;
    let (present, late, absent) = (
        count(AttendanceStatus::Present),
        count(AttendanceStatus::Late),
        count(AttendanceStatus::Absent),
    );

    Ok(LectureSummary {
        lecture_id: lecture.id,
        starts_at: lecture.starts_at,
        ends_at: lecture.ends_at,
        enrolled,
        present,
        late,
        absent,
        unrecorded,
        records,
    })
}

/// Marks every enrolled student without a record as ABSENT. Refused until the
/// lecture has ended; calling it again marks nobody.
pub async fn finalize<S: AttendanceRoster>(
    store: &S,
    lecture_id: &str,
    now: DateTime<Utc>,
) -> Result<u64, AttendanceError> {
    let lecture = store
        .lecture(lecture_id)
        .await?
        .ok_or(AttendanceError::LectureNotFound)?;

    if now < lecture.ends_at {
        return Err(AttendanceError::LectureNotEnded);
    }

    let marked = store.mark_absentees(&lecture, now).await?;
    info!(lecture_id = %lecture.id, marked, "Lecture finalized");
    Ok(marked)
}
