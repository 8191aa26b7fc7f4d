use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Stored and serialized as `PRESENT`, `LATE` or `ABSENT`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    /// Only assigned when a lecture is finalized, never by a check-in.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "5f0c2b1e-8d5a-4a57-9d7e-2f3c1a9b6e10",
    "studentId": "stu-001",
    "lectureId": "lec-042",
    "status": "PRESENT",
    "recordedAt": "2023-11-28T09:03:24Z"
}))]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub lecture_id: String,
    pub status: AttendanceStatus,
    #[schema(value_type = String, format = "date-time")]
    pub recorded_at: DateTime<Utc>,
}

/// Row shape of `attendance_records`; `status` is decoded separately.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: String,
    pub student_id: String,
    pub lecture_id: String,
    pub status: String,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = strum::ParseError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            student_id: row.student_id,
            lecture_id: row.lecture_id,
            recorded_at: row.recorded_at,
        })
    }
}
