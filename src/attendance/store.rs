//! Storage seams for the check-in flow.
//!
//! Handlers receive a single store value implementing all three traits, so
//! the classifier and service logic can run against MySQL or an in-memory
//! double without changes.

use chrono::{DateTime, Utc};

use super::error::AttendanceError;
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    lecture::Lecture,
};

/// A student confirmed as enrolled in the module that owns `lecture`.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrolled {
    pub student_id: String,
    pub lecture: Lecture,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub student_id: String,
    pub lecture_id: String,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
}

pub trait EnrollmentResolver {
    /// Looks up, in order: student by card, lecture, owning module, enrollment.
    /// The first missing link decides the error.
    async fn resolve(&self, card_id: &str, lecture_id: &str) -> Result<Enrolled, AttendanceError>;
}

pub trait AttendanceRecorder {
    /// Fails with [`AttendanceError::AlreadyRecorded`] if the student already
    /// has a record for the lecture.
    async fn record(&self, entry: NewAttendance) -> Result<AttendanceRecord, AttendanceError>;
}

pub trait AttendanceRoster {
    async fn lecture(&self, lecture_id: &str) -> Result<Option<Lecture>, AttendanceError>;

    async fn enrolled_count(&self, module_id: &str) -> Result<i64, AttendanceError>;

    /// Records for a lecture ordered by `recorded_at`.
    async fn records_for_lecture(
        &self,
        lecture_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;

    /// Enrolled students of the lecture's module with no record for it.
    async fn unrecorded_count(&self, lecture: &Lecture) -> Result<i64, AttendanceError>;

    /// Inserts an ABSENT record for each enrolled student without one and
    /// returns how many were inserted.
    async fn mark_absentees(
        &self,
        lecture: &Lecture,
        at: DateTime<Utc>,
    ) -> Result<u64, AttendanceError>;
}

/// Everything the HTTP layer needs from a backing store.
pub trait AttendanceStore:
    EnrollmentResolver + AttendanceRecorder + AttendanceRoster + 'static
{
}

impl<T> AttendanceStore for T where
    T: EnrollmentResolver + AttendanceRecorder + AttendanceRoster + 'static
{
}
