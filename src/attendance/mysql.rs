use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    error::AttendanceError,
    store::{AttendanceRecorder, AttendanceRoster, EnrollmentResolver, Enrolled, NewAttendance},
};
use crate::{
    model::{
        attendance::{AttendanceRecord, AttendanceRow, AttendanceStatus},
        lecture::Lecture,
        student::Student,
    },
    utils::lecture_cache::LectureCache,
};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    lectures: LectureCache,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, lectures: LectureCache) -> Self {
        Self { pool, lectures }
    }

    async fn find_lecture(&self, lecture_id: &str) -> Result<Option<Lecture>, AttendanceError> {
        if let Some(lecture) = self.lectures.get(lecture_id).await {
            return Ok(Some(lecture));
        }

        let lecture = sqlx::query_as::<_, Lecture>(
            r#"
            SELECT id, module_id, title, starts_at, ends_at
            FROM lectures
            WHERE id = ?
            "#,
        )
        .bind(lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(lecture) = &lecture {
            self.lectures.insert(lecture.clone()).await;
        }

        Ok(lecture)
    }
}

impl EnrollmentResolver for MySqlStore {
    #[instrument(skip(self))]
    async fn resolve(&self, card_id: &str, lecture_id: &str) -> Result<Enrolled, AttendanceError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, card_id, first_name, last_name
            FROM students
            WHERE card_id = ?
            "#,
        )
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AttendanceError::StudentNotFound)?;

        let lecture = self
            .find_lecture(lecture_id)
            .await?
            .ok_or(AttendanceError::LectureNotFound)?;

        let module_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM modules WHERE id = ? LIMIT 1)",
        )
        .bind(&lecture.module_id)
        .fetch_one(&self.pool)
        .await?;

        if !module_exists {
            return Err(AttendanceError::ModuleNotFound);
        }

        let enrolled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = ? AND module_id = ? LIMIT 1)",
        )
        .bind(&student.id)
        .bind(&lecture.module_id)
        .fetch_one(&self.pool)
        .await?;

        if !enrolled {
            debug!(student_id = %student.id, module_id = %lecture.module_id, "Not enrolled");
            return Err(AttendanceError::EnrollmentNotFound);
        }

        Ok(Enrolled {
            student_id: student.id,
            lecture,
        })
    }
}

impl AttendanceRecorder for MySqlStore {
    async fn record(&self, entry: NewAttendance) -> Result<AttendanceRecord, AttendanceError> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records (id, student_id, lecture_id, status, recorded_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&entry.student_id)
        .bind(&entry.lecture_id)
        .bind(entry.status.as_ref())
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(AttendanceRecord {
                id,
                student_id: entry.student_id,
                lecture_id: entry.lecture_id,
                status: entry.status,
                recorded_at: entry.recorded_at,
            }),
            // unique (student_id, lecture_id)
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AttendanceError::AlreadyRecorded)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl AttendanceRoster for MySqlStore {
    async fn lecture(&self, lecture_id: &str) -> Result<Option<Lecture>, AttendanceError> {
        self.find_lecture(lecture_id).await
    }

    async fn enrolled_count(&self, module_id: &str) -> Result<i64, AttendanceError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE module_id = ?",
        )
        .bind(module_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn records_for_lecture(
        &self,
        lecture_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, student_id, lecture_id, status, recorded_at
            FROM attendance_records
            WHERE lecture_id = ?
            ORDER BY recorded_at, id
            "#,
        )
        .bind(lecture_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                AttendanceRecord::try_from(row)
                    .map_err(|e| AttendanceError::Database(sqlx::Error::Decode(Box::new(e))))
            })
            .collect()
    }

    async fn unrecorded_count(&self, lecture: &Lecture) -> Result<i64, AttendanceError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM enrollments e
            WHERE e.module_id = ?
            AND NOT EXISTS (
                SELECT 1 FROM attendance_records a
                WHERE a.student_id = e.student_id AND a.lecture_id = ?
            )
            "#,
        )
        .bind(&lecture.module_id)
        .bind(&lecture.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    #[instrument(skip(self, lecture), fields(lecture_id = %lecture.id))]
    async fn mark_absentees(
        &self,
        lecture: &Lecture,
        at: DateTime<Utc>,
    ) -> Result<u64, AttendanceError> {
        let mut tx = self.pool.begin().await?;

        let missing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT e.student_id
            FROM enrollments e
            WHERE e.module_id = ?
            AND NOT EXISTS (
                SELECT 1 FROM attendance_records a
                WHERE a.student_id = e.student_id AND a.lecture_id = ?
            )
            ORDER BY e.student_id
            "#,
        )
        .bind(&lecture.module_id)
        .bind(&lecture.id)
        .fetch_all(&mut *tx)
        .await?;

        let mut marked = 0;
        for student_id in missing {
            // a check-in racing with finalization keeps its own status
            let result = sqlx::query(
                r#"
                INSERT IGNORE INTO attendance_records (id, student_id, lecture_id, status, recorded_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&student_id)
            .bind(&lecture.id)
            .bind(AttendanceStatus::Absent.as_ref())
            .bind(at)
            .execute(&mut *tx)
            .await?;

            marked += result.rows_affected();
        }

        tx.commit().await?;
        Ok(marked)
    }
}
