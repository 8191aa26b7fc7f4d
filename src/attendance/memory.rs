//! In-memory store used by the unit and handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    error::AttendanceError,
    store::{AttendanceRecorder, AttendanceRoster, EnrollmentResolver, Enrolled, NewAttendance},
};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    lecture::Lecture,
    student::Student,
};

#[derive(Default)]
struct Tables {
    students: Vec<Student>,
    modules: HashSet<String>,
    lectures: HashMap<String, Lecture>,
    enrollments: HashSet<(String, String)>,
    records: Vec<AttendanceRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn add_student(&self, id: &str, card_id: &str) {
        self.tables.lock().unwrap().students.push(Student {
            id: id.to_string(),
            card_id: card_id.to_string(),
            first_name: "Test".to_string(),
            last_name: id.to_string(),
        });
    }

    pub fn add_module(&self, id: &str) {
        self.tables.lock().unwrap().modules.insert(id.to_string());
    }

    pub fn add_lecture(
        &self,
        id: &str,
        module_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) {
        self.tables.lock().unwrap().lectures.insert(
            id.to_string(),
            Lecture {
                id: id.to_string(),
                module_id: module_id.to_string(),
                title: format!("Lecture {id}"),
                starts_at,
                ends_at,
            },
        );
    }

    pub fn enroll(&self, student_id: &str, module_id: &str) {
        self.tables
            .lock()
            .unwrap()
            .enrollments
            .insert((student_id.to_string(), module_id.to_string()));
    }

    pub fn unenroll(&self, student_id: &str, module_id: &str) {
        self.tables
            .lock()
            .unwrap()
            .enrollments
            .remove(&(student_id.to_string(), module_id.to_string()));
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.tables.lock().unwrap().records.clone()
    }
}

impl EnrollmentResolver for MemoryStore {
    async fn resolve(&self, card_id: &str, lecture_id: &str) -> Result<Enrolled, AttendanceError> {
        let tables = self.tables.lock().unwrap();

        let student = tables
            .students
            .iter()
            .find(|s| s.card_id == card_id)
            .ok_or(AttendanceError::StudentNotFound)?;
        let lecture = tables
            .lectures
            .get(lecture_id)
            .ok_or(AttendanceError::LectureNotFound)?;

        if !tables.modules.contains(&lecture.module_id) {
            return Err(AttendanceError::ModuleNotFound);
        }
        if !tables
            .enrollments
            .contains(&(student.id.clone(), lecture.module_id.clone()))
        {
            return Err(AttendanceError::EnrollmentNotFound);
        }

        Ok(Enrolled {
            student_id: student.id.clone(),
            lecture: lecture.clone(),
        })
    }
}

impl AttendanceRecorder for MemoryStore {
    async fn record(&self, entry: NewAttendance) -> Result<AttendanceRecord, AttendanceError> {
        let mut tables = self.tables.lock().unwrap();

        if tables
            .records
            .iter()
            .any(|r| r.student_id == entry.student_id && r.lecture_id == entry.lecture_id)
        {
            return Err(AttendanceError::AlreadyRecorded);
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            student_id: entry.student_id,
            lecture_id: entry.lecture_id,
            status: entry.status,
            recorded_at: entry.recorded_at,
        };
        tables.records.push(record.clone());
        Ok(record)
    }
}

impl AttendanceRoster for MemoryStore {
    async fn lecture(&self, lecture_id: &str) -> Result<Option<Lecture>, AttendanceError> {
        Ok(self.tables.lock().unwrap().lectures.get(lecture_id).cloned())
    }

    async fn enrolled_count(&self, module_id: &str) -> Result<i64, AttendanceError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .enrollments
            .iter()
            .filter(|(_, m)| m == module_id)
            .count() as i64)
    }

    async fn records_for_lecture(
        &self,
        lecture_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<_> = tables
            .records
            .iter()
            .filter(|r| r.lecture_id == lecture_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }

    async fn unrecorded_count(&self, lecture: &Lecture) -> Result<i64, AttendanceError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .enrollments
            .iter()
            .filter(|(s, m)| {
                *m == lecture.module_id
                    && !tables
                        .records
                        .iter()
                        .any(|r| &r.student_id == s && r.lecture_id == lecture.id)
            })
            .count() as i64)
    }

    async fn mark_absentees(
        &self,
        lecture: &Lecture,
        at: DateTime<Utc>,
    ) -> Result<u64, AttendanceError> {
        let mut tables = self.tables.lock().unwrap();

        let mut missing: Vec<String> = tables
            .enrollments
            .iter()
            .filter(|(_, m)| *m == lecture.module_id)
            .map(|(s, _)| s.clone())
            .filter(|s| {
                !tables
                    .records
                    .iter()
                    .any(|r| &r.student_id == s && r.lecture_id == lecture.id)
            })
            .collect();
        missing.sort();

        let marked = missing.len() as u64;
        for student_id in missing {
            tables.records.push(AttendanceRecord {
                id: Uuid::new_v4().to_string(),
                student_id,
                lecture_id: lecture.id.clone(),
                status: AttendanceStatus::Absent,
                recorded_at: at,
            });
        }
        Ok(marked)
    }
}
