use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use super::{Result, Store, StoreError};
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, NewAttendance, StudentSummary};
use crate::model::student::Student;

#[derive(Default)]
struct Tables {
    students: HashMap<String, Student>,
    attendance: Vec<AttendanceRecord>,
    next_attendance_id: u64,
}

/// Process-local store with the same key constraints as the MySQL schema.
///
/// Roll numbers compare case-insensitively, as they do under MySQL's default
/// collation.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("memory store poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("memory store poisoned")
    }
}

fn same_roll_no(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_student(&self, student: &Student) -> Result<()> {
        let mut tables = self.write();

        if tables.students.contains_key(&student.id) {
            return Err(StoreError::UniqueViolation {
                constraint: "PRIMARY".to_string(),
            });
        }
        if tables
            .students
            .values()
            .any(|s| same_roll_no(&s.roll_no, &student.roll_no))
        {
            return Err(StoreError::UniqueViolation {
                constraint: "students_roll_no_unique".to_string(),
            });
        }

        tables.students.insert(student.id.clone(), student.clone());
        Ok(())
    }

    async fn find_student(&self, id: &str) -> Result<Option<Student>> {
        Ok(self.read().students.get(id).cloned())
    }

    async fn roll_number_exists(&self, roll_no: &str) -> Result<bool> {
        Ok(self
            .read()
            .students
            .values()
            .any(|s| same_roll_no(&s.roll_no, roll_no)))
    }

    async fn find_attendance(&self, student_id: &str, date: NaiveDate) -> Result<Option<u64>> {
        Ok(self
            .read()
            .attendance
            .iter()
            .find(|a| a.student_id == student_id && a.date == date)
            .map(|a| a.id))
    }

    async fn insert_attendance(&self, new: NewAttendance) -> Result<AttendanceRecord> {
        let mut tables = self.write();

        if tables
            .attendance
            .iter()
            .any(|a| a.student_id == new.student_id && a.date == new.date)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "attendance_student_date_unique".to_string(),
            });
        }

        tables.next_attendance_id += 1;
        let record = new.into_record(tables.next_attendance_id);
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceEntry>> {
        let tables = self.read();

        let mut entries: Vec<AttendanceEntry> = tables
            .attendance
            .iter()
            .filter(|a| a.date == date)
            .map(|a| AttendanceEntry {
                id: a.id,
                timestamp: a.timestamp,
                status: a.status,
                student: tables
                    .students
                    .get(&a.student_id)
                    .map(StudentSummary::from)
                    .unwrap_or_else(StudentSummary::unknown),
            })
            .collect();

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    async fn roll_numbers(&self) -> Result<Vec<String>> {
        Ok(self.read().students.values().map(|s| s.roll_no.clone()).collect())
    }

    async fn recent_students(&self, days: u32) -> Result<Vec<Student>> {
        let since = Utc::now() - Duration::days(i64::from(days));
        let mut students: Vec<Student> = self
            .read()
            .students
            .values()
            .filter(|s| s.created_at >= since)
            .cloned()
            .collect();
        students.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(students)
    }
}
