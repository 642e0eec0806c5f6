use crate::data::{SessionEntry, Student, Teacher};
use itertools::Itertools;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

const TEACHERS_FILE: &str = "teachers.json";
const STUDENTS_FILE: &str = "students.json";
const SCHEDULE_FILE: &str = "schedule.json";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from record-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A stored teacher with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeacherRecord {
    pub id: String,
    #[serde(flatten)]
    pub teacher: Teacher,
}

/// A stored student record with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudentRecord {
    pub id: String,
    #[serde(flatten)]
    pub student: Student,
}

/// JSON-file record store. Each collection lives in its own file under the
/// data directory and is rewritten whole on every mutation.
#[derive(Debug)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Opens a store, creating the data directory and seeding empty
    /// collection files on first use.
    pub fn open(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let store = Self {
            data_dir: data_dir.into(),
        };
        fs::create_dir_all(&store.data_dir)?;
        for file in [TEACHERS_FILE, STUDENTS_FILE, SCHEDULE_FILE] {
            let path = store.path(file);
            if !path.exists() {
                fs::write(&path, "[]")?;
            }
        }
        Ok(store)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Unreadable or corrupt files load as empty collections.
    fn load<T: DeserializeOwned>(&self, file: &str) -> Vec<T> {
        match fs::read_to_string(self.path(file)) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("ignoring corrupt {}: {}", file, err);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    fn save<T: Serialize>(&self, file: &str, records: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(records)?;
        fs::write(self.path(file), raw)?;
        Ok(())
    }

    pub fn teachers(&self) -> Vec<TeacherRecord> {
        self.load(TEACHERS_FILE)
    }

    pub fn students(&self) -> Vec<StudentRecord> {
        self.load(STUDENTS_FILE)
    }

    pub fn schedule(&self) -> Vec<SessionEntry> {
        self.load(SCHEDULE_FILE)
    }

    /// Teacher names stored more than once. The scheduling algorithm matches
    /// teachers by name, so a roster with duplicates must not be scheduled;
    /// hand-edited data files are the only way to get into this state.
    pub fn duplicate_teacher_names(&self) -> Vec<String> {
        self.teachers()
            .into_iter()
            .map(|record| record.teacher.name)
            .duplicates()
            .collect()
    }

    pub fn add_teacher(&self, teacher: Teacher) -> StoreResult<TeacherRecord> {
        let mut teachers = self.teachers();
        if teachers.iter().any(|t| t.teacher.name == teacher.name) {
            return Err(StoreError::Conflict(format!(
                "teacher {} already exists",
                teacher.name
            )));
        }
        let record = TeacherRecord {
            id: (teachers.len() + 1).to_string(),
            teacher,
        };
        teachers.push(record.clone());
        self.save(TEACHERS_FILE, &teachers)?;
        Ok(record)
    }

    pub fn update_teacher(&self, id: &str, teacher: Teacher) -> StoreResult<TeacherRecord> {
        let mut teachers = self.teachers();
        let index = teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("teacher {id}")))?;
        if teachers
            .iter()
            .any(|t| t.id != id && t.teacher.name == teacher.name)
        {
            return Err(StoreError::Conflict(format!(
                "teacher {} already exists",
                teacher.name
            )));
        }
        teachers[index].teacher = teacher;
        let updated = teachers[index].clone();
        self.save(TEACHERS_FILE, &teachers)?;
        Ok(updated)
    }

    /// Deletion is refused while any student prefers the teacher or any
    /// stored session names them.
    pub fn delete_teacher(&self, id: &str) -> StoreResult<()> {
        let teachers = self.teachers();
        let record = teachers
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("teacher {id}")))?;
        let students = self.students();
        if let Some(student) = students
            .iter()
            .find(|s| s.student.preferred_teacher.as_deref() == Some(record.teacher.name.as_str()))
        {
            return Err(StoreError::Conflict(format!(
                "teacher {} is preferred by student {}",
                record.teacher.name, student.student.name
            )));
        }
        if self
            .schedule()
            .iter()
            .any(|entry| entry.teacher == record.teacher.name)
        {
            return Err(StoreError::Conflict(format!(
                "teacher {} already has scheduled sessions",
                record.teacher.name
            )));
        }
        let remaining: Vec<TeacherRecord> =
            teachers.into_iter().filter(|t| t.id != id).collect();
        self.save(TEACHERS_FILE, &remaining)
    }

    pub fn add_student(&self, student: Student) -> StoreResult<StudentRecord> {
        let mut students = self.students();
        if students.iter().any(|s| same_course(&s.student, &student)) {
            return Err(StoreError::Conflict(duplicate_course_message(&student)));
        }
        let record = StudentRecord {
            id: (students.len() + 1).to_string(),
            student,
        };
        students.push(record.clone());
        self.save(STUDENTS_FILE, &students)?;
        Ok(record)
    }

    pub fn update_student(&self, id: &str, student: Student) -> StoreResult<StudentRecord> {
        let mut students = self.students();
        let index = students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("student record {id}")))?;
        if students
            .iter()
            .any(|s| s.id != id && same_course(&s.student, &student))
        {
            return Err(StoreError::Conflict(duplicate_course_message(&student)));
        }
        students[index].student = student;
        let updated = students[index].clone();
        self.save(STUDENTS_FILE, &students)?;
        Ok(updated)
    }

    /// Deletion is refused while a stored session of the same grade and
    /// subject lists the student's name.
    pub fn delete_student(&self, id: &str) -> StoreResult<()> {
        let students = self.students();
        let record = students
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("student record {id}")))?;
        let scheduled = self.schedule().iter().any(|entry| {
            entry.students.contains(&record.student.name)
                && entry.grade == record.student.grade
                && entry.subject == record.student.subject
        });
        if scheduled {
            return Err(StoreError::Conflict(format!(
                "student {}'s {} {} record already has scheduled sessions",
                record.student.name, record.student.grade, record.student.subject
            )));
        }
        let remaining: Vec<StudentRecord> =
            students.into_iter().filter(|s| s.id != id).collect();
        self.save(STUDENTS_FILE, &remaining)
    }

    pub fn save_schedule(&self, schedule: &[SessionEntry]) -> StoreResult<()> {
        self.save(SCHEDULE_FILE, schedule)
    }

    /// Empties all three collections.
    pub fn clear(&self) -> StoreResult<()> {
        self.save::<TeacherRecord>(TEACHERS_FILE, &[])?;
        self.save::<StudentRecord>(STUDENTS_FILE, &[])?;
        self.save::<SessionEntry>(SCHEDULE_FILE, &[])
    }
}

fn same_course(a: &Student, b: &Student) -> bool {
    a.name == b.name
        && a.grade == b.grade
        && a.subject == b.subject
        && a.course_type == b.course_type
}

fn duplicate_course_message(student: &Student) -> String {
    format!(
        "student {} already has a {} {} {} record",
        student.name, student.grade, student.subject, student.course_type
    )
}
