use serde::{Deserialize, Serialize};
use std::fmt;

/// A teacher, identified by name. Names are the matching key and must be
/// unique within one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub name: String,
    pub grades: Vec<String>,
    pub subjects: Vec<String>,
    pub availability: Vec<String>,
}

/// One schedulable student record. The same student name may appear under
/// several (grade, subject, courseType) combinations; each record is
/// scheduled independently.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    pub grade: String,
    pub subject: String,
    pub course_type: CourseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_teacher: Option<String>,
    pub availability: Vec<String>,
}

/// Whether a session holds exactly one student or a shared group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Individual,
    Group,
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseType::Individual => write!(f, "individual"),
            CourseType::Group => write!(f, "group"),
        }
    }
}

/// A single scheduled session: one slot, one teacher, one or more students.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub time_slot: String,
    pub teacher: String,
    pub students: Vec<String>,
    pub course_type: CourseType,
    pub grade: String,
    pub subject: String,
}

impl fmt::Display for SessionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {} with {}: {}",
            self.time_slot,
            self.grade,
            self.subject,
            self.course_type,
            self.teacher,
            self.students.join(", ")
        )
    }
}
