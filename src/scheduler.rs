use crate::data::{CourseType, SessionEntry, Student, Teacher};
use crate::slots::{SlotCatalog, is_available};
use log::{info, trace};
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;

/// Errors that abort a generation run. Every variant carries the names the
/// caller needs to render an actionable message; none are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("no teachers have been added")]
    NoTeachers,
    #[error("no students have been added")]
    NoStudents,
    #[error("student {student} requested unknown teacher {teacher:?}")]
    UnresolvedTeacher { student: String, teacher: String },
    #[error("teacher {teacher} is not qualified for {grade} {subject}")]
    CapabilityMismatch {
        teacher: String,
        grade: String,
        subject: String,
    },
    #[error("no conflict-free slot available for student {student}")]
    UnplaceableStudent { student: String },
    #[error("no teacher covers {subject} for {grade}")]
    NoQualifiedTeacher { grade: String, subject: String },
    #[error("could not place group students: {0:?}")]
    UnplaceableGroup(Vec<String>),
}

/// Builds a conflict-free schedule for one roster snapshot.
///
/// Placement is greedy first-fit: one-on-one students are placed in input
/// order, then group students are batched by (grade, subject) and filled in,
/// requested teachers first. Earlier students can consume slots later ones
/// needed; a failed run returns no partial schedule.
pub fn generate_schedule(
    catalog: &SlotCatalog,
    teachers: &[Teacher],
    students: &[Student],
) -> Result<Vec<SessionEntry>, ScheduleError> {
    if teachers.is_empty() {
        return Err(ScheduleError::NoTeachers);
    }
    if students.is_empty() {
        return Err(ScheduleError::NoStudents);
    }

    let start_time = Instant::now();
    info!(
        "Generating schedule for {} teachers and {} student records...",
        teachers.len(),
        students.len()
    );

    let mut run = SchedulerRun {
        catalog,
        teachers,
        schedule: Vec::new(),
        assigned: HashSet::new(),
    };
    run.place_individuals(students)?;
    run.place_groups(students)?;

    info!(
        "Schedule complete: {} entries in {:.2?}",
        run.schedule.len(),
        start_time.elapsed()
    );
    Ok(run.schedule)
}

/// Mutable state for a single generation run: the schedule under
/// construction and the names already placed by the group pass. One
/// instance per call, never shared.
struct SchedulerRun<'a> {
    catalog: &'a SlotCatalog,
    teachers: &'a [Teacher],
    schedule: Vec<SessionEntry>,
    assigned: HashSet<String>,
}

impl<'a> SchedulerRun<'a> {
    /// True if an entry at this slot already has the teacher or lists the
    /// student.
    fn has_conflict(&self, slot: &str, teacher: &str, student: &str) -> bool {
        self.schedule.iter().any(|entry| {
            entry.time_slot == slot
                && (entry.teacher == teacher || entry.students.iter().any(|name| name == student))
        })
    }

    /// True if the teacher already holds an individual session at this slot.
    /// Group entries do not count: a teacher may hold group sessions for
    /// distinct (grade, subject) pairs at the same slot.
    fn has_individual_booking(&self, slot: &str, teacher: &str) -> bool {
        self.schedule.iter().any(|entry| {
            entry.time_slot == slot
                && entry.teacher == teacher
                && entry.course_type == CourseType::Individual
        })
    }

    /// True if the student is already listed in any entry at this slot.
    fn student_busy(&self, slot: &str, student: &str) -> bool {
        self.schedule.iter().any(|entry| {
            entry.time_slot == slot && entry.students.iter().any(|name| name == student)
        })
    }

    /// Places every individual-course student, in input order. Each failure
    /// aborts the whole run.
    fn place_individuals(&mut self, students: &[Student]) -> Result<(), ScheduleError> {
        let teachers = self.teachers;
        let catalog = self.catalog;
        for student in students
            .iter()
            .filter(|s| s.course_type == CourseType::Individual)
        {
            let requested = student.preferred_teacher.as_deref().unwrap_or_default();
            let teacher = teachers
                .iter()
                .find(|t| t.name == requested)
                .ok_or_else(|| ScheduleError::UnresolvedTeacher {
                    student: student.name.clone(),
                    teacher: requested.to_string(),
                })?;
            ensure_qualified(teacher, &student.grade, &student.subject)?;

            let slots = catalog.slots_for_grade(&student.grade);
            let slot = slots
                .iter()
                .find(|slot| {
                    is_available(slot, &student.availability)
                        && is_available(slot, &teacher.availability)
                        && !self.has_conflict(slot, &teacher.name, &student.name)
                })
                .ok_or_else(|| ScheduleError::UnplaceableStudent {
                    student: student.name.clone(),
                })?;

            trace!(
                "placed {} with {} at {}",
                student.name, teacher.name, slot
            );
            self.schedule.push(SessionEntry {
                time_slot: slot.clone(),
                teacher: teacher.name.clone(),
                students: vec![student.name.clone()],
                course_type: CourseType::Individual,
                grade: student.grade.clone(),
                subject: student.subject.clone(),
            });
        }
        Ok(())
    }

    /// Places every group-course student. Students are batched by
    /// (grade, subject) in first-encountered order; within a batch the
    /// requested-teacher sub-partitions go first, then the leftover pool is
    /// offered to every qualified teacher in input order.
    fn place_groups(&mut self, students: &[Student]) -> Result<(), ScheduleError> {
        let teachers = self.teachers;
        let catalog = self.catalog;
        let group_students: Vec<&Student> = students
            .iter()
            .filter(|s| s.course_type == CourseType::Group)
            .collect();

        // (grade, subject) batches, keyed in first-encountered order
        let mut batches: Vec<((String, String), Vec<&Student>)> = Vec::new();
        for student in &group_students {
            let key = (student.grade.clone(), student.subject.clone());
            match batches.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(*student),
                None => batches.push((key, vec![*student])),
            }
        }

        for ((grade, subject), members) in &batches {
            let slots = catalog.slots_for_grade(grade);

            // requested-teacher sub-partitions, first-encountered order
            let mut requested: Vec<(&str, Vec<&Student>)> = Vec::new();
            for student in members {
                if let Some(name) = student.preferred_teacher.as_deref().filter(|n| !n.is_empty())
                {
                    match requested.iter_mut().find(|(t, _)| *t == name) {
                        Some((_, list)) => list.push(*student),
                        None => requested.push((name, vec![*student])),
                    }
                }
            }

            for (teacher_name, wanting) in &requested {
                let teacher = teachers
                    .iter()
                    .find(|t| t.name == *teacher_name)
                    .ok_or_else(|| ScheduleError::UnresolvedTeacher {
                        student: wanting[0].name.clone(),
                        teacher: teacher_name.to_string(),
                    })?;
                ensure_qualified(teacher, grade, subject)?;
                self.fill_group_sessions(teacher, wanting, slots, grade, subject);
            }

            // leftover pool: unassigned members, offered to qualified teachers
            let remaining: Vec<&Student> = members
                .iter()
                .filter(|s| !self.assigned.contains(&s.name))
                .copied()
                .collect();
            if !remaining.is_empty() {
                let qualified: Vec<&Teacher> = teachers
                    .iter()
                    .filter(|t| {
                        t.grades.iter().any(|g| g == grade)
                            && t.subjects.iter().any(|s| s == subject)
                    })
                    .collect();
                if qualified.is_empty() {
                    return Err(ScheduleError::NoQualifiedTeacher {
                        grade: grade.clone(),
                        subject: subject.clone(),
                    });
                }
                for teacher in qualified {
                    self.fill_group_sessions(teacher, &remaining, slots, grade, subject);
                }
            }
        }

        let unplaced: Vec<String> = group_students
            .iter()
            .filter(|s| !self.assigned.contains(&s.name))
            .map(|s| s.name.clone())
            .collect();
        if !unplaced.is_empty() {
            return Err(ScheduleError::UnplaceableGroup(unplaced));
        }
        Ok(())
    }

    /// Scans the slot sequence once for one teacher, gathering every
    /// still-unassigned candidate who fits each slot into an existing or new
    /// group entry. A candidate set can end up split across several slots.
    fn fill_group_sessions(
        &mut self,
        teacher: &Teacher,
        candidates: &[&Student],
        slots: &[String],
        grade: &str,
        subject: &str,
    ) {
        for slot in slots {
            if !is_available(slot, &teacher.availability) {
                continue;
            }
            if self.has_individual_booking(slot, &teacher.name) {
                continue;
            }

            let joiners: Vec<&Student> = candidates
                .iter()
                .filter(|s| !self.assigned.contains(&s.name))
                .filter(|s| is_available(slot, &s.availability))
                .filter(|s| !self.student_busy(slot, &s.name))
                .copied()
                .collect();
            if joiners.is_empty() {
                continue;
            }

            let existing = self.schedule.iter().position(|entry| {
                entry.time_slot == *slot
                    && entry.teacher == teacher.name
                    && entry.course_type == CourseType::Group
                    && entry.grade == grade
                    && entry.subject == subject
            });
            match existing {
                Some(index) => self.schedule[index]
                    .students
                    .extend(joiners.iter().map(|s| s.name.clone())),
                None => self.schedule.push(SessionEntry {
                    time_slot: slot.clone(),
                    teacher: teacher.name.clone(),
                    students: joiners.iter().map(|s| s.name.clone()).collect(),
                    course_type: CourseType::Group,
                    grade: grade.to_string(),
                    subject: subject.to_string(),
                }),
            }
            for student in &joiners {
                trace!(
                    "placed {} in {} {} group with {} at {}",
                    student.name, grade, subject, teacher.name, slot
                );
                self.assigned.insert(student.name.clone());
            }
        }
    }
}

fn ensure_qualified(teacher: &Teacher, grade: &str, subject: &str) -> Result<(), ScheduleError> {
    if !teacher.grades.iter().any(|g| g == grade)
        || !teacher.subjects.iter().any(|s| s == subject)
    {
        return Err(ScheduleError::CapabilityMismatch {
            teacher: teacher.name.clone(),
            grade: grade.to_string(),
            subject: subject.to_string(),
        });
    }
    Ok(())
}
