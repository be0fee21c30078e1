use crate::domain::model::{
    Committee, CommitteeMember, NewPresentation, Presentation, PresentationId, PresentationUpdate,
    Professor, ProfessorCapacity, ProfessorId, Student, StudentId, COMMITTEE_SIZE,
};
use crate::utils::error::{DefenseError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeRow {
    pub student_id: StudentId,
    pub professor_id: ProfessorId,
    pub is_advisor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationRow {
    pub id: PresentationId,
    pub student_id: StudentId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classroom: String,
}

/// Relational snapshot shared by the store adapters.
///
/// Mutations run against a clone and replace the original only on success,
/// which is how both adapters get all-or-nothing writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub professors: Vec<Professor>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub committee_members: Vec<CommitteeRow>,
    #[serde(default)]
    pub presentations: Vec<PresentationRow>,
    #[serde(default)]
    pub next_presentation_id: i64,
}

impl StoreState {
    pub fn add_professor(&mut self, id: i64, name: &str, suggested_capacity: Option<i64>) {
        self.professors.push(Professor {
            id: ProfessorId(id),
            name: name.to_string(),
            suggested_capacity,
        });
    }

    pub fn add_student(&mut self, id: i64, name: &str) {
        self.students.push(Student {
            id: StudentId(id),
            name: name.to_string(),
        });
    }

    fn professor(&self, id: ProfessorId) -> Result<&Professor> {
        self.professors
            .iter()
            .find(|p| p.id == id)
            .ok_or(DefenseError::ProfessorNotFound(id.0))
    }

    fn student(&self, id: StudentId) -> Result<&Student> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .ok_or(DefenseError::StudentNotFound(id.0))
    }

    fn committee_of(&self, student: &Student) -> Result<Committee> {
        let mut committee = Committee::new(student.clone());
        for row in self
            .committee_members
            .iter()
            .filter(|row| row.student_id == student.id)
        {
            let professor = self.professor(row.professor_id)?;
            committee.members.push(CommitteeMember {
                professor_id: professor.id,
                professor_name: professor.name.clone(),
                is_advisor: row.is_advisor,
            });
        }
        Ok(committee)
    }

    pub fn committees(&self) -> Result<Vec<Committee>> {
        self.students
            .iter()
            .map(|student| self.committee_of(student))
            .collect()
    }

    pub fn professor_capacities(&self) -> Vec<ProfessorCapacity> {
        self.professors
            .iter()
            .map(|professor| ProfessorCapacity {
                professor_id: professor.id,
                name: professor.name.clone(),
                current_assigned_count: self
                    .committee_members
                    .iter()
                    .filter(|row| row.is_advisor && row.professor_id == professor.id)
                    .count() as i64,
                suggested_capacity: professor.suggested_capacity,
            })
            .collect()
    }

    pub fn assign_professor_to_student(
        &mut self,
        student_id: StudentId,
        professor_id: ProfessorId,
        is_advisor: bool,
    ) -> Result<bool> {
        let student = self.student(student_id)?.clone();
        self.professor(professor_id)?;

        let rows: Vec<&CommitteeRow> = self
            .committee_members
            .iter()
            .filter(|row| row.student_id == student_id)
            .collect();

        if rows.iter().any(|row| row.professor_id == professor_id) {
            return Ok(false);
        }
        if rows.len() >= COMMITTEE_SIZE {
            return Err(DefenseError::CommitteeInvariant {
                student: student.name,
                message: format!("a committee has at most {} professors", COMMITTEE_SIZE),
            });
        }
        if is_advisor && rows.iter().any(|row| row.is_advisor) {
            return Err(DefenseError::CommitteeInvariant {
                student: student.name,
                message: "a committee has at most one advisor".to_string(),
            });
        }

        self.committee_members.push(CommitteeRow {
            student_id,
            professor_id,
            is_advisor,
        });
        Ok(true)
    }

    pub fn insert_presentations(
        &mut self,
        presentations: &[NewPresentation],
        clear_existing: bool,
    ) -> Result<()> {
        if clear_existing {
            self.presentations.clear();
        }
        for presentation in presentations {
            self.student(presentation.student_id)?;
            self.next_presentation_id += 1;
            self.presentations.push(PresentationRow {
                id: PresentationId(self.next_presentation_id),
                student_id: presentation.student_id,
                start: presentation.start,
                end: presentation.end,
                classroom: presentation.classroom.clone(),
            });
        }
        Ok(())
    }

    fn hydrate(&self, row: &PresentationRow) -> Result<Presentation> {
        let student = self.student(row.student_id)?;
        Ok(Presentation {
            id: row.id,
            start: row.start,
            end: row.end,
            classroom: row.classroom.clone(),
            committee: self.committee_of(student)?,
        })
    }

    pub fn presentations(&self) -> Result<Vec<Presentation>> {
        let mut rows: Vec<&PresentationRow> = self.presentations.iter().collect();
        rows.sort_by_key(|row| (row.start, row.classroom.clone(), row.id));
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    pub fn presentation(&self, id: PresentationId) -> Result<Presentation> {
        let row = self
            .presentations
            .iter()
            .find(|row| row.id == id)
            .ok_or(DefenseError::PresentationNotFound(id.0))?;
        self.hydrate(row)
    }

    pub fn update_presentations(&mut self, updates: &[PresentationUpdate]) -> Result<()> {
        let positions: HashMap<PresentationId, usize> = self
            .presentations
            .iter()
            .enumerate()
            .map(|(index, row)| (row.id, index))
            .collect();

        for update in updates {
            let index = *positions
                .get(&update.id)
                .ok_or(DefenseError::PresentationNotFound(update.id.0))?;
            let row = &mut self.presentations[index];
            row.start = update.start;
            row.end = update.end;
            row.classroom = update.classroom.clone();
        }
        Ok(())
    }
}
