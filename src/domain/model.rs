use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const COMMITTEE_SIZE: usize = 3;
pub const READERS_PER_COMMITTEE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfessorId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresentationId(pub i64);

impl fmt::Display for PresentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
    /// 建議指導人數上限；缺省代表不收指導學生
    #[serde(default)]
    pub suggested_capacity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub professor_id: ProfessorId,
    pub professor_name: String,
    pub is_advisor: bool,
}

/// A student together with the professors sitting on their defense committee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    pub student: Student,
    pub members: Vec<CommitteeMember>,
}

impl Committee {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            members: Vec::new(),
        }
    }

    pub fn advisor(&self) -> Option<&CommitteeMember> {
        self.members.iter().find(|m| m.is_advisor)
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor().is_some()
    }

    pub fn reader_count(&self) -> usize {
        self.members.iter().filter(|m| !m.is_advisor).count()
    }

    pub fn is_complete(&self) -> bool {
        self.members.len() == COMMITTEE_SIZE
    }

    pub fn contains(&self, professor_id: ProfessorId) -> bool {
        self.members.iter().any(|m| m.professor_id == professor_id)
    }

    pub fn professor_ids(&self) -> BTreeSet<ProfessorId> {
        self.members.iter().map(|m| m.professor_id).collect()
    }

    pub fn summary(&self) -> CommitteeSummary {
        CommitteeSummary {
            student_id: self.student.id,
            student_name: self.student.name.clone(),
            advisor: self.advisor().map(|m| m.professor_name.clone()),
            readers: self
                .members
                .iter()
                .filter(|m| !m.is_advisor)
                .map(|m| m.professor_name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeSummary {
    pub student_id: StudentId,
    pub student_name: String,
    pub advisor: Option<String>,
    pub readers: Vec<String>,
}

/// Advisor load of one professor as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorCapacity {
    pub professor_id: ProfessorId,
    pub name: String,
    pub current_assigned_count: i64,
    pub suggested_capacity: Option<i64>,
}

impl ProfessorCapacity {
    pub fn available(&self) -> i64 {
        self.suggested_capacity.unwrap_or(0) - self.current_assigned_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomAvailability {
    pub name: String,
    pub windows: Vec<AvailabilityWindow>,
}

/// Daily break; equal start and end means there is no break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBreak {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LunchBreak {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A candidate interval and the classrooms still free during it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classrooms: Vec<String>,
}

/// A presentation about to be written; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPresentation {
    pub student_id: StudentId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classroom: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: PresentationId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classroom: String,
    pub committee: Committee,
}

impl Presentation {
    /// Presentations are named after the student defending.
    pub fn name(&self) -> &str {
        &self.committee.student.name
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        intervals_overlap(self.start, self.end, start, end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationUpdate {
    pub id: PresentationId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classroom: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorClashGroup {
    pub professor_id: ProfessorId,
    pub professor_name: String,
    pub presentation_ids: Vec<PresentationId>,
    pub presentations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub resolved: Vec<Presentation>,
    pub unresolved: Vec<CommitteeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReport {
    pub committees_considered: usize,
    pub advisors_assigned: usize,
    pub readers_assigned: usize,
    pub incomplete: Vec<CommitteeSummary>,
}

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)`.
pub fn intervals_overlap(
    start1: NaiveDateTime,
    end1: NaiveDateTime,
    start2: NaiveDateTime,
    end2: NaiveDateTime,
) -> bool {
    start1 < end2 && start2 < end1
}
