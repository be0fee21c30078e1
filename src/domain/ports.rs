use crate::domain::model::{
    ClassroomAvailability, Committee, LunchBreak, NewPresentation, Presentation, PresentationId,
    PresentationUpdate, ProfessorCapacity, ProfessorId, StudentId,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Record storage for committees and presentations.
///
/// Every write method is a single transaction: it is applied completely or
/// not at all.
#[async_trait]
pub trait ThesisStore: Send + Sync {
    async fn get_committees(&self) -> Result<Vec<Committee>>;

    async fn get_professor_capacities(&self) -> Result<Vec<ProfessorCapacity>>;

    /// No-op when the (student, professor) pair already exists.
    async fn assign_professor_to_student(
        &self,
        student_id: StudentId,
        professor_id: ProfessorId,
        is_advisor: bool,
    ) -> Result<()>;

    async fn bulk_insert_presentations(
        &self,
        presentations: &[NewPresentation],
        clear_existing: bool,
    ) -> Result<()>;

    async fn get_presentations(&self) -> Result<Vec<Presentation>>;

    async fn get_presentation_by_id(&self, id: PresentationId) -> Result<Presentation>;

    /// Applies all updates in one transaction.
    async fn update_presentations(&self, updates: &[PresentationUpdate]) -> Result<()>;

    async fn update_presentation_time_and_room(&self, update: PresentationUpdate) -> Result<()> {
        self.update_presentations(std::slice::from_ref(&update)).await
    }
}

/// Inputs of one scheduling run.
pub trait SchedulingSettings: Send + Sync {
    fn classrooms(&self) -> Result<Vec<ClassroomAvailability>>;
    fn duration_minutes(&self) -> i64;
    fn lunch_break(&self) -> Result<Option<LunchBreak>>;
    fn clear_existing(&self) -> bool;
}
