use super::state::StoreState;
use crate::domain::model::{
    Committee, NewPresentation, Presentation, PresentationId, PresentationUpdate,
    ProfessorCapacity, ProfessorId, StudentId,
};
use crate::domain::ports::ThesisStore;
use crate::utils::error::{DefenseError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store kept entirely in memory.
///
/// `fail_writes_after(n)` lets `n` write transactions succeed and rejects
/// every later one, leaving the state untouched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    write_budget: Arc<Mutex<Option<usize>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new(state: StoreState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Self::default()
        }
    }

    pub async fn fail_writes_after(&self, successful_writes: usize) {
        *self.write_budget.lock().await = Some(successful_writes);
    }

    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    /// Number of committed write transactions.
    pub fn committed_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn transaction<F>(&self, mutation: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState) -> Result<()>,
    {
        {
            let mut budget = self.write_budget.lock().await;
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(DefenseError::StorageError {
                        message: "write rejected by the in-memory store".to_string(),
                    });
                }
                *remaining -= 1;
            }
        }

        let mut state = self.state.lock().await;
        let mut working = state.clone();
        mutation(&mut working)?;
        *state = working;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ThesisStore for InMemoryStore {
    async fn get_committees(&self) -> Result<Vec<Committee>> {
        self.state.lock().await.committees()
    }

    async fn get_professor_capacities(&self) -> Result<Vec<ProfessorCapacity>> {
        Ok(self.state.lock().await.professor_capacities())
    }

    async fn assign_professor_to_student(
        &self,
        student_id: StudentId,
        professor_id: ProfessorId,
        is_advisor: bool,
    ) -> Result<()> {
        self.transaction(|state| {
            state
                .assign_professor_to_student(student_id, professor_id, is_advisor)
                .map(|_| ())
        })
        .await
    }

    async fn bulk_insert_presentations(
        &self,
        presentations: &[NewPresentation],
        clear_existing: bool,
    ) -> Result<()> {
        self.transaction(|state| state.insert_presentations(presentations, clear_existing))
            .await
    }

    async fn get_presentations(&self) -> Result<Vec<Presentation>> {
        self.state.lock().await.presentations()
    }

    async fn get_presentation_by_id(&self, id: PresentationId) -> Result<Presentation> {
        self.state.lock().await.presentation(id)
    }

    async fn update_presentations(&self, updates: &[PresentationUpdate]) -> Result<()> {
        self.transaction(|state| state.update_presentations(updates))
            .await
    }
}
