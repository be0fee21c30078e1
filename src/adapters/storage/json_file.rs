use super::state::StoreState;
use crate::domain::model::{
    Committee, NewPresentation, Presentation, PresentationId, PresentationUpdate,
    ProfessorCapacity, ProfessorId, StudentId,
};
use crate::domain::ports::ThesisStore;
use crate::utils::error::{DefenseError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Store backed by a single JSON document.
///
/// Each write serialises the new state to a sibling temporary file and
/// renames it over the original, so a failed write never leaves a partially
/// updated document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            DefenseError::StorageError {
                message: format!("cannot read store {}: {}", path.display(), e),
            }
        })?;
        let state: StoreState = serde_json::from_str(&content)?;

        tracing::debug!(
            "Opened store {} ({} students, {} professors, {} presentations)",
            path.display(),
            state.students.len(),
            state.professors.len(),
            state.presentations.len()
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Writes `state` to `path` and opens it.
    pub async fn create<P: AsRef<Path>>(path: P, state: StoreState) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        persist(&path, &state).await?;
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    async fn transaction<F>(&self, mutation: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState) -> Result<()>,
    {
        let mut state = self.state.lock().await;
        let mut working = state.clone();
        mutation(&mut working)?;
        persist(&self.path, &working).await?;
        *state = working;
        Ok(())
    }
}

async fn persist(path: &Path, state: &StoreState) -> Result<()> {
    let data = serde_json::to_vec_pretty(state)?;
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let write = async {
        tokio::fs::write(&temp_path, &data).await?;
        tokio::fs::rename(&temp_path, path).await
    };
    write.await.map_err(|e| DefenseError::StorageError {
        message: format!("cannot write store {}: {}", path.display(), e),
    })
}

#[async_trait]
impl ThesisStore for JsonFileStore {
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
        {
            // 已存在的配對不需要重寫檔案
            let state = self.state.lock().await;
            if state
                .committee_members
                .iter()
                .any(|row| row.student_id == student_id && row.professor_id == professor_id)
            {
                return Ok(());
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let mut state = StoreState::default();
        state.add_professor(1, "Ada", Some(1));
        state.add_student(10, "Sam");

        let store = JsonFileStore::create(&path, state).await.unwrap();
        store
            .assign_professor_to_student(StudentId(10), ProfessorId(1), true)
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let committees = reopened.get_committees().await.unwrap();
        assert_eq!(committees.len(), 1);
        assert!(committees[0].has_advisor());
        assert!(!temp_dir.path().join("store.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejected_write_keeps_file_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let mut state = StoreState::default();
        state.add_professor(1, "Ada", Some(1));
        state.add_student(10, "Sam");
        let store = JsonFileStore::create(&path, state).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(store
            .assign_professor_to_student(StudentId(10), ProfessorId(42), false)
            .await
            .is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_a_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = JsonFileStore::open(temp_dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, DefenseError::StorageError { .. }));
    }
}
