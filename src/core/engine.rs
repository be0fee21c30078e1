use crate::core::assignment::{CapacityTable, CommitteeAssignmentEngine};
use crate::core::scheduler::PresentationScheduler;
use crate::core::slots::SlotGenerator;
use crate::core::swap::SwapConflictChecker;
use crate::domain::model::{
    AssignmentReport, Committee, PresentationId, ProfessorClashGroup, ScheduleOutcome, StudentId,
};
use crate::domain::ports::{SchedulingSettings, ThesisStore};
use crate::utils::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::time::Instant;

/// Entry point tying the store to the assignment, scheduling and swap steps.
pub struct DefenseEngine<S: ThesisStore> {
    store: S,
    seed: Option<u64>,
}

impl<S: ThesisStore> DefenseEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store, seed: None }
    }

    /// Fixed seed for repeatable runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub async fn assign_committees(&self) -> Result<AssignmentReport> {
        let started = Instant::now();
        let mut committees = self.store.get_committees().await?;
        let capacities = self.store.get_professor_capacities().await?;
        let mut table = CapacityTable::from_capacities(&capacities);

        let report = CommitteeAssignmentEngine::new(&self.store, self.rng())
            .assign_missing_committees(&mut committees, &mut table)
            .await?;

        tracing::debug!("Assignment pass took {:?}", started.elapsed());
        Ok(report)
    }

    pub async fn schedule<C: SchedulingSettings>(&self, settings: &C) -> Result<ScheduleOutcome> {
        let started = Instant::now();
        let classrooms = settings.classrooms()?;
        let slots = SlotGenerator::new(settings.duration_minutes(), settings.lunch_break()?)
            .generate(&classrooms);
        tracing::info!(
            "🏫 {} candidate slots from {} classrooms",
            slots.len(),
            classrooms.len()
        );

        let committees = self.store.get_committees().await?;
        let clear_existing = settings.clear_existing();

        let mut scheduler = PresentationScheduler::new(&self.store, self.rng());
        let committees: Vec<Committee> = if clear_existing {
            committees
        } else {
            // 保留既有簡報，只排尚未排定的委員會
            let existing = self.store.get_presentations().await?;
            let booked: HashSet<StudentId> =
                existing.iter().map(|p| p.committee.student.id).collect();
            scheduler = scheduler.with_reserved(&existing);
            committees
                .into_iter()
                .filter(|c| !booked.contains(&c.student.id))
                .collect()
        };

        let outcome = scheduler.schedule(committees, slots, clear_existing).await?;
        tracing::debug!("Scheduling pass took {:?}", started.elapsed());
        Ok(outcome)
    }

    pub async fn check_swap(
        &self,
        a: PresentationId,
        b: PresentationId,
    ) -> Result<Vec<ProfessorClashGroup>> {
        SwapConflictChecker::new(&self.store).check_clashes(a, b).await
    }

    pub async fn swap(&self, a: PresentationId, b: PresentationId) -> Result<()> {
        SwapConflictChecker::new(&self.store).swap(a, b).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{InMemoryStore, StoreState};
    use crate::domain::model::{AvailabilityWindow, ClassroomAvailability, LunchBreak};
    use chrono::{NaiveDate, NaiveDateTime};

    struct Settings {
        classrooms: Vec<ClassroomAvailability>,
        clear_existing: bool,
    }

    impl SchedulingSettings for Settings {
        fn classrooms(&self) -> Result<Vec<ClassroomAvailability>> {
            Ok(self.classrooms.clone())
        }

        fn duration_minutes(&self) -> i64 {
            60
        }

        fn lunch_break(&self) -> Result<Option<LunchBreak>> {
            Ok(None)
        }

        fn clear_existing(&self) -> bool {
            self.clear_existing
        }
    }

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn settings(from: u32, to: u32, clear_existing: bool) -> Settings {
        Settings {
            classrooms: vec![ClassroomAvailability {
                name: "A-101".to_string(),
                windows: vec![AvailabilityWindow {
                    start: at(from),
                    end: at(to),
                }],
            }],
            clear_existing,
        }
    }

    fn department() -> InMemoryStore {
        let mut state = StoreState::default();
        state.add_professor(1, "Ada", Some(2));
        state.add_professor(2, "Alan", Some(2));
        state.add_professor(3, "Grace", Some(2));
        state.add_student(10, "Sam");
        state.add_student(11, "Kim");
        InMemoryStore::new(state)
    }

    #[tokio::test]
    async fn test_assign_then_schedule() {
        let engine = DefenseEngine::new(department()).with_seed(42);

        let report = engine.assign_committees().await.unwrap();
        assert_eq!(report.committees_considered, 2);
        assert!(report.incomplete.is_empty());

        // 三位教授都在兩個委員會裡，必須錯開時段
        let outcome = engine.schedule(&settings(8, 12, true)).await.unwrap();
        assert_eq!(outcome.resolved.len(), 2);
        assert!(outcome.unresolved.is_empty());
        assert_ne!(outcome.resolved[0].start, outcome.resolved[1].start);
    }

    #[tokio::test]
    async fn test_keeping_existing_presentations() {
        let engine = DefenseEngine::new(department()).with_seed(1);
        engine.assign_committees().await.unwrap();
        engine.schedule(&settings(8, 9, true)).await.unwrap();

        let outcome = engine.schedule(&settings(8, 10, false)).await.unwrap();

        assert_eq!(outcome.resolved.len(), 2);
        assert!(outcome.unresolved.is_empty());
        let starts: Vec<_> = outcome.resolved.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![at(8), at(9)]);
    }
}
