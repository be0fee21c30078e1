use crate::domain::model::{
    intervals_overlap, Committee, NewPresentation, Presentation, PresentationSlot, ProfessorId,
    ScheduleOutcome, StudentId,
};
use crate::domain::ports::ThesisStore;
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

/// A room and its professors held for an interval.
#[derive(Debug, Clone)]
struct Booking {
    start: NaiveDateTime,
    end: NaiveDateTime,
    classroom: String,
    professors: BTreeSet<ProfessorId>,
}

impl Booking {
    fn blocks(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        classroom: &str,
        professors: &BTreeSet<ProfessorId>,
    ) -> bool {
        if !intervals_overlap(self.start, self.end, start, end) {
            return false;
        }
        self.classroom == classroom || !self.professors.is_disjoint(professors)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPresentation {
    pub committee: Committee,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classroom: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchedulePlan {
    pub placed: Vec<PlannedPresentation>,
    pub unresolved: Vec<Committee>,
}

/// Greedy first-fit placement of committees into slots.
///
/// Committees are tried in random order. Each takes the first slot, in
/// generation order, that has a classroom free of room and professor
/// conflicts; the classroom is then removed from that slot.
pub struct PresentationScheduler<'a, S: ThesisStore, R: Rng> {
    store: &'a S,
    rng: R,
    reserved: Vec<Booking>,
}

impl<'a, S: ThesisStore, R: Rng> PresentationScheduler<'a, S, R> {
    pub fn new(store: &'a S, rng: R) -> Self {
        Self {
            store,
            rng,
            reserved: Vec::new(),
        }
    }

    /// Existing presentations that new placements must not conflict with.
    pub fn with_reserved(mut self, presentations: &[Presentation]) -> Self {
        self.reserved = presentations
            .iter()
            .map(|p| Booking {
                start: p.start,
                end: p.end,
                classroom: p.classroom.clone(),
                professors: p.committee.professor_ids(),
            })
            .collect();
        self
    }

    /// Places committees without touching the store.
    pub fn plan(
        &mut self,
        mut committees: Vec<Committee>,
        mut slots: Vec<PresentationSlot>,
    ) -> SchedulePlan {
        committees.shuffle(&mut self.rng);

        let mut bookings = self.reserved.clone();
        let mut plan = SchedulePlan::default();

        for committee in committees {
            let professors = committee.professor_ids();
            let mut placement = None;

            for slot in slots.iter_mut() {
                let free = slot.classrooms.iter().position(|classroom| {
                    !bookings
                        .iter()
                        .any(|b| b.blocks(slot.start, slot.end, classroom, &professors))
                });
                if let Some(position) = free {
                    let classroom = slot.classrooms.remove(position);
                    placement = Some((slot.start, slot.end, classroom));
                    break;
                }
            }

            match placement {
                Some((start, end, classroom)) => {
                    tracing::debug!(
                        "Placed {} in {} at {}",
                        committee.student.name,
                        classroom,
                        start
                    );
                    bookings.push(Booking {
                        start,
                        end,
                        classroom: classroom.clone(),
                        professors,
                    });
                    plan.placed.push(PlannedPresentation {
                        committee,
                        start,
                        end,
                        classroom,
                    });
                }
                None => {
                    tracing::debug!("No slot left for {}", committee.student.name);
                    plan.unresolved.push(committee);
                }
            }
        }

        plan
    }

    /// Plans the committees, writes the placements in one batch and returns
    /// the presentations as stored.
    pub async fn schedule(
        &mut self,
        committees: Vec<Committee>,
        slots: Vec<PresentationSlot>,
        clear_existing: bool,
    ) -> Result<ScheduleOutcome> {
        let total = committees.len();
        let plan = self.plan(committees, slots);

        let batch: Vec<NewPresentation> = plan
            .placed
            .iter()
            .map(|p| NewPresentation {
                student_id: p.committee.student.id,
                start: p.start,
                end: p.end,
                classroom: p.classroom.clone(),
            })
            .collect();
        self.store
            .bulk_insert_presentations(&batch, clear_existing)
            .await?;

        let resolved = self.store.get_presentations().await?;
        let placed: HashSet<StudentId> = plan
            .placed
            .iter()
            .map(|p| p.committee.student.id)
            .collect();
        let unresolved = plan
            .unresolved
            .iter()
            .filter(|c| !placed.contains(&c.student.id))
            .map(Committee::summary)
            .collect::<Vec<_>>();

        tracing::info!(
            "📅 Scheduled {} of {} committees, {} unresolved",
            plan.placed.len(),
            total,
            unresolved.len()
        );

        Ok(ScheduleOutcome {
            resolved,
            unresolved,
        })
    }
}
