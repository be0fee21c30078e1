use crate::domain::model::{
    AssignmentReport, Committee, CommitteeMember, ProfessorCapacity, ProfessorId,
    COMMITTEE_SIZE, READERS_PER_COMMITTEE,
};
use crate::domain::ports::ThesisStore;
use crate::utils::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityEntry {
    pub name: String,
    pub remaining: i64,
}

/// Advisor capacity left per professor during one assignment run.
///
/// Every professor in the table is a candidate reader; only advisor picks
/// consume capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapacityTable {
    entries: BTreeMap<ProfessorId, CapacityEntry>,
}

impl CapacityTable {
    pub fn from_capacities(capacities: &[ProfessorCapacity]) -> Self {
        let entries = capacities
            .iter()
            .map(|c| {
                (
                    c.professor_id,
                    CapacityEntry {
                        name: c.name.clone(),
                        remaining: c.available(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn remaining(&self, professor_id: ProfessorId) -> Option<i64> {
        self.entries.get(&professor_id).map(|e| e.remaining)
    }

    pub fn name(&self, professor_id: ProfessorId) -> Option<&str> {
        self.entries.get(&professor_id).map(|e| e.name.as_str())
    }

    pub fn professors(&self) -> Vec<ProfessorId> {
        self.entries.keys().copied().collect()
    }

    fn consume(&mut self, professor_id: ProfessorId) {
        if let Some(entry) = self.entries.get_mut(&professor_id) {
            entry.remaining -= 1;
        }
    }

    fn member(&self, professor_id: ProfessorId, is_advisor: bool) -> CommitteeMember {
        CommitteeMember {
            professor_id,
            professor_name: self.name(professor_id).unwrap_or_default().to_string(),
            is_advisor,
        }
    }
}

/// Fills in missing advisors and readers at random.
pub struct CommitteeAssignmentEngine<'a, S: ThesisStore, R: Rng> {
    store: &'a S,
    rng: R,
}

impl<'a, S: ThesisStore, R: Rng> CommitteeAssignmentEngine<'a, S, R> {
    pub fn new(store: &'a S, rng: R) -> Self {
        Self { store, rng }
    }

    /// Completes `committees` in place and writes every pair to the store
    /// as soon as its committee has been processed.
    ///
    /// Running out of professors is not an error: such committees are left
    /// incomplete and listed in the report.
    pub async fn assign_missing_committees(
        &mut self,
        committees: &mut [Committee],
        capacities: &mut CapacityTable,
    ) -> Result<AssignmentReport> {
        let mut pool = capacities.professors();
        pool.shuffle(&mut self.rng);

        let mut pending: Vec<&mut Committee> = committees
            .iter_mut()
            .filter(|c| c.members.len() < COMMITTEE_SIZE)
            .collect();
        pending.shuffle(&mut self.rng);

        let mut report = AssignmentReport {
            committees_considered: pending.len(),
            ..AssignmentReport::default()
        };

        tracing::info!(
            "👥 Assigning committees: {} incomplete, {} professors in pool",
            pending.len(),
            pool.len()
        );

        for committee in pending {
            if !committee.has_advisor() {
                // 已是讀者的教授不能再當指導教授
                let advisor = pool
                    .iter()
                    .copied()
                    .filter(|&id| !committee.contains(id))
                    .find(|&id| capacities.remaining(id).unwrap_or(0) > 0);

                match advisor {
                    Some(professor_id) => {
                        capacities.consume(professor_id);
                        committee.members.push(capacities.member(professor_id, true));
                        report.advisors_assigned += 1;
                        tracing::debug!(
                            "Advisor {:?} assigned to {}",
                            professor_id,
                            committee.student.name
                        );
                    }
                    None => {
                        tracing::warn!(
                            "⚠️ No advisor capacity left for {}",
                            committee.student.name
                        );
                    }
                }
            }

            // 讀者不檢查容量
            let mut readers_needed = READERS_PER_COMMITTEE.saturating_sub(committee.reader_count());
            while readers_needed > 0 {
                let mut candidates: Vec<ProfessorId> = pool
                    .iter()
                    .copied()
                    .filter(|&id| !committee.contains(id))
                    .collect();
                candidates.shuffle(&mut self.rng);

                let Some(reader) = candidates.pop() else {
                    break;
                };
                committee.members.push(capacities.member(reader, false));
                readers_needed -= 1;
                report.readers_assigned += 1;
            }

            for member in &committee.members {
                self.store
                    .assign_professor_to_student(
                        committee.student.id,
                        member.professor_id,
                        member.is_advisor,
                    )
                    .await?;
            }

            if !committee.is_complete() {
                report.incomplete.push(committee.summary());
            }
        }

        tracing::info!(
            "✅ Assignment finished: {} advisors, {} readers added, {} committees still incomplete",
            report.advisors_assigned,
            report.readers_assigned,
            report.incomplete.len()
        );

        Ok(report)
    }
}
