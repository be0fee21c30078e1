use crate::domain::model::{
    Presentation, PresentationId, PresentationUpdate, ProfessorClashGroup, ProfessorId,
};
use crate::domain::ports::ThesisStore;
use crate::utils::error::{DefenseError, Result};
use std::collections::BTreeMap;

/// Finds the professor overlaps that exchanging the time and room of `a`
/// and `b` would introduce.
///
/// A professor sitting on both committees keeps the same two intervals after
/// the exchange, so only professors on exactly one of them can clash. A
/// presentation that already overlaps the moved one's current interval is a
/// clash that exists before the swap and is not reported.
pub fn find_clashes(
    a: &Presentation,
    b: &Presentation,
    others: &[Presentation],
) -> Vec<ProfessorClashGroup> {
    let mut groups: BTreeMap<ProfessorId, ProfessorClashGroup> = BTreeMap::new();

    for (moved, destination) in [(a, b), (b, a)] {
        for member in &moved.committee.members {
            if destination.committee.contains(member.professor_id) {
                continue;
            }

            let blocking: Vec<&Presentation> = others
                .iter()
                .filter(|p| p.id != a.id && p.id != b.id)
                .filter(|p| p.committee.contains(member.professor_id))
                .filter(|p| p.overlaps(destination.start, destination.end))
                .filter(|p| !p.overlaps(moved.start, moved.end))
                .collect();
            if blocking.is_empty() {
                continue;
            }

            let group = groups
                .entry(member.professor_id)
                .or_insert_with(|| ProfessorClashGroup {
                    professor_id: member.professor_id,
                    professor_name: member.professor_name.clone(),
                    presentation_ids: vec![moved.id],
                    presentations: vec![moved.name().to_string()],
                });
            for presentation in blocking {
                if !group.presentation_ids.contains(&presentation.id) {
                    group.presentation_ids.push(presentation.id);
                    group.presentations.push(presentation.name().to_string());
                }
            }
        }
    }

    groups.into_values().collect()
}

pub struct SwapConflictChecker<'a, S: ThesisStore> {
    store: &'a S,
}

impl<'a, S: ThesisStore> SwapConflictChecker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn check_clashes(
        &self,
        a: PresentationId,
        b: PresentationId,
    ) -> Result<Vec<ProfessorClashGroup>> {
        let presentations = self.store.get_presentations().await?;
        let find = |id: PresentationId| {
            presentations
                .iter()
                .find(|p| p.id == id)
                .ok_or(DefenseError::PresentationNotFound(id.0))
        };
        let first = find(a)?;
        let second = find(b)?;

        let clashes = find_clashes(first, second, &presentations);
        tracing::debug!(
            "Swap {} <-> {} would create {} professor clashes",
            a,
            b,
            clashes.len()
        );
        Ok(clashes)
    }

    /// Exchanges start, end and classroom of the two presentations.
    ///
    /// Does not check for clashes; call `check_clashes` first when that
    /// matters.
    pub async fn swap(&self, a: PresentationId, b: PresentationId) -> Result<()> {
        let first = self.store.get_presentation_by_id(a).await?;
        let second = self.store.get_presentation_by_id(b).await?;
        if first.id == second.id {
            return Ok(());
        }

        let updates = [
            PresentationUpdate {
                id: first.id,
                start: second.start,
                end: second.end,
                classroom: second.classroom.clone(),
            },
            PresentationUpdate {
                id: second.id,
                start: first.start,
                end: first.end,
                classroom: first.classroom.clone(),
            },
        ];
        self.store.update_presentations(&updates).await?;

        tracing::info!(
            "🔁 Swapped {} ({} {}) with {} ({} {})",
            first.name(),
            first.classroom,
            first.start,
            second.name(),
            second.classroom,
            second.start
        );
        Ok(())
    }
}
