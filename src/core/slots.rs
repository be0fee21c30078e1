use crate::domain::model::{ClassroomAvailability, LunchBreak, PresentationSlot};
use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

/// Splits classroom availability into fixed-length presentation slots.
///
/// Slots are emitted classroom by classroom, window by window, morning
/// segment before afternoon segment. The scheduler scans them in exactly this
/// order, so the order decides ties. Slots with an identical interval in
/// several classrooms are merged into the first entry created for it.
pub struct SlotGenerator {
    interval: Duration,
    lunch_break: Option<LunchBreak>,
}

impl SlotGenerator {
    pub fn new(interval_minutes: i64, lunch_break: Option<LunchBreak>) -> Self {
        Self {
            interval: Duration::minutes(interval_minutes),
            lunch_break: lunch_break.filter(|lunch| !lunch.is_empty()),
        }
    }

    pub fn generate(&self, classrooms: &[ClassroomAvailability]) -> Vec<PresentationSlot> {
        let mut slots: Vec<PresentationSlot> = Vec::new();
        let mut index: HashMap<(NaiveDateTime, NaiveDateTime), usize> = HashMap::new();

        if self.interval <= Duration::zero() {
            tracing::warn!("⚠️ Slot interval must be positive, no slots generated");
            return slots;
        }

        for classroom in classrooms {
            for window in &classroom.windows {
                if window.end <= window.start {
                    tracing::warn!(
                        "⚠️ Skipping empty availability window {} - {} in {}",
                        window.start,
                        window.end,
                        classroom.name
                    );
                    continue;
                }

                for (segment_start, segment_end) in self.segments(window.start, window.end) {
                    for (start, end) in self.slice(segment_start, segment_end) {
                        match index.get(&(start, end)) {
                            Some(&position) => {
                                slots[position].classrooms.push(classroom.name.clone())
                            }
                            None => {
                                index.insert((start, end), slots.len());
                                slots.push(PresentationSlot {
                                    start,
                                    end,
                                    classrooms: vec![classroom.name.clone()],
                                });
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!(
            "Generated {} slots from {} classrooms",
            slots.len(),
            classrooms.len()
        );
        slots
    }

    /// 午休切成前後兩段；任一段可能為空
    fn segments(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        match self.lunch_break {
            None => vec![(window_start, window_end)],
            Some(lunch) => {
                let date = window_start.date();
                let lunch_start = date.and_time(lunch.start);
                let lunch_end = date.and_time(lunch.end);
                vec![
                    (window_start, lunch_start.min(window_end)),
                    (lunch_end.max(window_start), window_end),
                ]
            }
        }
    }

    fn slice(
        &self,
        segment_start: NaiveDateTime,
        segment_end: NaiveDateTime,
    ) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        let length = segment_end - segment_start;
        if length <= Duration::zero() {
            return Vec::new();
        }
        let count = length.num_minutes() / self.interval.num_minutes();

        (0..count)
            .map(|i| {
                let start = segment_start + self.interval * (i as i32);
                (start, start + self.interval)
            })
            .collect()
    }
}

pub fn generate_slots(
    classrooms: &[ClassroomAvailability],
    interval_minutes: i64,
    lunch_break: Option<LunchBreak>,
) -> Vec<PresentationSlot> {
    SlotGenerator::new(interval_minutes, lunch_break).generate(classrooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AvailabilityWindow;
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn room(name: &str, windows: &[(NaiveDateTime, NaiveDateTime)]) -> ClassroomAvailability {
        ClassroomAvailability {
            name: name.to_string(),
            windows: windows
                .iter()
                .map(|&(start, end)| AvailabilityWindow { start, end })
                .collect(),
        }
    }

    fn lunch(start: u32, end: u32) -> Option<LunchBreak> {
        Some(LunchBreak {
            start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        })
    }

    #[test]
    fn test_morning_window_without_break_gives_four_hourly_slots() {
        let slots = generate_slots(&[room("A-101", &[(at(8, 0), at(12, 0))])], 60, None);

        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start, at(8, 0));
        assert_eq!(slots[3].end, at(12, 0));
        assert!(slots.iter().all(|s| s.classrooms == vec!["A-101".to_string()]));
    }

    #[test]
    fn test_lunch_break_splits_window_and_drops_remainders() {
        let slots = generate_slots(
            &[room("A-101", &[(at(8, 0), at(16, 0))])],
            90,
            lunch(12, 13),
        );

        let intervals: Vec<_> = slots.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(
            intervals,
            vec![
                (at(8, 0), at(9, 30)),
                (at(9, 30), at(11, 0)),
                (at(13, 0), at(14, 30)),
                (at(14, 30), at(16, 0)),
            ]
        );
    }

    #[test]
    fn test_equal_lunch_times_mean_no_break() {
        let slots = generate_slots(
            &[room("A-101", &[(at(11, 0), at(14, 0))])],
            60,
            lunch(12, 12),
        );
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[1].start, at(12, 0));
    }

    #[test]
    fn test_identical_intervals_merge_across_classrooms() {
        let slots = generate_slots(
            &[
                room("A-101", &[(at(8, 0), at(10, 0))]),
                room("B-202", &[(at(8, 0), at(10, 0))]),
            ],
            60,
            None,
        );

        assert_eq!(slots.len(), 2);
        assert_eq!(
            slots[0].classrooms,
            vec!["A-101".to_string(), "B-202".to_string()]
        );
    }

    #[test]
    fn test_inverted_window_yields_no_slots() {
        let slots = generate_slots(&[room("A-101", &[(at(12, 0), at(8, 0))])], 60, None);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_afternoon_only_window_ignores_morning_segment() {
        let slots = generate_slots(
            &[room("A-101", &[(at(12, 30), at(15, 0))])],
            60,
            lunch(12, 13),
        );

        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(13, 0), at(14, 0)]);
    }

    #[test]
    fn test_order_follows_classroom_then_window() {
        let slots = generate_slots(
            &[
                room("A-101", &[(at(10, 0), at(11, 0)), (at(8, 0), at(9, 0))]),
                room("B-202", &[(at(9, 0), at(10, 0))]),
            ],
            60,
            None,
        );

        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(10, 0), at(8, 0), at(9, 0)]);
    }
}
