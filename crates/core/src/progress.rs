//! Completion progress per enrolled course.
//!
//! Enrollment records written before lesson totals were tracked carry no
//! total, and totals captured at enrollment go stale when a course grows.
//! The reconciler repairs the denominator from the public catalog and clamps
//! the result so the figure shown is always a percentage.

use crate::model::{Catalog, CourseId, Enrollment, UserRecords, WatchRecord};

/// Derived completion figures for one enrolled course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub course_id: CourseId,
    pub title: String,
    /// Repaired lesson total, never zero.
    pub total_items: u32,
    pub watched_items: u32,
    /// Always within `0..=100`.
    pub percentage: u8,
}

impl ProgressRecord {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100
    }
}

/// Lesson total for an enrollment: own record, then catalog, then 1.
#[must_use]
pub fn repaired_total(enrollment: &Enrollment, catalog: &Catalog) -> u32 {
    enrollment
        .total_videos
        .filter(|&t| t > 0)
        .or_else(|| {
            catalog
                .find(&enrollment.course_id)
                .and_then(|entry| entry.total_videos())
                .filter(|&t| t > 0)
        })
        .unwrap_or(1)
}

/// Count watch records attributed to `course_id`.
///
/// Records without a course identifier are not matched against catalog
/// membership; they simply do not count.
#[must_use]
pub fn watched_count(course_id: &CourseId, watched: &[WatchRecord]) -> u32 {
    let count = watched
        .iter()
        .filter(|w| w.course_id.as_ref() == Some(course_id))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// `round(100 * watched / total)` with halves rounded up, clamped to 100.
///
/// A zero `total` is treated as 1.
#[must_use]
pub fn completion_percentage(watched: u32, total: u32) -> u8 {
    let total = u64::from(total.max(1));
    let watched = u64::from(watched);
    let rounded = (200 * watched + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Compute progress for every enrollment, in enrollment order.
#[must_use]
pub fn reconcile(
    enrollments: &[Enrollment],
    watched: &[WatchRecord],
    catalog: &Catalog,
) -> Vec<ProgressRecord> {
    enrollments
        .iter()
        .map(|enrollment| {
            let total_items = repaired_total(enrollment, catalog);
            let watched_items = watched_count(&enrollment.course_id, watched);
            ProgressRecord {
                course_id: enrollment.course_id.clone(),
                title: enrollment.title.clone(),
                total_items,
                watched_items,
                percentage: completion_percentage(watched_items, total_items),
            }
        })
        .collect()
}

/// Convenience over [`reconcile`] for a full user record set.
#[must_use]
pub fn reconcile_records(records: &UserRecords, catalog: &Catalog) -> Vec<ProgressRecord> {
    reconcile(records.enrollments(), records.watched(), catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogEntry, VideoId};

    fn course(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    fn enrollment(id: &str, total: Option<u32>) -> Enrollment {
        Enrollment {
            course_id: course(id),
            title: format!("Course {id}"),
            total_videos: total,
        }
    }

    fn watches(id: &str, n: usize) -> Vec<WatchRecord> {
        (0..n)
            .map(|i| WatchRecord {
                course_id: Some(course(id)),
                video_id: VideoId::new(format!("{id}-v{i}")).unwrap(),
            })
            .collect()
    }

    fn catalog(entries: &[(&str, Option<u32>)]) -> Catalog {
        Catalog::new(
            entries
                .iter()
                .map(|(id, total)| CatalogEntry::new(course(id), Some((*id).into()), *total))
                .collect(),
        )
    }

    #[test]
    fn zero_enrollment_total_falls_back_to_catalog() {
        let progress = reconcile(
            &[enrollment("c", Some(0))],
            &watches("c", 3),
            &catalog(&[("c", Some(10))]),
        );
        assert_eq!(progress[0].total_items, 10);
        assert_eq!(progress[0].watched_items, 3);
        assert_eq!(progress[0].percentage, 30);
    }

    #[test]
    fn stale_total_is_clamped_to_100() {
        let progress = reconcile(&[enrollment("c", Some(5))], &watches("c", 7), &Catalog::empty());
        assert_eq!(progress[0].percentage, 100);
        assert!(progress[0].is_complete());
    }

    #[test]
    fn no_total_anywhere_uses_floor_of_one() {
        let progress = reconcile(
            &[enrollment("c", None)],
            &[],
            &catalog(&[("c", None), ("other", Some(4))]),
        );
        assert_eq!(progress[0].total_items, 1);
        assert_eq!(progress[0].percentage, 0);
    }

    #[test]
    fn enrollment_total_wins_over_catalog() {
        let progress = reconcile(
            &[enrollment("c", Some(4))],
            &watches("c", 1),
            &catalog(&[("c", Some(10))]),
        );
        assert_eq!(progress[0].total_items, 4);
        assert_eq!(progress[0].percentage, 25);
    }

    #[test]
    fn records_without_course_do_not_count() {
        let mut watched = watches("c", 1);
        watched.push(WatchRecord {
            course_id: None,
            video_id: VideoId::new("legacy").unwrap(),
        });
        watched.extend(watches("other", 2));

        let progress = reconcile(&[enrollment("c", Some(4))], &watched, &Catalog::empty());
        assert_eq!(progress[0].watched_items, 1);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(3, 0), 100);
    }

    #[test]
    fn keeps_enrollment_order() {
        let progress = reconcile(
            &[enrollment("b", Some(2)), enrollment("a", Some(2))],
            &watches("a", 2),
            &Catalog::empty(),
        );
        let ids: Vec<_> = progress.iter().map(|p| p.course_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(progress[1].percentage, 100);
    }
}
