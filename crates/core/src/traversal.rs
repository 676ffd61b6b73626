//! Progress computation over a loaded course tree.
//!
//! Everything here is pure: storage loads rows, these functions derive the
//! per-user view (completed lessons, the active lesson, lesson percentages).
//!
//! Rules:
//! - a lesson is completed iff it has challenges and every one of them has at
//!   least one completed progress record for the user;
//! - the active lesson is the first lesson, in (unit order, lesson order),
//!   with at least one challenge lacking a completed record;
//! - a lesson is locked unless it is completed or is the active lesson.

use std::collections::{HashMap, HashSet};

use crate::model::{
    Challenge, ChallengeId, ChallengeOption, ChallengeProgress, Lesson, LessonId, Unit, UnitId,
    UserId,
};

//
// ─── COMPLETION SET ────────────────────────────────────────────────────────────
//

/// Challenges a user has completed at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedChallenges(HashSet<ChallengeId>);

impl CompletedChallenges {
    /// Collect completed challenge ids for `user`, ignoring other users' rows
    /// and records that are not completed.
    #[must_use]
    pub fn from_records<'a>(
        user: &UserId,
        records: impl IntoIterator<Item = &'a ChallengeProgress>,
    ) -> Self {
        Self(
            records
                .into_iter()
                .filter(|record| record.completed && &record.user_id == user)
                .map(|record| record.challenge_id)
                .collect(),
        )
    }

    #[must_use]
    pub fn contains(&self, id: ChallengeId) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ChallengeId> for CompletedChallenges {
    fn from_iter<T: IntoIterator<Item = ChallengeId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//
// ─── DERIVED VIEWS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonStatus {
    pub lesson: Lesson,
    pub completed: bool,
}

/// A unit with its ordered lessons and their completion flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitProgress {
    pub unit: Unit,
    pub lessons: Vec<LessonStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLesson {
    pub unit: Unit,
    pub lesson: Lesson,
}

/// Where the user currently is within their active course.
///
/// `active_lesson` is `None` once every lesson is completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseProgress {
    pub active_lesson: Option<ActiveLesson>,
}

impl CourseProgress {
    #[must_use]
    pub fn active_lesson_id(&self) -> Option<LessonId> {
        self.active_lesson.as_ref().map(|active| active.lesson.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeStatus {
    pub challenge: Challenge,
    pub completed: bool,
    pub options: Vec<ChallengeOption>,
}

/// A lesson ready to be played: ordered challenges with options and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDetail {
    pub lesson: Lesson,
    pub challenges: Vec<ChallengeStatus>,
}

impl LessonDetail {
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.challenges.iter().filter(|c| c.completed).count()
    }

    /// Rounded share of completed challenges, 0 for an empty lesson.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        completion_percentage(self.completed_count(), self.challenges.len())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.challenges.is_empty() && self.challenges.iter().all(|c| c.completed)
    }

    /// Index of the first challenge the user still has to complete.
    #[must_use]
    pub fn first_incomplete_index(&self) -> Option<usize> {
        self.challenges.iter().position(|c| !c.completed)
    }
}

/// Display state of a lesson button on the learn page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonButtonState {
    pub locked: bool,
    pub current: bool,
    pub completed: bool,
    /// Progress ring value; only set on the current lesson.
    pub percentage: Option<u8>,
}

impl LessonButtonState {
    #[must_use]
    pub fn for_lesson(
        status: &LessonStatus,
        active_lesson_id: Option<LessonId>,
        active_percentage: u8,
    ) -> Self {
        let current = active_lesson_id == Some(status.lesson.id());
        Self {
            locked: !status.completed && !current,
            current,
            completed: status.completed,
            percentage: current.then_some(active_percentage),
        }
    }
}

/// Rounded `completed / total * 100`, clamped to 0..=100.
#[must_use]
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    let rounded = (completed * 200 + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── COURSE OUTLINE ────────────────────────────────────────────────────────────
//

/// The ordered unit → lesson → challenge tree of one course.
#[derive(Debug, Clone, Default)]
pub struct CourseOutline {
    units: Vec<Unit>,
    lessons: HashMap<UnitId, Vec<Lesson>>,
    challenges: HashMap<LessonId, Vec<Challenge>>,
}

impl CourseOutline {
    /// Group and order rows loaded from storage. Rows whose parent is not part
    /// of the tree are dropped.
    #[must_use]
    pub fn new(mut units: Vec<Unit>, lessons: Vec<Lesson>, challenges: Vec<Challenge>) -> Self {
        units.sort_by_key(Unit::sort_key);
        let unit_ids: HashSet<UnitId> = units.iter().map(Unit::id).collect();

        let mut by_unit: HashMap<UnitId, Vec<Lesson>> = HashMap::new();
        for lesson in lessons {
            if unit_ids.contains(&lesson.unit_id()) {
                by_unit.entry(lesson.unit_id()).or_default().push(lesson);
            }
        }
        for group in by_unit.values_mut() {
            group.sort_by_key(Lesson::sort_key);
        }

        let lesson_ids: HashSet<LessonId> =
            by_unit.values().flatten().map(Lesson::id).collect();
        let mut by_lesson: HashMap<LessonId, Vec<Challenge>> = HashMap::new();
        for challenge in challenges {
            if lesson_ids.contains(&challenge.lesson_id()) {
                by_lesson
                    .entry(challenge.lesson_id())
                    .or_default()
                    .push(challenge);
            }
        }
        for group in by_lesson.values_mut() {
            group.sort_by_key(Challenge::sort_key);
        }

        Self {
            units,
            lessons: by_unit,
            challenges: by_lesson,
        }
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[must_use]
    pub fn lessons_in(&self, unit_id: UnitId) -> &[Lesson] {
        self.lessons.get(&unit_id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn challenges_in(&self, lesson_id: LessonId) -> &[Challenge] {
        self.challenges.get(&lesson_id).map_or(&[], Vec::as_slice)
    }

    /// All challenge ids in the course, for fetching the user's progress rows.
    #[must_use]
    pub fn challenge_ids(&self) -> Vec<ChallengeId> {
        self.challenges.values().flatten().map(Challenge::id).collect()
    }

    /// Lessons in traversal order, paired with their unit.
    pub fn ordered_lessons(&self) -> impl Iterator<Item = (&Unit, &Lesson)> + '_ {
        self.units
            .iter()
            .flat_map(|unit| self.lessons_in(unit.id()).iter().map(move |l| (unit, l)))
    }

    #[must_use]
    pub fn find_lesson(&self, lesson_id: LessonId) -> Option<(&Unit, &Lesson)> {
        self.ordered_lessons()
            .find(|(_, lesson)| lesson.id() == lesson_id)
    }

    /// True when at least one unit has a lesson the user could open.
    #[must_use]
    pub fn has_lessons(&self) -> bool {
        self.ordered_lessons().next().is_some()
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: LessonId, done: &CompletedChallenges) -> bool {
        let challenges = self.challenges_in(lesson_id);
        !challenges.is_empty() && challenges.iter().all(|c| done.contains(c.id()))
    }

    fn has_incomplete_challenge(&self, lesson_id: LessonId, done: &CompletedChallenges) -> bool {
        self.challenges_in(lesson_id)
            .iter()
            .any(|c| !done.contains(c.id()))
    }

    /// Units in order with per-lesson completion flags.
    #[must_use]
    pub fn units_with_progress(&self, done: &CompletedChallenges) -> Vec<UnitProgress> {
        self.units
            .iter()
            .map(|unit| UnitProgress {
                unit: unit.clone(),
                lessons: self
                    .lessons_in(unit.id())
                    .iter()
                    .map(|lesson| LessonStatus {
                        lesson: lesson.clone(),
                        completed: self.is_lesson_completed(lesson.id(), done),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Locate the first lesson that still has an uncompleted challenge.
    #[must_use]
    pub fn course_progress(&self, done: &CompletedChallenges) -> CourseProgress {
        let active_lesson = self
            .ordered_lessons()
            .find(|(_, lesson)| self.has_incomplete_challenge(lesson.id(), done))
            .map(|(unit, lesson)| ActiveLesson {
                unit: unit.clone(),
                lesson: lesson.clone(),
            });
        CourseProgress { active_lesson }
    }

    /// Build the playable view of a lesson. `options` may contain options of
    /// other challenges; they are matched by challenge id.
    #[must_use]
    pub fn lesson_detail(
        &self,
        lesson_id: LessonId,
        options: &[ChallengeOption],
        done: &CompletedChallenges,
    ) -> Option<LessonDetail> {
        let (_, lesson) = self.find_lesson(lesson_id)?;

        let mut by_challenge: HashMap<ChallengeId, Vec<ChallengeOption>> = HashMap::new();
        for option in options {
            by_challenge
                .entry(option.challenge_id())
                .or_default()
                .push(option.clone());
        }

        let challenges = self
            .challenges_in(lesson_id)
            .iter()
            .map(|challenge| {
                let mut options = by_challenge.remove(&challenge.id()).unwrap_or_default();
                options.sort_by_key(ChallengeOption::id);
                ChallengeStatus {
                    challenge: challenge.clone(),
                    completed: done.contains(challenge.id()),
                    options,
                }
            })
            .collect();

        Some(LessonDetail {
            lesson: lesson.clone(),
            challenges,
        })
    }

    /// Completion percentage of a single lesson; 0 for unknown or empty lessons.
    #[must_use]
    pub fn lesson_percentage(&self, lesson_id: LessonId, done: &CompletedChallenges) -> u8 {
        let challenges = self.challenges_in(lesson_id);
        let completed = challenges.iter().filter(|c| done.contains(c.id())).count();
        completion_percentage(completed, challenges.len())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChallengeKind, ChallengeOptionId, ChallengeProgressId, CourseId};
    use crate::time::fixed_now;

    fn unit(id: u64, order: u32) -> Unit {
        Unit::new(UnitId::new(id), CourseId::new(1), format!("Unit {id}"), "desc", order)
            .unwrap()
    }

    fn lesson(id: u64, unit_id: u64, order: u32) -> Lesson {
        Lesson::new(LessonId::new(id), UnitId::new(unit_id), format!("L{id}"), order).unwrap()
    }

    fn challenge(id: u64, lesson_id: u64, order: u32) -> Challenge {
        Challenge::new(
            ChallengeId::new(id),
            LessonId::new(lesson_id),
            ChallengeKind::Select,
            format!("Q{id}"),
            order,
        )
        .unwrap()
    }

    fn option(id: u64, challenge_id: u64, correct: bool) -> ChallengeOption {
        ChallengeOption::new(
            ChallengeOptionId::new(id),
            ChallengeId::new(challenge_id),
            format!("opt{id}"),
            correct,
            None,
            None,
        )
        .unwrap()
    }

    fn done(ids: &[u64]) -> CompletedChallenges {
        ids.iter().copied().map(ChallengeId::new).collect()
    }

    /// Unit 1 (order 1): lesson 1 [c1, c2], lesson 2 [c3]
    /// Unit 2 (order 2): lesson 3 [c4], lesson 4 []
    fn outline() -> CourseOutline {
        CourseOutline::new(
            vec![unit(2, 2), unit(1, 1)],
            vec![lesson(2, 1, 2), lesson(1, 1, 1), lesson(3, 2, 1), lesson(4, 2, 2)],
            vec![
                challenge(2, 1, 2),
                challenge(1, 1, 1),
                challenge(3, 2, 1),
                challenge(4, 3, 1),
            ],
        )
    }

    #[test]
    fn completed_challenges_filter_user_and_flag() {
        let me = UserId::new("me").unwrap();
        let other = UserId::new("other").unwrap();
        let record = |id: u64, user: &UserId, completed: bool| ChallengeProgress {
            id: ChallengeProgressId::new(id),
            user_id: user.clone(),
            challenge_id: ChallengeId::new(id),
            completed,
            updated_at: fixed_now(),
        };
        let records = [record(1, &me, true), record(2, &me, false), record(3, &other, true)];

        let set = CompletedChallenges::from_records(&me, &records);
        assert!(set.contains(ChallengeId::new(1)));
        assert!(!set.contains(ChallengeId::new(2)));
        assert!(!set.contains(ChallengeId::new(3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn outline_orders_units_and_lessons() {
        let outline = outline();
        let order: Vec<u64> = outline
            .ordered_lessons()
            .map(|(_, lesson)| lesson.id().value())
            .collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        let challenges: Vec<u64> = outline
            .challenges_in(LessonId::new(1))
            .iter()
            .map(|c| c.id().value())
            .collect();
        assert_eq!(challenges, vec![1, 2]);
    }

    #[test]
    fn outline_drops_orphan_rows() {
        let outline = CourseOutline::new(
            vec![unit(1, 1)],
            vec![lesson(1, 1, 1), lesson(9, 99, 1)],
            vec![challenge(1, 1, 1), challenge(5, 9, 1)],
        );
        assert!(outline.find_lesson(LessonId::new(9)).is_none());
        assert_eq!(outline.challenge_ids(), vec![ChallengeId::new(1)]);
    }

    #[test]
    fn lesson_completed_requires_every_challenge() {
        let outline = outline();
        assert!(!outline.is_lesson_completed(LessonId::new(1), &done(&[1])));
        assert!(outline.is_lesson_completed(LessonId::new(1), &done(&[1, 2])));
    }

    #[test]
    fn empty_lesson_is_never_completed() {
        let outline = outline();
        assert!(!outline.is_lesson_completed(LessonId::new(4), &done(&[1, 2, 3, 4])));
    }

    #[test]
    fn active_lesson_is_first_with_incomplete_challenge() {
        let outline = outline();

        let progress = outline.course_progress(&done(&[]));
        assert_eq!(progress.active_lesson_id(), Some(LessonId::new(1)));

        let progress = outline.course_progress(&done(&[1, 2]));
        assert_eq!(progress.active_lesson_id(), Some(LessonId::new(2)));

        let progress = outline.course_progress(&done(&[1, 2, 3]));
        let active = progress.active_lesson.unwrap();
        assert_eq!(active.lesson.id(), LessonId::new(3));
        assert_eq!(active.unit.id(), UnitId::new(2));
    }

    #[test]
    fn active_lesson_skips_completed_gaps() {
        // Lesson 2 completed out of order; lesson 1 is still the active one.
        let outline = outline();
        let progress = outline.course_progress(&done(&[3]));
        assert_eq!(progress.active_lesson_id(), Some(LessonId::new(1)));
    }

    #[test]
    fn finished_course_has_no_active_lesson() {
        let outline = outline();
        let progress = outline.course_progress(&done(&[1, 2, 3, 4]));
        assert_eq!(progress.active_lesson_id(), None);
    }

    #[test]
    fn units_with_progress_flags_lessons() {
        let outline = outline();
        let units = outline.units_with_progress(&done(&[1, 2]));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit.id(), UnitId::new(1));
        let flags: Vec<bool> = units[0].lessons.iter().map(|l| l.completed).collect();
        assert_eq!(flags, vec![true, false]);
        assert!(!units[1].lessons[1].completed);
    }

    #[test]
    fn lesson_detail_attaches_sorted_options_and_flags() {
        let outline = outline();
        let options = vec![option(2, 1, false), option(1, 1, true), option(3, 2, true)];
        let detail = outline
            .lesson_detail(LessonId::new(1), &options, &done(&[1]))
            .unwrap();

        assert_eq!(detail.challenges.len(), 2);
        assert!(detail.challenges[0].completed);
        assert!(!detail.challenges[1].completed);
        let ids: Vec<u64> = detail.challenges[0]
            .options
            .iter()
            .map(|o| o.id().value())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(detail.percentage(), 50);
        assert_eq!(detail.first_incomplete_index(), Some(1));
        assert!(!detail.is_completed());
    }

    #[test]
    fn lesson_detail_unknown_lesson_is_none() {
        assert!(outline()
            .lesson_detail(LessonId::new(42), &[], &done(&[]))
            .is_none());
    }

    #[test]
    fn percentage_rounds_and_handles_empty() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(5, 3), 100);
        assert_eq!(outline().lesson_percentage(LessonId::new(4), &done(&[])), 0);
    }

    #[test]
    fn button_state_locks_everything_but_completed_and_current() {
        let outline = outline();
        let done = done(&[1, 2]);
        let progress = outline.course_progress(&done);
        let units = outline.units_with_progress(&done);

        let states: Vec<LessonButtonState> = units
            .iter()
            .flat_map(|u| u.lessons.iter())
            .map(|status| LessonButtonState::for_lesson(status, progress.active_lesson_id(), 0))
            .collect();

        assert!(!states[0].locked && states[0].completed && !states[0].current);
        assert!(!states[1].locked && states[1].current);
        assert_eq!(states[1].percentage, Some(0));
        assert!(states[2].locked && states[3].locked);
        assert_eq!(states[2].percentage, None);
    }
}
