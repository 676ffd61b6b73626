//! Sample catalogue used for local development and demos.

use lingo_core::model::{
    Challenge, ChallengeId, ChallengeKind, ChallengeOption, ChallengeOptionId, Course, CourseId,
    Lesson, LessonId, Unit, UnitId,
};
use thiserror::Error;

use crate::repository::{Storage, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Invalid(#[from] lingo_core::Error),
}

/// Row counts written by [`seed_sample_content`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub courses: usize,
    pub units: usize,
    pub lessons: usize,
    pub challenges: usize,
    pub options: usize,
}

const COURSES: &[(u64, &str, &str)] = &[
    (1, "Spanish", "/es.svg"),
    (2, "Italian", "/it.svg"),
    (3, "French", "/fr.svg"),
    (4, "Croatian", "/hr.svg"),
];

const SPANISH: u64 = 1;

const SPANISH_LESSONS: &[&str] = &["Nouns", "Verbs", "Verbs", "Verbs", "Verbs"];

struct OptionSeed {
    text: &'static str,
    correct: bool,
    image: Option<&'static str>,
    audio: &'static str,
}

struct ChallengeSeed {
    lesson: u64,
    kind: ChallengeKind,
    question: &'static str,
    correct: &'static str,
    with_images: bool,
}

const WORDS: &[(&str, &str, &str)] = &[
    ("el hombre", "/man.svg", "/es_man.mp3"),
    ("la mujer", "/woman.svg", "/es_woman.mp3"),
    ("el robot", "/robot.svg", "/es_robot.mp3"),
    ("el zombie", "/zombie.svg", "/es_zombie.mp3"),
];

const CHALLENGES: &[ChallengeSeed] = &[
    ChallengeSeed {
        lesson: 1,
        kind: ChallengeKind::Select,
        question: "Which one of these is \"the man\"?",
        correct: "el hombre",
        with_images: true,
    },
    ChallengeSeed {
        lesson: 1,
        kind: ChallengeKind::Assist,
        question: "\"the man\"",
        correct: "el hombre",
        with_images: false,
    },
    ChallengeSeed {
        lesson: 1,
        kind: ChallengeKind::Select,
        question: "Which one of these is \"the robot\"?",
        correct: "el robot",
        with_images: true,
    },
    ChallengeSeed {
        lesson: 2,
        kind: ChallengeKind::Select,
        question: "Which one of these is \"the woman\"?",
        correct: "la mujer",
        with_images: true,
    },
    ChallengeSeed {
        lesson: 2,
        kind: ChallengeKind::Assist,
        question: "\"the zombie\"",
        correct: "el zombie",
        with_images: false,
    },
    ChallengeSeed {
        lesson: 2,
        kind: ChallengeKind::Select,
        question: "Which one of these is \"the zombie\"?",
        correct: "el zombie",
        with_images: true,
    },
];

fn options_for(seed: &ChallengeSeed) -> Vec<OptionSeed> {
    // Three choices per challenge: the answer plus the first two other words.
    let mut picked: Vec<&(&str, &str, &str)> = WORDS
        .iter()
        .filter(|(text, _, _)| *text != seed.correct)
        .take(2)
        .collect();
    if let Some(answer) = WORDS.iter().find(|(text, _, _)| *text == seed.correct) {
        picked.push(answer);
    }
    picked.sort_by_key(|(text, _, _)| WORDS.iter().position(|(t, _, _)| t == text));

    picked
        .into_iter()
        .map(|&(text, image, audio)| OptionSeed {
            text,
            correct: text == seed.correct,
            image: seed.with_images.then_some(image),
            audio,
        })
        .collect()
}

/// Wipe all content and user state, then insert the sample catalogue.
///
/// # Errors
///
/// Returns `SeedError` if a write fails or a sample row fails validation.
pub async fn seed_sample_content(storage: &Storage) -> Result<SeedReport, SeedError> {
    storage.user_progress.delete_all_user_progress().await?;
    storage.courses.delete_all_courses().await?;
    tracing::info!("cleared existing content and user progress");

    let mut report = SeedReport::default();

    for &(id, title, image) in COURSES {
        let course = Course::new(CourseId::new(id), title, image).map_err(lingo_core::Error::from)?;
        storage.courses.upsert_course(&course).await?;
        report.courses += 1;
    }

    let unit = Unit::new(
        UnitId::new(1),
        CourseId::new(SPANISH),
        "Unit 1",
        "Learn the basics of Spanish",
        1,
    )
    .map_err(lingo_core::Error::from)?;
    storage.curriculum.upsert_unit(&unit).await?;
    report.units += 1;

    for (order, title) in (1_u32..).zip(SPANISH_LESSONS) {
        let lesson = Lesson::new(LessonId::new(u64::from(order)), unit.id(), *title, order)
            .map_err(lingo_core::Error::from)?;
        storage.curriculum.upsert_lesson(&lesson).await?;
        report.lessons += 1;
    }

    let mut next_option = 1_u64;
    let mut order_in_lesson = 0_u32;
    let mut current_lesson = 0_u64;
    for (id, seed) in (1_u64..).zip(CHALLENGES) {
        if seed.lesson != current_lesson {
            current_lesson = seed.lesson;
            order_in_lesson = 0;
        }
        order_in_lesson += 1;

        let challenge = Challenge::new(
            ChallengeId::new(id),
            LessonId::new(seed.lesson),
            seed.kind,
            seed.question,
            order_in_lesson,
        )
        .map_err(lingo_core::Error::from)?;
        storage.curriculum.upsert_challenge(&challenge).await?;
        report.challenges += 1;

        for option in options_for(seed) {
            let option = ChallengeOption::new(
                ChallengeOptionId::new(next_option),
                challenge.id(),
                option.text,
                option.correct,
                option.image.map(str::to_owned),
                Some(option.audio.to_owned()),
            )
            .map_err(lingo_core::Error::from)?;
            storage.curriculum.upsert_option(&option).await?;
            next_option += 1;
            report.options += 1;
        }
    }

    tracing::info!(?report, "seeded sample content");
    Ok(report)
}
