use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use defense_scheduler::domain::model::{NewPresentation, PresentationId, ProfessorId, StudentId};
use defense_scheduler::domain::ports::ThesisStore;
use defense_scheduler::{DefenseEngine, DefenseError, JsonFileStore, StoreState};
use tempfile::TempDir;

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 4)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Three scheduled defenses; Ada sits on Sam's and Lee's committees.
async fn scheduled_store(temp_dir: &TempDir) -> Result<JsonFileStore> {
    let mut state = StoreState::default();
    let professors = [
        (1, "Ada"),
        (2, "Alan"),
        (3, "Grace"),
        (4, "Edsger"),
        (5, "Barbara"),
        (6, "Donald"),
    ];
    for (id, name) in professors {
        state.add_professor(id, name, Some(2));
    }
    state.add_student(10, "Sam");
    state.add_student(11, "Kim");
    state.add_student(12, "Lee");

    let committees = [(10, [1, 2, 3]), (11, [4, 5, 6]), (12, [1, 4, 2])];
    for (student, professors) in committees {
        for (i, professor) in professors.into_iter().enumerate() {
            state.assign_professor_to_student(
                StudentId(student),
                ProfessorId(professor),
                i == 0,
            )?;
        }
    }

    let bookings = [(10, 9, "A-101"), (11, 11, "B-202"), (12, 11, "A-101")];
    let batch: Vec<NewPresentation> = bookings
        .into_iter()
        .map(|(student, hour, room)| NewPresentation {
            student_id: StudentId(student),
            start: at(hour),
            end: at(hour + 1),
            classroom: room.to_string(),
        })
        .collect();
    state.insert_presentations(&batch, true)?;

    Ok(JsonFileStore::create(temp_dir.path().join("store.json"), state).await?)
}

async fn presentation_of(store: &JsonFileStore, student: i64) -> Result<PresentationId> {
    Ok(store
        .get_presentations()
        .await?
        .into_iter()
        .find(|p| p.committee.student.id == StudentId(student))
        .map(|p| p.id)
        .expect("presentation exists"))
}

#[tokio::test]
async fn test_swap_into_a_busy_professor_hour_reports_clash() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = DefenseEngine::new(scheduled_store(&temp_dir).await?);
    let sam = presentation_of(engine.store(), 10).await?;
    let kim = presentation_of(engine.store(), 11).await?;

    let clashes = engine.check_swap(sam, kim).await?;

    // Sam 的委員會搬到 11 點會撞上 Lee（Ada、Alan）；Kim 的委員會搬到 9 點沒有衝突
    let names: Vec<&str> = clashes.iter().map(|c| c.professor_name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Alan"]);
    for clash in &clashes {
        assert_eq!(clash.presentations, vec!["Sam".to_string(), "Lee".to_string()]);
    }
    Ok(())
}

#[tokio::test]
async fn test_swap_is_unconditional_and_persisted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = DefenseEngine::new(scheduled_store(&temp_dir).await?);
    let sam = presentation_of(engine.store(), 10).await?;
    let kim = presentation_of(engine.store(), 11).await?;

    engine.swap(sam, kim).await?;

    let reopened = JsonFileStore::open(temp_dir.path().join("store.json")).await?;
    let moved = reopened.get_presentation_by_id(sam).await?;
    assert_eq!((moved.start, moved.classroom.as_str()), (at(11), "B-202"));
    assert_eq!(moved.name(), "Sam");

    let other = reopened.get_presentation_by_id(kim).await?;
    assert_eq!((other.start, other.classroom.as_str()), (at(9), "A-101"));
    assert_eq!(other.name(), "Kim");
    Ok(())
}

#[tokio::test]
async fn test_check_swap_with_unknown_presentation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = DefenseEngine::new(scheduled_store(&temp_dir).await?);
    let sam = presentation_of(engine.store(), 10).await?;

    let err = engine
        .check_swap(sam, PresentationId(999))
        .await
        .unwrap_err();
    assert!(matches!(err, DefenseError::PresentationNotFound(999)));
    Ok(())
}
