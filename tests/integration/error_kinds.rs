//! Integration tests for error kinds
//!
//! Declaration mistakes surface as configuration errors, a closed or
//! unreachable store as connectivity errors, and rejected writes as
//! constraint errors at commit. Nothing is retried.

mod common;

use common::seeded;
use roster::school::{
    ClassEntity, ClassModel, ClassStudents, NewClass, NewStudent, Scenario, StudentEntity,
};
use roster::{LifeError, LifeExecutor, LifeModelTrait, LoadingMode, Session, SqliteExecutor};
use tempfile::TempDir;

#[test]
fn test_dynamic_many_to_one_fails_at_declaration() {
    let err = ClassStudents::one_to_many("class_id")
        .loading(LoadingMode::Dynamic)
        .backref_loading(LoadingMode::Dynamic)
        .declare()
        .unwrap_err();
    assert!(err.is_configuration(), "{err}");
}

#[test]
fn test_dynamic_one_to_one_fails_at_declaration() {
    let err = ClassStudents::one_to_one("class_id")
        .loading(LoadingMode::Dynamic)
        .declare()
        .unwrap_err();
    assert!(matches!(err, LifeError::Configuration(_)));
}

#[test]
fn test_malformed_connection_string() {
    for url in ["", "postgres://localhost/db", "sqlite://host/file.db"] {
        let err = SqliteExecutor::open(url).unwrap_err();
        assert!(err.is_configuration(), "{url}: {err}");
    }
}

#[test]
fn test_unreachable_store() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:///{}", dir.path().join("missing").join("store.db").display());
    let err = SqliteExecutor::open(&url).unwrap_err();
    assert!(err.is_connectivity(), "{err}");
}

#[test]
fn test_reads_after_close_fail_with_connectivity() {
    let (executor, rel, roster) = seeded(Scenario::LazySelect);
    executor.close().unwrap();

    let english = roster.class("English").unwrap();
    assert!(rel.forward(english, &executor).unwrap_err().is_connectivity());
    assert!(ClassEntity::find().all(&executor).unwrap_err().is_connectivity());

    let mut session = Session::new();
    session.add(NewClass::new("History")).unwrap();
    assert!(session.commit(&executor).unwrap_err().is_connectivity());
}

#[test]
fn test_missing_class_is_a_constraint_error_at_commit() {
    let (executor, _, _) = seeded(Scenario::LazyDynamicOneToMany);

    let mut session = Session::new();
    session.add(NewClass::new("History")).unwrap();
    session.add(NewStudent::in_class("Lee", 99)).unwrap();
    let err = session.commit(&executor).unwrap_err();
    assert!(err.is_constraint(), "{err}");

    // the whole batch was rolled back
    assert_eq!(ClassEntity::find().count(&executor).unwrap(), 3);
    assert_eq!(StudentEntity::find().count(&executor).unwrap(), 3);
}

#[test]
fn test_registration_to_missing_class_is_rejected() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicManyToMany);
    let toms_classes = rel
        .backward(roster.student("Tom").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();
    let ghost = ClassModel {
        id: 99,
        name: "Ghost".to_string(),
    };

    let mut session = Session::new();
    toms_classes.append(&mut session, roster.class("Spanish").unwrap());
    toms_classes.append(&mut session, &ghost);
    assert!(session.commit(&executor).unwrap_err().is_constraint());

    assert_eq!(toms_classes.count(&executor).unwrap(), 2);
    let row = executor
        .query_one(r#"SELECT COUNT(*) FROM "registrations""#, &[])
        .unwrap();
    assert_eq!(row.get_idx::<i64>(0).unwrap(), 6);
}

#[test]
fn test_wrong_shape_is_reported() {
    let (executor, rel, roster) = seeded(Scenario::LazySelect);
    let loaded = rel.forward(roster.class("English").unwrap(), &executor).unwrap();
    assert!(loaded.into_query().unwrap_err().is_configuration());
}
