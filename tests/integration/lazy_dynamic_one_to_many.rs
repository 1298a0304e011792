//! Integration tests for one-to-many dynamic loading
//!
//! `Class.students` returns a query handle; the `Student` back-reference stays
//! an eagerly loaded single value.

mod common;

use common::{repr, seeded};
use roster::school::{ClassEntity, NewStudent, Scenario, StudentEntity, StudentModel};
use roster::{ExprTrait, LifeModelTrait, Loaded, Order, Session};

#[test]
fn test_class_students_is_a_query_handle() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let english = roster.class("English").unwrap();

    let loaded = rel.forward(english, &executor).unwrap();
    assert!(loaded.is_dynamic());
    assert!(loaded.as_many().is_none());
    assert!(loaded.to_string().starts_with(r#"SELECT "students".* FROM "students""#));
    assert!(loaded.into_many().unwrap_err().is_configuration());
}

#[test]
fn test_all_matches_the_eager_list() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let (eager_executor, eager_rel, eager_roster) = seeded(Scenario::LazySelect);

    for class in &roster.classes {
        let dynamic = rel.forward(class, &executor).unwrap().into_query().unwrap();
        let eager_class = eager_roster.class(&class.name).unwrap();
        let eager = eager_rel
            .forward(eager_class, &eager_executor)
            .unwrap()
            .into_many()
            .unwrap();
        assert_eq!(dynamic.all(&executor).unwrap(), eager, "{class}");
    }
}

#[test]
fn test_filter_by_id_first() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let english = roster.class("English").unwrap();
    let students = rel.forward(english, &executor).unwrap().into_query().unwrap();

    let tom = roster.student("Tom").unwrap();
    assert_eq!(students.filter_by("id", tom.id).first(&executor).unwrap().as_ref(), Some(tom));

    // Sam exists but is in Math
    let sam = roster.student("Sam").unwrap();
    assert_eq!(students.filter_by("id", sam.id).first(&executor).unwrap(), None);
}

#[test]
fn test_all_is_idempotent() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let students = rel
        .forward(roster.class("English").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();

    let first = students.all(&executor).unwrap();
    let second = students.all(&executor).unwrap();
    assert_eq!(first, second);
    assert_eq!(repr(&first), "[<Student: 'Tom'>, <Student: 'Ray'>]");
}

#[test]
fn test_narrowed_handles_compose() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let students = rel
        .forward(roster.class("English").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();

    assert_eq!(students.count(&executor).unwrap(), 2);
    assert_eq!(students.filter_by("name", "Ray").count(&executor).unwrap(), 1);

    let by_name = students.order_by("name", Order::Asc);
    assert_eq!(repr(&by_name.all(&executor).unwrap()), "[<Student: 'Ray'>, <Student: 'Tom'>]");
    assert_eq!(repr(&by_name.limit(1).all(&executor).unwrap()), "[<Student: 'Ray'>]");
    assert_eq!(
        students.filter(StudentEntity::column("name").like("T%")).all(&executor).unwrap().len(),
        1
    );

    // the original handle is unchanged
    assert_eq!(students.all(&executor).unwrap().len(), 2);
}

#[test]
fn test_handle_is_built_without_the_store() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    executor.close().unwrap();

    let students = rel
        .forward(roster.class("English").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();
    assert!(students.all(&executor).unwrap_err().is_connectivity());
}

#[test]
fn test_append_assigns_the_foreign_key() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let math = rel
        .forward(roster.class("Math").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();
    let ray = roster.student("Ray").unwrap();

    let mut session = Session::new();
    math.append(&mut session, ray);
    // staged only
    assert_eq!(math.count(&executor).unwrap(), 1);
    session.commit(&executor).unwrap();

    assert_eq!(repr(&math.all(&executor).unwrap()), "[<Student: 'Ray'>, <Student: 'Sam'>]");
    let ray = StudentEntity::find_by_id(ray.id).one(&executor).unwrap().unwrap();
    let class = rel.backward(&ray, &executor).unwrap().into_one().unwrap();
    assert_eq!(class.map(|c| c.name), Some("Math".to_string()));
}

#[test]
fn test_append_of_absent_student_is_rejected() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let math = rel
        .forward(roster.class("Math").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();
    let ghost = StudentModel {
        id: 99,
        name: "Ghost".to_string(),
        class_id: None,
    };

    let mut session = Session::new();
    math.append(&mut session, &ghost);
    let err = session.commit(&executor).unwrap_err();
    assert!(err.is_constraint(), "{err}");

    assert_eq!(math.count(&executor).unwrap(), 1);
    assert_eq!(StudentEntity::find().count(&executor).unwrap(), 3);
}

#[test]
fn test_append_a_new_student() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let spanish = rel
        .forward(roster.class("Spanish").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();

    let mut session = Session::new();
    let lee = session.add(NewStudent::new("Lee")).unwrap();
    spanish.append(&mut session, lee);
    session.commit(&executor).unwrap();

    assert_eq!(repr(&spanish.all(&executor).unwrap()), "[<Student: 'Lee'>]");
}

#[test]
fn test_remove_only_clears_the_edge() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let english = rel
        .forward(roster.class("English").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();
    let tom = roster.student("Tom").unwrap();

    let mut session = Session::new();
    english.remove(&mut session, tom);
    session.commit(&executor).unwrap();

    assert_eq!(repr(&english.all(&executor).unwrap()), "[<Student: 'Ray'>]");
    let tom = StudentEntity::find_by_id(tom.id).one(&executor).unwrap().unwrap();
    assert_eq!(tom.class_id, None);
    assert_eq!(StudentEntity::find().count(&executor).unwrap(), 3);
    assert_eq!(ClassEntity::find().count(&executor).unwrap(), 3);
}

#[test]
fn test_backref_stays_single_valued() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicOneToMany);
    let tom = roster.student("Tom").unwrap();
    let loaded = rel.backward(tom, &executor).unwrap();
    assert!(matches!(loaded, Loaded::One(Some(ref class)) if class.name == "English"));
}
