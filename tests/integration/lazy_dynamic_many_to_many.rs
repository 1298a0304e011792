//! Integration tests for many-to-many dynamic loading
//!
//! Classes and students are paired through `registrations`; both
//! `Class.students` and the `Student` back-reference are query handles.

mod common;

use common::{empty, repr, seeded};
use roster::school::{NewClass, NewStudent, Scenario, StudentEntity};
use roster::{LifeExecutor, LifeModelTrait, Session};

fn registrations(executor: &impl LifeExecutor) -> i64 {
    executor
        .query_one(r#"SELECT COUNT(*) FROM "registrations""#, &[])
        .unwrap()
        .get_idx(0)
        .unwrap()
}

#[test]
fn test_both_directions_are_handles() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicManyToMany);
    let english = rel.forward(roster.class("English").unwrap(), &executor).unwrap();
    let tom = rel.backward(roster.student("Tom").unwrap(), &executor).unwrap();
    assert!(english.is_dynamic());
    assert!(tom.is_dynamic());
    assert!(english.to_string().contains(r#"INNER JOIN "registrations""#));
}

#[test]
fn test_seeded_pairs() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicManyToMany);
    let students_of = |name: &str| {
        let class = roster.class(name).unwrap();
        let students = rel.forward(class, &executor).unwrap().into_query().unwrap();
        repr(&students.all(&executor).unwrap())
    };
    let classes_of = |name: &str| {
        let student = roster.student(name).unwrap();
        let classes = rel.backward(student, &executor).unwrap().into_query().unwrap();
        repr(&classes.all(&executor).unwrap())
    };

    assert_eq!(students_of("English"), "[<Student: 'Tom'>, <Student: 'Ray'>]");
    assert_eq!(students_of("Spanish"), "[<Student: 'Ray'>, <Student: 'Sam'>]");
    assert_eq!(classes_of("Tom"), "[<Class: 'English'>, <Class: 'Math'>]");
    assert_eq!(classes_of("Sam"), "[<Class: 'Math'>, <Class: 'Spanish'>]");
}

#[test]
fn test_filter_by_id_first_through_the_junction() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicManyToMany);
    let english = rel
        .forward(roster.class("English").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();

    let tom = roster.student("Tom").unwrap();
    assert_eq!(english.filter_by("id", tom.id).first(&executor).unwrap().as_ref(), Some(tom));
    let sam = roster.student("Sam").unwrap();
    assert_eq!(english.filter_by("id", sam.id).first(&executor).unwrap(), None);
    assert_eq!(english.count(&executor).unwrap(), 2);
}

#[test]
fn test_append_through_backref_is_symmetric() {
    let (executor, rel) = empty(Scenario::LazyDynamicManyToMany);

    let mut session = Session::new();
    let english = session.add(NewClass::new("English")).unwrap();
    let math = session.add(NewClass::new("Math")).unwrap();
    let tom = session.add(NewStudent::new("Tom")).unwrap();
    let committed = session.commit(&executor).unwrap();
    let english = committed.load(english, &executor).unwrap();
    let math = committed.load(math, &executor).unwrap();
    let tom = committed.load(tom, &executor).unwrap();

    let toms_classes = rel.backward(&tom, &executor).unwrap().into_query().unwrap();
    toms_classes.append(&mut session, &english);
    session.commit(&executor).unwrap();

    let english_students = rel.forward(&english, &executor).unwrap().into_query().unwrap();
    let math_students = rel.forward(&math, &executor).unwrap().into_query().unwrap();
    assert_eq!(english_students.all(&executor).unwrap(), vec![tom.clone()]);
    assert_eq!(toms_classes.all(&executor).unwrap(), vec![english]);
    assert!(math_students.all(&executor).unwrap().is_empty());
}

#[test]
fn test_append_twice_keeps_one_pair() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicManyToMany);
    let english = rel
        .forward(roster.class("English").unwrap(), &executor)
        .unwrap()
        .into_query()
        .unwrap();
    let tom = roster.student("Tom").unwrap();
    let before = registrations(&executor);

    let mut session = Session::new();
    english.append(&mut session, tom);
    english.append(&mut session, tom);
    session.commit(&executor).unwrap();

    assert_eq!(registrations(&executor), before);
    assert_eq!(english.count(&executor).unwrap(), 2);
}

#[test]
fn test_remove_deletes_only_the_pair() {
    let (executor, rel, roster) = seeded(Scenario::LazyDynamicManyToMany);
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
    let toms_classes = rel.backward(tom, &executor).unwrap().into_query().unwrap();
    assert_eq!(repr(&toms_classes.all(&executor).unwrap()), "[<Class: 'Math'>]");
    assert_eq!(StudentEntity::find().count(&executor).unwrap(), 3);
    assert_eq!(registrations(&executor), 5);
}

#[test]
fn test_students_have_no_foreign_key_column() {
    let (executor, _, roster) = seeded(Scenario::LazyDynamicManyToMany);
    assert!(roster.students.iter().all(|s| s.class_id.is_none()));
    let row = executor.query_one(r#"SELECT * FROM "students" LIMIT 1"#, &[]).unwrap();
    assert!(!row.has_column("class_id"));
}
