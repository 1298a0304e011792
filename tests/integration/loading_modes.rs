//! Integration tests for eager loading outside the three scenarios
//!
//! A many-to-many relationship declared eager both ways returns lists from
//! either side, and a one-to-one relationship returns single values.

mod common;

use common::repr;
use roster::school::{
    self, ClassEntity, ClassStudents, NewClass, NewStudent, StudentEntity, REGISTRATIONS,
};
use roster::{Cardinality, LifeModelTrait, Loaded, LoadingMode, Session, SqliteExecutor};

#[test]
fn test_eager_many_to_many_both_ways() {
    let executor = SqliteExecutor::in_memory().unwrap();
    let rel = ClassStudents::many_to_many(REGISTRATIONS)
        .loading(LoadingMode::Eager)
        .backref_loading(LoadingMode::Eager)
        .declare()
        .unwrap();
    school::create_schema(&executor, rel.cardinality()).unwrap();
    let roster = school::seed(&executor, &rel).unwrap();

    let english = rel.forward(roster.class("English").unwrap(), &executor).unwrap();
    assert!(matches!(english, Loaded::Many(_)));
    assert_eq!(english.to_string(), "[<Student: 'Tom'>, <Student: 'Ray'>]");

    let tom = rel.backward(roster.student("Tom").unwrap(), &executor).unwrap();
    assert!(matches!(tom, Loaded::Many(_)));
    assert_eq!(repr(tom.as_many().unwrap()), "[<Class: 'English'>, <Class: 'Math'>]");
}

#[test]
fn test_one_to_one_reads_single_values() {
    let executor = SqliteExecutor::in_memory().unwrap();
    let rel = ClassStudents::one_to_one("class_id").declare().unwrap();
    assert_eq!(rel.cardinality(), Cardinality::OneToOne);
    school::create_schema(&executor, rel.cardinality()).unwrap();

    let mut session = Session::new();
    let english = session.add(NewClass::new("English")).unwrap();
    let math = session.add(NewClass::new("Math")).unwrap();
    let tom = session.add(NewStudent::new("Tom")).unwrap();
    session.link(&rel, english, tom);
    let committed = session.commit(&executor).unwrap();
    let english = committed.load(english, &executor).unwrap();
    let math = committed.load(math, &executor).unwrap();
    let tom = committed.load(tom, &executor).unwrap();

    let loaded = rel.forward(&english, &executor).unwrap();
    assert!(matches!(loaded, Loaded::One(Some(ref student)) if *student == tom));
    assert_eq!(loaded.to_string(), "<Student: 'Tom'>");
    assert!(matches!(rel.forward(&math, &executor).unwrap(), Loaded::One(None)));

    let class = rel.backward(&tom, &executor).unwrap().into_one().unwrap();
    assert_eq!(class, Some(english));
}

#[test]
fn test_one_to_one_rejects_a_second_child() {
    let executor = SqliteExecutor::in_memory().unwrap();
    let rel = ClassStudents::one_to_one("class_id").declare().unwrap();
    school::create_schema(&executor, rel.cardinality()).unwrap();

    let mut session = Session::new();
    let english = session.add(NewClass::new("English")).unwrap();
    let tom = session.add(NewStudent::new("Tom")).unwrap();
    let ray = session.add(NewStudent::new("Ray")).unwrap();
    session.link(&rel, english, tom);
    let committed = session.commit(&executor).unwrap();
    let english = committed.load(english, &executor).unwrap();
    let ray = committed.load(ray, &executor).unwrap();

    session.add(NewStudent::in_class("Lee", english.id)).unwrap();
    assert!(session.commit(&executor).unwrap_err().is_constraint());

    session.link(&rel, &english, &ray);
    assert!(session.commit(&executor).unwrap_err().is_constraint());

    assert_eq!(StudentEntity::find().count(&executor).unwrap(), 2);
    assert_eq!(ClassEntity::find().count(&executor).unwrap(), 1);
    let loaded = rel.forward(&english, &executor).unwrap().into_one().unwrap();
    assert_eq!(loaded.map(|s| s.name), Some("Tom".to_string()));
}
