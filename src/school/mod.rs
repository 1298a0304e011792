//! Classes and students: schema bootstrap and demonstration data.
//!
//! Three layouts share the same two entities. One-to-many layouts give
//! `students` a nullable `class_id` column; the many-to-many layout pairs the
//! tables through `registrations` instead.

pub mod entity;
pub mod scenario;

pub use entity::{
    ClassEntity, ClassModel, NewClass, NewStudent, StudentEntity, StudentModel, REGISTRATIONS,
};
pub use scenario::{ClassStudents, Scenario};

use crate::executor::{LifeError, LifeExecutor};
use crate::query::LifeModelTrait;
use crate::relation::Cardinality;
use crate::session::Session;

const CLASSES_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "classes" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" VARCHAR(64) CHECK (length("name") <= 64)
)"#;

const STUDENTS_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "students" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" VARCHAR(64) CHECK (length("name") <= 64)
)"#;

const STUDENTS_WITH_CLASS_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "students" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" VARCHAR(64) CHECK (length("name") <= 64),
    "class_id" INTEGER REFERENCES "classes" ("id")
)"#;

const STUDENTS_WITH_UNIQUE_CLASS_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "students" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" VARCHAR(64) CHECK (length("name") <= 64),
    "class_id" INTEGER UNIQUE REFERENCES "classes" ("id")
)"#;

const REGISTRATIONS_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "registrations" (
    "student_id" INTEGER REFERENCES "students" ("id"),
    "class_id" INTEGER REFERENCES "classes" ("id")
)"#;

/// Create the tables for `cardinality` if they do not exist
pub fn create_schema<Ex>(executor: &Ex, cardinality: Cardinality) -> Result<(), LifeError>
where
    Ex: LifeExecutor + ?Sized,
{
    let students = match cardinality {
        Cardinality::OneToMany => STUDENTS_WITH_CLASS_DDL,
        Cardinality::OneToOne => STUDENTS_WITH_UNIQUE_CLASS_DDL,
        Cardinality::ManyToMany => STUDENTS_DDL,
    };
    executor.execute_batch(CLASSES_DDL)?;
    executor.execute_batch(students)?;
    if cardinality == Cardinality::ManyToMany {
        executor.execute_batch(REGISTRATIONS_DDL)?;
    }
    log::info!("schema ready for {cardinality:?}");
    Ok(())
}

/// Stored classes and students, in primary-key order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub classes: Vec<ClassModel>,
    pub students: Vec<StudentModel>,
}

impl Roster {
    /// Read every class and student
    pub fn load<Ex: LifeExecutor + ?Sized>(executor: &Ex) -> Result<Self, LifeError> {
        Ok(Self {
            classes: ClassEntity::find().all(executor)?,
            students: StudentEntity::find().all(executor)?,
        })
    }

    pub fn class(&self, name: &str) -> Result<&ClassModel, LifeError> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| LifeError::QueryError(format!("no class named {name}")))
    }

    pub fn student(&self, name: &str) -> Result<&StudentModel, LifeError> {
        self.students
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| LifeError::QueryError(format!("no student named {name}")))
    }
}

const CLASSES: [&str; 3] = ["English", "Math", "Spanish"];
const STUDENTS: [&str; 3] = ["Tom", "Ray", "Sam"];

/// (class, student) pairs for each layout, as indices into the lists above
const ONE_TO_MANY_PAIRS: &[(usize, usize)] = &[(0, 0), (0, 1), (1, 2)];
const MANY_TO_MANY_PAIRS: &[(usize, usize)] = &[(0, 0), (1, 0), (0, 1), (2, 1), (1, 2), (2, 2)];

/// Store the demonstration classes and students and relate them
///
/// Does nothing if classes already exist, so running it against a seeded
/// store is safe. Returns what is stored either way.
pub fn seed<Ex>(executor: &Ex, rel: &ClassStudents) -> Result<Roster, LifeError>
where
    Ex: LifeExecutor + ?Sized,
{
    if ClassEntity::find().count(executor)? > 0 {
        log::info!("store already seeded");
        return Roster::load(executor);
    }

    let mut session = Session::new();
    let classes = CLASSES
        .iter()
        .map(|name| session.add(NewClass::new(*name)))
        .collect::<Result<Vec<_>, _>>()?;
    let students = STUDENTS
        .iter()
        .map(|name| session.add(NewStudent::new(*name)))
        .collect::<Result<Vec<_>, _>>()?;

    let pairs = match rel.cardinality() {
        Cardinality::ManyToMany => MANY_TO_MANY_PAIRS,
        Cardinality::OneToMany | Cardinality::OneToOne => ONE_TO_MANY_PAIRS,
    };
    for &(class, student) in pairs {
        session.link(rel, classes[class], students[student]);
    }
    session.commit(executor)?;

    log::info!("seeded {} classes and {} students", CLASSES.len(), STUDENTS.len());
    Roster::load(executor)
}
