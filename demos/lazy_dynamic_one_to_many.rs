//! One-to-many where `Class.students` is a dynamic query handle.
//!
//! Run with `cargo run --example lazy_dynamic_one_to_many`.

use roster::school::{self, Scenario};
use roster::{LifeError, SqliteExecutor};

fn main() -> Result<(), LifeError> {
    tracing_subscriber::fmt::init();

    let scenario = Scenario::LazyDynamicOneToMany;
    let executor = SqliteExecutor::from_config(&scenario.config()?)?;
    let rel = scenario.relationship()?;
    school::create_schema(&executor, rel.cardinality())?;
    let roster = school::seed(&executor, &rel)?;

    let english = roster.class("English")?;
    println!(">>> c1\n{english}");

    let students = rel.forward(english, &executor)?.into_query()?;
    println!(">>> c1.students\n{students}");

    let all: Vec<String> = students.all(&executor)?.iter().map(ToString::to_string).collect();
    println!(">>> c1.students.all()\n[{}]", all.join(", "));

    match students.filter_by("id", 1).first(&executor)? {
        Some(student) => println!(">>> c1.students.filter_by(id=1).first()\n{student}"),
        None => println!(">>> c1.students.filter_by(id=1).first()\nNone"),
    }

    // the back-reference of a one-to-many stays a single value
    let tom = roster.student("Tom")?;
    println!(">>> s1._class\n{}", rel.backward(tom, &executor)?);

    executor.close()
}
