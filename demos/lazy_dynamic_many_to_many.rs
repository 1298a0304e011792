//! Many-to-many through `registrations`, dynamic both ways.
//!
//! Run with `cargo run --example lazy_dynamic_many_to_many`.

use roster::school::{self, Scenario};
use roster::{LifeError, SqliteExecutor};

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn main() -> Result<(), LifeError> {
    tracing_subscriber::fmt::init();

    let scenario = Scenario::LazyDynamicManyToMany;
    let executor = SqliteExecutor::from_config(&scenario.config()?)?;
    let rel = scenario.relationship()?;
    school::create_schema(&executor, rel.cardinality())?;
    let roster = school::seed(&executor, &rel)?;

    let english = roster.class("English")?;
    let students = rel.forward(english, &executor)?.into_query()?;
    println!(">>> c1.students\n{students}");
    println!(">>> c1.students.all()\n{}", list(&students.all(&executor)?));
    if let Some(student) = students.filter_by("id", 1).first(&executor)? {
        println!(">>> c1.students.filter_by(id=1).first()\n{student}");
    }

    let tom = roster.student("Tom")?;
    let classes = rel.backward(tom, &executor)?.into_query()?;
    println!(">>> s1._class\n{classes}");
    println!(">>> s1._class.all()\n{}", list(&classes.all(&executor)?));
    println!(">>> s1._class.count()\n{}", classes.count(&executor)?);

    executor.close()
}
