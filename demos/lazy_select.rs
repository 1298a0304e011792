//! One-to-many with eager loading both ways.
//!
//! Run with `cargo run --example lazy_select`. Set `ROSTER__DATABASE__URL` to
//! use another store than `lazy_select.db`.

use roster::school::{self, Scenario};
use roster::{LifeError, SqliteExecutor};

fn main() -> Result<(), LifeError> {
    tracing_subscriber::fmt::init();

    let scenario = Scenario::LazySelect;
    let executor = SqliteExecutor::from_config(&scenario.config()?)?;
    let rel = scenario.relationship()?;
    school::create_schema(&executor, rel.cardinality())?;
    let roster = school::seed(&executor, &rel)?;

    let english = roster.class("English")?;
    println!(">>> c1\n{english}");
    // eager: the students are already a list
    println!(">>> c1.students\n{}", rel.forward(english, &executor)?);

    let tom = roster.student("Tom")?;
    println!(">>> s1\n{tom}");
    println!(">>> s1._class\n{}", rel.backward(tom, &executor)?);

    executor.close()
}
