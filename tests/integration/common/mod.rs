//! Shared setup for the scenario tests.

#![allow(dead_code)]

use roster::school::{self, ClassStudents, Roster, Scenario};
use roster::SqliteExecutor;
use std::fmt::Display;

/// A private in-memory store with the scenario's schema and seed data
pub fn seeded(scenario: Scenario) -> (SqliteExecutor, ClassStudents, Roster) {
    let executor = SqliteExecutor::in_memory().expect("open in-memory store");
    let (rel, roster) = bootstrap(&executor, scenario);
    (executor, rel, roster)
}

/// A store with the scenario's schema and no rows
pub fn empty(scenario: Scenario) -> (SqliteExecutor, ClassStudents) {
    let executor = SqliteExecutor::in_memory().expect("open in-memory store");
    let rel = scenario.relationship().expect("declare relationship");
    school::create_schema(&executor, rel.cardinality()).expect("create schema");
    (executor, rel)
}

pub fn bootstrap(executor: &SqliteExecutor, scenario: Scenario) -> (ClassStudents, Roster) {
    let rel = scenario.relationship().expect("declare relationship");
    school::create_schema(executor, rel.cardinality()).expect("create schema");
    let roster = school::seed(executor, &rel).expect("seed");
    (rel, roster)
}

/// Render models the way `Loaded` prints a list
pub fn repr<T: Display>(models: &[T]) -> String {
    let items: Vec<String> = models.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}
