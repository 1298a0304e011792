//! The three class/student layouts and their relationship declarations.

use crate::config::DatabaseConfig;
use crate::executor::LifeError;
use crate::relation::{Cardinality, LoadingMode, Relationship};
use crate::school::entity::{ClassEntity, StudentEntity, REGISTRATIONS};
use std::fmt;
use std::str::FromStr;

/// `Class.students` with its `Student` back-reference
pub type ClassStudents = Relationship<ClassEntity, StudentEntity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// One-to-many, eager both ways
    LazySelect,
    /// One-to-many, `Class.students` is a query handle
    LazyDynamicOneToMany,
    /// Many-to-many through `registrations`, query handles both ways
    LazyDynamicManyToMany,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::LazySelect,
        Scenario::LazyDynamicOneToMany,
        Scenario::LazyDynamicManyToMany,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::LazySelect => "lazy_select",
            Scenario::LazyDynamicOneToMany => "lazy_dynamic_one_to_many",
            Scenario::LazyDynamicManyToMany => "lazy_dynamic_many_to_many",
        }
    }

    /// Default store, a file named after the scenario in the working directory
    pub fn database_url(&self) -> String {
        format!("sqlite:///{}.db", self.name())
    }

    /// Loaded configuration, with the scenario's store unless a url was configured
    pub fn config(&self) -> Result<DatabaseConfig, LifeError> {
        Ok(DatabaseConfig::load_or(&self.database_url())?)
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            Scenario::LazySelect | Scenario::LazyDynamicOneToMany => Cardinality::OneToMany,
            Scenario::LazyDynamicManyToMany => Cardinality::ManyToMany,
        }
    }

    /// Declare this scenario's relationship
    pub fn relationship(&self) -> Result<ClassStudents, LifeError> {
        match self {
            Scenario::LazySelect => ClassStudents::one_to_many("class_id")
                .loading(LoadingMode::Eager)
                .declare(),
            Scenario::LazyDynamicOneToMany => ClassStudents::one_to_many("class_id")
                .loading(LoadingMode::Dynamic)
                .declare(),
            Scenario::LazyDynamicManyToMany => ClassStudents::many_to_many(REGISTRATIONS)
                .loading(LoadingMode::Dynamic)
                .backref_loading(LoadingMode::Dynamic)
                .declare(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = LifeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| LifeError::Configuration(format!("unknown scenario `{s}`")))
    }
}
