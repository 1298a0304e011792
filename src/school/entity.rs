//! Class and Student entities.

use crate::active_model::ActiveModelTrait;
use crate::executor::{LifeError, Row};
use crate::model::ModelTrait;
use crate::query::{FromRow, LifeEntityName, LifeModelTrait};
use crate::relation::Junction;
use sea_query::Value;
use serde::Serialize;
use std::fmt;

/// Junction pairing classes and students in the many-to-many layout
pub const REGISTRATIONS: Junction = Junction::new("registrations", "class_id", "student_id");

/// The `classes` table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassEntity;

impl LifeEntityName for ClassEntity {
    fn table_name(&self) -> &'static str {
        "classes"
    }
}

impl LifeModelTrait for ClassEntity {
    type Model = ClassModel;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    pub id: i64,
    pub name: String,
}

impl FromRow for ClassModel {
    fn from_row(row: &Row) -> Result<Self, LifeError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

impl ModelTrait for ClassModel {
    type Entity = ClassEntity;

    fn get(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::BigInt(Some(self.id))),
            "name" => Some(Value::String(Some(self.name.clone()))),
            _ => None,
        }
    }

    fn get_primary_key_value(&self) -> Value {
        Value::BigInt(Some(self.id))
    }
}

impl fmt::Display for ClassModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Class: '{}'>", self.name)
    }
}

/// The `students` table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentEntity;

impl LifeEntityName for StudentEntity {
    fn table_name(&self) -> &'static str {
        "students"
    }
}

impl LifeModelTrait for StudentEntity {
    type Model = StudentModel;
}

/// A student row
///
/// `class_id` is always `None` in the many-to-many layout, which has no such
/// column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentModel {
    pub id: i64,
    pub name: String,
    pub class_id: Option<i64>,
}

impl FromRow for StudentModel {
    fn from_row(row: &Row) -> Result<Self, LifeError> {
        let class_id = if row.has_column("class_id") {
            row.get("class_id")?
        } else {
            None
        };
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            class_id,
        })
    }
}

impl ModelTrait for StudentModel {
    type Entity = StudentEntity;

    fn get(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::BigInt(Some(self.id))),
            "name" => Some(Value::String(Some(self.name.clone()))),
            "class_id" => Some(Value::BigInt(self.class_id)),
            _ => None,
        }
    }

    fn get_primary_key_value(&self) -> Value {
        Value::BigInt(Some(self.id))
    }
}

impl fmt::Display for StudentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Student: '{}'>", self.name)
    }
}

/// A class that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
}

impl NewClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ActiveModelTrait for NewClass {
    type Entity = ClassEntity;

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![("name", Value::String(Some(self.name.clone())))]
    }
}

/// A student that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub class_id: Option<i64>,
}

impl NewStudent {
    /// A student without a class (the only form valid for many-to-many)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_id: None,
        }
    }

    /// A student whose `class_id` is set directly
    pub fn in_class(name: impl Into<String>, class_id: i64) -> Self {
        Self {
            name: name.into(),
            class_id: Some(class_id),
        }
    }
}

impl ActiveModelTrait for NewStudent {
    type Entity = StudentEntity;

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![("name", Value::String(Some(self.name.clone())))];
        if let Some(class_id) = self.class_id {
            values.push(("class_id", Value::BigInt(Some(class_id))));
        }
        values
    }
}
