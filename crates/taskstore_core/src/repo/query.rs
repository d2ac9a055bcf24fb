//! Explicit query-builder for store-evaluated predicates.
//!
//! # Responsibility
//! - Represent filter conditions as data until the store evaluates them.
//! - Render parameterized SQL so filtering never happens client-side.
//!
//! # Invariants
//! - Clauses are combined with AND; an empty predicate selects everything.
//! - Values are always bound, never interpolated into SQL text.

use crate::model::entity::Entity;
use rusqlite::types::Value;

/// Comparison operator for a predicate clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Cmp {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// Conjunction of field comparisons, evaluated by the backing store.
pub struct Predicate<E: Entity> {
    clauses: Vec<(E::Field, Cmp, Value)>,
}

impl<E: Entity> Default for Predicate<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Predicate<E> {
    /// Creates an empty predicate matching every row.
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Adds a clause; all clauses must hold for a row to match.
    pub fn and(mut self, field: E::Field, cmp: Cmp, value: Value) -> Self {
        self.clauses.push((field, cmp, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Renders the predicate as a ` WHERE ...` fragment plus bind values.
    ///
    /// Returns an empty fragment for an empty predicate.
    pub(crate) fn render(&self) -> (String, Vec<Value>) {
        if self.clauses.is_empty() {
            return (String::new(), Vec::new());
        }

        let fragment = self
            .clauses
            .iter()
            .enumerate()
            .map(|(i, (field, cmp, _))| {
                format!("{} {} ?{}", E::field_column(*field), cmp.sql(), i + 1)
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        let values = self
            .clauses
            .iter()
            .map(|(_, _, value)| value.clone())
            .collect();

        (format!(" WHERE {fragment}"), values)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cmp, Predicate};
    use crate::model::todo::{Todo, TodoField};
    use rusqlite::types::Value;

    #[test]
    fn empty_predicate_renders_nothing() {
        let predicate = Predicate::<Todo>::new();
        let (fragment, values) = predicate.render();
        assert!(fragment.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn clauses_render_in_order_with_positional_params() {
        let predicate = Predicate::<Todo>::new()
            .and(TodoField::Completed, Cmp::Eq, Value::Integer(0))
            .and(TodoField::Task, Cmp::Like, Value::Text("%urgent%".into()));
        let (fragment, values) = predicate.render();
        assert_eq!(fragment, " WHERE completed = ?1 AND task LIKE ?2");
        assert_eq!(values.len(), 2);
    }
}
