//! Translation of a [`Patch`] into a positional update descriptor.
//!
//! Field names and values never appear in the clause itself; the clause only
//! references placeholders (`#field{i}`, `:value{i}`) and the descriptor
//! carries the substitutions. Reserved words and odd characters in field names
//! are therefore never a problem for the backend.

use super::{Patch, Value};

/// A single `SET` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name_placeholder: String,
    pub field: String,
    pub value_placeholder: String,
    pub value: Value,
}

/// An ordered, non-empty list of assignments plus the assembled clause.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDescriptor {
    assignments: Vec<Assignment>,
    clause: String,
}

impl UpdateDescriptor {
    /// Build a descriptor from the effective fields of `patch`.
    ///
    /// Returns `None` when nothing would be written: the patch is empty, only
    /// names excluded fields, or only carries undefined values.
    ///
    /// ```
    /// use quill_core::storage::{Patch, UpdateDescriptor};
    ///
    /// let patch = Patch::new().set("name", "Rust").set("categoryId", "cat-2");
    /// let descriptor = UpdateDescriptor::build(&patch, &["categoryId"]).unwrap();
    /// assert_eq!(descriptor.clause(), "SET #field0 = :value0");
    /// ```
    pub fn build(patch: &Patch, exclude: &[&str]) -> Option<Self> {
        let assignments: Vec<Assignment> = patch
            .effective_fields(exclude)
            .enumerate()
            .map(|(i, (field, value))| Assignment {
                name_placeholder: format!("#field{i}"),
                field: field.to_string(),
                value_placeholder: format!(":value{i}"),
                value: value.clone(),
            })
            .collect();

        if assignments.is_empty() {
            return None;
        }

        let clause = format!(
            "SET {}",
            assignments
                .iter()
                .map(|a| format!("{} = {}", a.name_placeholder, a.value_placeholder))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Some(Self {
            assignments,
            clause,
        })
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Name placeholder to field name.
    pub fn names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assignments
            .iter()
            .map(|a| (a.name_placeholder.as_str(), a.field.as_str()))
    }

    /// Value placeholder to value.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.assignments
            .iter()
            .map(|a| (a.value_placeholder.as_str(), &a.value))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Always false for a built descriptor; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
