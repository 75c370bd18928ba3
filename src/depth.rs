//! Query depth guard.
//!
//! Depth is the number of field selections on the path from the operation root
//! to a field, the field itself included. Inline fragments are transparent and
//! fragment spreads count at the depth of the spread.
//!
//! Each fragment definition is walked at most once per document. Its deepest
//! field chain, measured from the fragment's own top level, is remembered and
//! added to the depth of every spread that references it.

use async_graphql_parser::types::{
    ExecutableDocument, Field, FragmentSpread, Selection, SelectionSet,
};
use async_graphql_parser::Positioned;
use std::collections::HashMap;

/// Maximum field nesting accepted by [`check_depth`].
pub const MAX_DEPTH: usize = 5;

/// The document nests fields deeper than [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("exceeds maximum operation depth of {max_depth}")]
pub struct DepthLimitExceeded {
    /// Limit that was crossed
    pub max_depth: usize,
    /// Name of the field found past the limit
    pub field: String,
    /// Line of that field (1-indexed)
    pub line: usize,
    /// Column of that field (1-indexed)
    pub column: usize,
}

/// Reject documents whose field nesting exceeds [`MAX_DEPTH`].
///
/// Traversal stops at the first violation; nothing after it is visited.
pub fn check_depth(document: &ExecutableDocument) -> Result<(), DepthLimitExceeded> {
    measure_depth(document).map(|_| ())
}

/// Same check as [`check_depth`], returning the deepest field chain of an
/// accepted document.
pub fn measure_depth(document: &ExecutableDocument) -> Result<usize, DepthLimitExceeded> {
    DepthWalker::new(document, MAX_DEPTH, |_, _| {}).visit_document()
}

/// Deepest field at or below some point of the walk.
#[derive(Clone, Copy)]
struct Deepest<'a> {
    depth: usize,
    field: Option<&'a Positioned<Field>>,
}

impl<'a> Deepest<'a> {
    fn deeper(self, other: Self) -> Self {
        if other.depth > self.depth {
            other
        } else {
            self
        }
    }
}

struct DepthWalker<'a, F> {
    document: &'a ExecutableDocument,
    max_depth: usize,
    /// Fragments currently being measured, innermost last
    fragment_stack: Vec<&'a str>,
    /// Depth of each fragment already measured, relative to its own top level
    fragment_depths: HashMap<&'a str, Deepest<'a>>,
    on_field: F,
}

impl<'a, F> DepthWalker<'a, F>
where
    F: FnMut(&'a Positioned<Field>, usize),
{
    fn new(document: &'a ExecutableDocument, max_depth: usize, on_field: F) -> Self {
        Self {
            document,
            max_depth,
            fragment_stack: Vec::new(),
            fragment_depths: HashMap::new(),
            on_field,
        }
    }

    fn visit_document(mut self) -> Result<usize, DepthLimitExceeded> {
        let document = self.document;
        let mut deepest = 0;
        for (_, operation) in document.operations.iter() {
            let operation = self.visit_selection_set(&operation.node.selection_set.node, 0)?;
            deepest = deepest.max(operation.depth);
        }
        Ok(deepest)
    }

    fn visit_selection_set(
        &mut self,
        selection_set: &'a SelectionSet,
        depth: usize,
    ) -> Result<Deepest<'a>, DepthLimitExceeded> {
        let mut deepest = Deepest {
            depth,
            field: None,
        };
        for selection in &selection_set.items {
            let inner = match &selection.node {
                Selection::Field(field) => self.visit_field(field, depth + 1)?,
                Selection::InlineFragment(fragment) => {
                    self.visit_selection_set(&fragment.node.selection_set.node, depth)?
                }
                Selection::FragmentSpread(spread) => self.visit_fragment_spread(spread, depth)?,
            };
            deepest = deepest.deeper(inner);
        }
        Ok(deepest)
    }

    fn visit_field(
        &mut self,
        field: &'a Positioned<Field>,
        depth: usize,
    ) -> Result<Deepest<'a>, DepthLimitExceeded> {
        (self.on_field)(field, depth);

        if depth > self.max_depth {
            return Err(self.exceeded(field));
        }

        let here = Deepest {
            depth,
            field: Some(field),
        };
        let inner = self.visit_selection_set(&field.node.selection_set.node, depth)?;
        Ok(here.deeper(inner))
    }

    fn visit_fragment_spread(
        &mut self,
        spread: &'a Positioned<FragmentSpread>,
        depth: usize,
    ) -> Result<Deepest<'a>, DepthLimitExceeded> {
        let none = Deepest {
            depth,
            field: None,
        };
        let name = spread.node.fragment_name.node.as_str();

        let cached = self.fragment_depths.get(name).copied();
        let fragment = match cached {
            Some(fragment) => fragment,
            None => {
                // Unknown fragments and cycles are left to the execution engine's validation.
                if self.fragment_stack.contains(&name) {
                    return Ok(none);
                }
                let document = self.document;
                let Some(definition) = document.fragments.get(&spread.node.fragment_name.node)
                else {
                    return Ok(none);
                };

                self.fragment_stack.push(name);
                let measured = self.visit_selection_set(&definition.node.selection_set.node, 0)?;
                self.fragment_stack.pop();

                self.fragment_depths.insert(name, measured);
                measured
            }
        };

        match fragment.field {
            Some(field) if depth + fragment.depth > self.max_depth => Err(self.exceeded(field)),
            Some(field) => Ok(Deepest {
                depth: depth + fragment.depth,
                field: Some(field),
            }),
            None => Ok(none),
        }
    }

    fn exceeded(&self, field: &Positioned<Field>) -> DepthLimitExceeded {
        DepthLimitExceeded {
            max_depth: self.max_depth,
            field: field.node.name.node.to_string(),
            line: field.pos.line,
            column: field.pos.column,
        }
    }
}
