//! AST for path expressions.

use serde_json::Value;

/// One step of a resolved location inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Object member access by key.
    Key(String),
    /// Array element access by (normalized, in-bounds) index.
    Index(usize),
}

/// A concrete address of a value inside a document: the sequence of steps
/// from the root down to the value. Unlike a borrowed reference, a location
/// stays valid while sibling branches are mutated, which is what the patch
/// engine needs.
pub type Location = Vec<Step>;

/// Selector types.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Property access: `.name`, `['key']`
    Name(String),
    /// Array element access: `[0]`, `[-1]`
    Index(isize),
    /// All members / elements: `.*`, `[*]`
    Wildcard,
    /// Predicate-based element selection: `[?(@.name == 'default')]`
    Filter(FilterExpr),
}

/// Trailing aggregate call, legal only as the last element of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// `.length()` / `.size()` — the element count of the matched array.
    Length,
}

/// Complete parsed path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub segments: Vec<Selector>,
    pub aggregate: Option<Aggregate>,
}

impl PathExpr {
    pub fn new(segments: Vec<Selector>) -> Self {
        Self { segments, aggregate: None }
    }

    /// The path minus its final segment, with the final segment returned
    /// separately. `None` for the bare-root path `$`.
    pub fn split_last(&self) -> Option<(PathExpr, &Selector)> {
        let (last, parent) = self.segments.split_last()?;
        Some((PathExpr::new(parent.to_vec()), last))
    }
}

/// Filter expression inside `[?(...)]`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `@.price < 10`
    Comparison {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    /// `@.a == 1 && @.b == 2`
    Logical {
        op: LogicalOp,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
    /// Bare relative path: `@.name` — true when the path resolves.
    Existence { path: Vec<Selector> },
    /// `!<expr>`
    Not(Box<FilterExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A value operand inside a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `'default'`, `42`, `true`, `null`
    Literal(Value),
    /// `@.name` — resolved against the candidate element.
    Relative(Vec<Selector>),
}
