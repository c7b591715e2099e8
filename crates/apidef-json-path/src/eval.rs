//! Path-expression evaluator.
//!
//! Evaluation produces [`Location`]s rather than borrowed values: the caller
//! can hold the full match set while mutating the document one location at a
//! time.

use crate::types::*;
use serde_json::Value;

/// Walk a location back to the value it addresses.
pub fn resolve<'a>(doc: &'a Value, location: &[Step]) -> Option<&'a Value> {
    let mut current = doc;
    for step in location {
        current = match (step, current) {
            (Step::Key(key), Value::Object(map)) => map.get(key)?,
            (Step::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(doc: &'a mut Value, location: &[Step]) -> Option<&'a mut Value> {
    let mut current = doc;
    for step in location {
        current = match (step, current) {
            (Step::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Step::Index(idx), Value::Array(arr)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Path-expression evaluator.
pub struct PathEval;

impl PathEval {
    /// Evaluate a path against a document, returning every matched location.
    ///
    /// The trailing aggregate, if any, is not applied here: the caller
    /// inspects `path.aggregate` and interprets the matched locations
    /// accordingly.
    pub fn eval(path: &PathExpr, doc: &Value) -> Vec<Location> {
        let mut locations: Vec<Location> = vec![Vec::new()];

        for selector in &path.segments {
            let mut next = Vec::new();
            for location in &locations {
                let Some(value) = resolve(doc, location) else {
                    continue;
                };
                Self::eval_selector(value, selector, location, &mut next);
            }
            locations = next;
            if locations.is_empty() {
                break;
            }
        }

        locations
    }

    fn eval_selector(
        value: &Value,
        selector: &Selector,
        location: &Location,
        out: &mut Vec<Location>,
    ) {
        match selector {
            Selector::Name(name) => {
                if let Value::Object(map) = value {
                    if map.contains_key(name) {
                        let mut loc = location.clone();
                        loc.push(Step::Key(name.clone()));
                        out.push(loc);
                    }
                }
            }
            Selector::Index(index) => {
                if let Value::Array(arr) = value {
                    let idx = if *index < 0 {
                        let normalized = arr.len() as isize + index;
                        if normalized < 0 {
                            return;
                        }
                        normalized as usize
                    } else {
                        *index as usize
                    };
                    if idx < arr.len() {
                        let mut loc = location.clone();
                        loc.push(Step::Index(idx));
                        out.push(loc);
                    }
                }
            }
            Selector::Wildcard => match value {
                Value::Object(map) => {
                    for key in map.keys() {
                        let mut loc = location.clone();
                        loc.push(Step::Key(key.clone()));
                        out.push(loc);
                    }
                }
                Value::Array(arr) => {
                    for idx in 0..arr.len() {
                        let mut loc = location.clone();
                        loc.push(Step::Index(idx));
                        out.push(loc);
                    }
                }
                _ => {}
            },
            Selector::Filter(expr) => match value {
                Value::Array(arr) => {
                    for (idx, child) in arr.iter().enumerate() {
                        if Self::eval_filter(expr, child) {
                            let mut loc = location.clone();
                            loc.push(Step::Index(idx));
                            out.push(loc);
                        }
                    }
                }
                Value::Object(map) => {
                    for (key, child) in map {
                        if Self::eval_filter(expr, child) {
                            let mut loc = location.clone();
                            loc.push(Step::Key(key.clone()));
                            out.push(loc);
                        }
                    }
                }
                _ => {}
            },
        }
    }

    fn eval_filter(expr: &FilterExpr, candidate: &Value) -> bool {
        match expr {
            FilterExpr::Existence { path } => Self::resolve_relative(path, candidate).is_some(),
            FilterExpr::Comparison { op, left, right } => {
                let left = Self::eval_operand(left, candidate);
                let right = Self::eval_operand(right, candidate);
                Self::compare(*op, left.as_ref(), right.as_ref())
            }
            FilterExpr::Logical { op, left, right } => match op {
                LogicalOp::And => {
                    Self::eval_filter(left, candidate) && Self::eval_filter(right, candidate)
                }
                LogicalOp::Or => {
                    Self::eval_filter(left, candidate) || Self::eval_filter(right, candidate)
                }
            },
            FilterExpr::Not(inner) => !Self::eval_filter(inner, candidate),
        }
    }

    fn eval_operand(operand: &Operand, candidate: &Value) -> Option<Value> {
        match operand {
            Operand::Literal(v) => Some(v.clone()),
            Operand::Relative(path) => Self::resolve_relative(path, candidate).cloned(),
        }
    }

    /// Resolve an `@`-anchored sub-path against a candidate element,
    /// yielding the first match.
    fn resolve_relative<'a>(path: &[Selector], candidate: &'a Value) -> Option<&'a Value> {
        let expr = PathExpr::new(path.to_vec());
        let locations = Self::eval(&expr, candidate);
        locations.first().and_then(|loc| resolve(candidate, loc))
    }

    fn compare(op: CompareOp, left: Option<&Value>, right: Option<&Value>) -> bool {
        let (left, right) = match (left, right) {
            (Some(l), Some(r)) => (l, r),
            // An unresolvable operand only satisfies strict (in)equality
            // against another unresolvable operand.
            (None, None) => return op == CompareOp::Eq,
            _ => return op == CompareOp::Ne,
        };

        let ord = Self::order(left, right);
        match op {
            // Numbers compare by value so an integer equals the float
            // spelling of the same quantity; everything else is deep equality.
            CompareOp::Eq => match (left, right) {
                (Value::Number(_), Value::Number(_)) => ord == Some(std::cmp::Ordering::Equal),
                _ => left == right,
            },
            CompareOp::Ne => match (left, right) {
                (Value::Number(_), Value::Number(_)) => ord != Some(std::cmp::Ordering::Equal),
                _ => left != right,
            },
            CompareOp::Lt => ord == Some(std::cmp::Ordering::Less),
            CompareOp::Le => matches!(
                ord,
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            CompareOp::Gt => ord == Some(std::cmp::Ordering::Greater),
            CompareOp::Ge => matches!(
                ord,
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
        }
    }

    fn order(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
