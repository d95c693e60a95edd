//! Foreign predicate table
//!
//! Predicates are registered under a name and their full arity. Output
//! arguments are passed as [`Term::Var`]; a predicate that binds one returns
//! the binding for its last argument.

use super::term::Term;
use crate::error::{GeoError, GeoResult};
use std::collections::HashMap;
use std::fmt;

/// Native implementation of a foreign predicate
pub type ForeignFn = fn(&[Term]) -> GeoResult<Option<Term>>;

/// One registered predicate
#[derive(Clone, Copy)]
pub struct ForeignPredicate {
    name: &'static str,
    arity: usize,
    function: ForeignFn,
}

impl ForeignPredicate {
    /// Predicate name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Full arity, output arguments included
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Debug for ForeignPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

fn indicator(name: &str, arity: usize) -> String {
    format!("{}/{}", name, arity)
}

/// Name/arity indexed table of foreign predicates
#[derive(Debug, Default)]
pub struct ForeignTable {
    predicates: HashMap<String, ForeignPredicate>,
}

impl ForeignTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` as `name/arity`, replacing any earlier definition
    pub fn register(&mut self, name: &'static str, arity: usize, function: ForeignFn) {
        self.predicates.insert(
            indicator(name, arity),
            ForeignPredicate {
                name,
                arity,
                function,
            },
        );
    }

    /// Look up `name/arity`
    pub fn get(&self, name: &str, arity: usize) -> Option<&ForeignPredicate> {
        self.predicates.get(&indicator(name, arity))
    }

    /// Number of registered predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Call `name/args.len()`
    ///
    /// Unknown predicates raise an existence error on `procedure`.
    pub fn call(&self, name: &str, args: &[Term]) -> GeoResult<Option<Term>> {
        let predicate = self
            .get(name, args.len())
            .ok_or_else(|| GeoError::existence("procedure", indicator(name, args.len())))?;
        tracing::trace!(predicate = name, arity = predicate.arity, "foreign call");
        (predicate.function)(args)
    }
}
