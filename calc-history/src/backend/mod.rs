//! The expression engine used by the calculator.
//!
//! The calculator only needs a narrow set of capabilities from an expression engine: parsing,
//! listing free symbols, substitution, evaluation, solving, and inspecting results. [`Backend`]
//! describes exactly those, so that the tree and the calculator never depend on a particular
//! engine. [`cas::Cas`] is the implementation backed by `calc_compute`.

pub mod cas;

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};

pub use cas::Cas;

/// An expression engine.
pub trait Backend {
    /// A parsed expression. Expressions are stored on nodes and saved in snapshots.
    type Expr: Clone + Debug + Serialize + DeserializeOwned;

    /// The result of evaluating an expression.
    type Value: Clone + Debug;

    /// An error carried by a value.
    type Error: Clone + Debug + Display;

    /// Returns true if `name` is predefined by the engine, such as a constant or a function name.
    fn is_reserved(name: &str) -> bool;

    /// Parses source text. Parsing never fails; failures are reported by the value the expression
    /// evaluates to.
    fn parse(&self, source: &str) -> Self::Expr;

    /// Returns the free symbols of the expression, sorted and without duplicates.
    fn symbols(&self, expr: &Self::Expr) -> Vec<String>;

    /// Replaces symbols in the expression with values. Symbols bound to values that cannot be
    /// substituted are left free.
    fn substitute(&self, expr: &Self::Expr, bindings: &HashMap<String, Self::Value>) -> Self::Expr;

    fn evaluate(&self, expr: &Self::Expr) -> Self::Value;

    /// Solves the expression for `symbol`, returning every candidate solution.
    fn solve(&self, expr: &Self::Expr, symbol: &str) -> Vec<Self::Value>;

    /// Returns the errors held by a value. A value without errors is a successful result.
    fn errors<'a>(&self, value: &'a Self::Value) -> &'a [Self::Error];

    /// Builds the value of a formula that refers to `dependency`, whose value carries `errors`.
    fn dependency_failed(&self, dependency: &str, errors: &[Self::Error]) -> Self::Value;

    /// Returns true if the value is the "no value" sentinel, such as the result of an equation
    /// with free symbols.
    fn is_undefined(&self, value: &Self::Value) -> bool;

    /// Returns the value as a number, if it is one.
    fn as_number(&self, value: &Self::Value) -> Option<f64>;

    /// Formats the value for display. Numbers are formatted as literals that parse back into the
    /// same number.
    fn format(&self, value: &Self::Value) -> String;
}
