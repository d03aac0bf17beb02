use calc_compute::{numerical::error::FailedDependency, Ctxt, Formula, SymExpr, Value};
use calc_error::{Diagnostic, Error};
use crate::calculator::PREVIOUS_ANSWER;
use std::collections::HashMap;
use super::Backend;

/// The backend implemented by `calc_compute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cas {
    /// The context expressions are evaluated in.
    pub ctxt: Ctxt,
}

impl Cas {
    pub fn new(ctxt: Ctxt) -> Self {
        Self { ctxt }
    }
}

impl Backend for Cas {
    type Expr = Formula;
    type Value = Value;
    type Error = Diagnostic;

    fn is_reserved(name: &str) -> bool {
        name == PREVIOUS_ANSWER || calc_compute::is_reserved(name)
    }

    fn parse(&self, source: &str) -> Formula {
        Formula::parse(source)
    }

    fn symbols(&self, expr: &Formula) -> Vec<String> {
        expr.symbols().into_iter().collect()
    }

    fn substitute(&self, expr: &Formula, bindings: &HashMap<String, Value>) -> Formula {
        let bindings = bindings
            .iter()
            .filter_map(|(name, value)| Some((name.clone(), value.to_expr()?)))
            .collect::<HashMap<String, SymExpr>>();
        expr.substitute(&bindings)
    }

    fn evaluate(&self, expr: &Formula) -> Value {
        expr.evaluate(&self.ctxt)
    }

    fn solve(&self, expr: &Formula, symbol: &str) -> Vec<Value> {
        expr.solve(symbol, &self.ctxt)
    }

    fn errors<'a>(&self, value: &'a Value) -> &'a [Diagnostic] {
        value.errors()
    }

    fn dependency_failed(&self, dependency: &str, errors: &[Diagnostic]) -> Value {
        let reason = errors.first().map(Diagnostic::to_string).unwrap_or_default();
        let err = Error::spanless(FailedDependency { name: dependency.to_string(), reason });
        Value::Error(vec![err.to_diagnostic()])
    }

    fn is_undefined(&self, value: &Value) -> bool {
        value.is_undefined()
    }

    fn as_number(&self, value: &Value) -> Option<f64> {
        value.as_number().map(|n| n.to_f64())
    }

    fn format(&self, value: &Value) -> String {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use calc_compute::{Number, TrigMode};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn reserved_names() {
        assert!(Cas::is_reserved("ans"));
        assert!(Cas::is_reserved("pi"));
        assert!(Cas::is_reserved("sqrt"));
        assert!(Cas::is_reserved("sin"));
        assert!(!Cas::is_reserved("radius"));
    }

    #[test]
    fn substitution_skips_values_without_expressions() {
        let cas = Cas::default();
        let formula = cas.parse("x + y");
        let bindings = HashMap::from([
            ("x".to_string(), Value::Number(Number::int(2))),
            ("y".to_string(), Value::Undefined),
        ]);
        let substituted = cas.substitute(&formula, &bindings);
        assert_eq!(cas.symbols(&substituted), vec!["y".to_string()]);
        assert_eq!(cas.format(&cas.evaluate(&substituted)), "y + 2");
    }

    #[test]
    fn evaluates_in_context() {
        let cas = Cas::new(Ctxt::with_trig_mode(TrigMode::Degrees));
        let value = cas.evaluate(&cas.parse("cos(180)"));
        assert_eq!(cas.as_number(&value), Some(-1.0));
    }

    #[test]
    fn errors_are_values() {
        let cas = Cas::default();
        let value = cas.evaluate(&cas.parse("1 / 0"));
        assert_eq!(cas.errors(&value).len(), 1);
        assert!(cas.errors(&cas.evaluate(&cas.parse("1"))).is_empty());
    }

    #[test]
    fn failed_dependencies_name_the_dependency() {
        let cas = Cas::default();
        let failed = cas.evaluate(&cas.parse("1 / 0"));
        let value = cas.dependency_failed("a0", cas.errors(&failed));
        let errors = cas.errors(&value);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "`a0` has an error: division by zero");
        assert!(errors[0].labels.is_empty());
    }
}
