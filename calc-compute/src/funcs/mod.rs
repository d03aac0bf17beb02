//! All built-in functions that can be numerically evaluated.
//!
//! Each function is a plain `fn(&[Number], &Ctxt) -> Result<Number, Error>`, registered in a
//! static table along with its name and the number of arguments it accepts. The power functions
//! `sqrt`, `cbrt` and `root` are not in the table: they are lowered to exponentiation when the
//! expression is converted (see [`power`]), so that they simplify exactly.
//!
//! # Example
//!
//! ```
//! use calc_compute::{funcs, Ctxt, Number};
//!
//! let floor = funcs::find("floor").unwrap();
//! let result = floor.call(&[Number::from_decimal("2.5").unwrap()], &Ctxt::default()).unwrap();
//! assert_eq!(result, Number::int(2));
//! ```

pub mod miscellaneous;
pub mod power;
pub mod round;
pub mod trigonometry;

use calc_error::Error;
use crate::numerical::{ctxt::Ctxt, error::WrongArgumentCount, number::Number};

/// The signature of a builtin function. The argument count is checked before it is called.
pub type BuiltinFn = fn(&[Number], &Ctxt) -> Result<Number, Error>;

/// A function that can be called with numeric arguments.
#[derive(Debug)]
pub struct Builtin {
    /// The name of the function.
    pub name: &'static str,

    /// The minimum number of arguments.
    pub min_args: usize,

    /// The maximum number of arguments.
    pub max_args: usize,

    eval: BuiltinFn,
}

impl Builtin {
    /// Returns true if the function accepts the given number of arguments.
    pub fn accepts(&self, count: usize) -> bool {
        (self.min_args..=self.max_args).contains(&count)
    }

    /// Describes the accepted argument count, for error messages.
    pub fn describe_arity(&self) -> String {
        describe_arity(self.min_args, self.max_args)
    }

    /// Calls the function with the given arguments.
    pub fn call(&self, args: &[Number], ctxt: &Ctxt) -> Result<Number, Error> {
        if !self.accepts(args.len()) {
            return Err(Error::spanless(WrongArgumentCount {
                name: self.name.to_string(),
                expected: self.describe_arity(),
                given: args.len(),
            }));
        }

        (self.eval)(args, ctxt)
    }
}

/// Describes an argument count range, such as "1 argument" or "1 to 2 arguments".
pub(crate) fn describe_arity(min: usize, max: usize) -> String {
    match (min, max) {
        (1, 1) => "1 argument".to_string(),
        (min, max) if min == max => format!("{} arguments", min),
        (min, max) => format!("{} to {} arguments", min, max),
    }
}

macro_rules! table {
    ($($name:literal $min:literal..=$max:literal => $eval:path),* $(,)?) => {
        &[
            $(
                Builtin { name: $name, min_args: $min, max_args: $max, eval: $eval },
            )*
        ]
    };
}

static BUILTINS: &[Builtin] = table! {
    "sin" 1..=1 => trigonometry::sin,
    "cos" 1..=1 => trigonometry::cos,
    "tan" 1..=1 => trigonometry::tan,
    "asin" 1..=1 => trigonometry::asin,
    "acos" 1..=1 => trigonometry::acos,
    "atan" 1..=1 => trigonometry::atan,
    "sinh" 1..=1 => trigonometry::sinh,
    "cosh" 1..=1 => trigonometry::cosh,
    "tanh" 1..=1 => trigonometry::tanh,
    "ln" 1..=1 => miscellaneous::ln,
    "log" 1..=2 => miscellaneous::log,
    "exp" 1..=1 => miscellaneous::exp,
    "abs" 1..=1 => miscellaneous::abs,
    "factorial" 1..=1 => miscellaneous::factorial,
    "floor" 1..=1 => round::floor,
    "ceil" 1..=1 => round::ceil,
    "round" 1..=1 => round::round,
};

/// Returns the builtin function with the given name.
pub fn find(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Returns true if `name` is a builtin function, including the power functions.
pub fn is_builtin(name: &str) -> bool {
    find(name).is_some() || power::arity(name).is_some()
}

/// Returns the names of every builtin function, including the power functions.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS
        .iter()
        .map(|builtin| builtin.name)
        .chain(power::NAMES.iter().copied())
}

/// Returns builtin function names that are similar to `name`, for use in error messages.
pub fn suggestions(name: &str) -> Vec<&'static str> {
    let mut candidates = names()
        .map(|candidate| (levenshtein::levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= 2)
        .collect::<Vec<_>>();
    candidates.sort();
    candidates.into_iter().map(|(_, candidate)| candidate).take(3).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn every_name_is_unique() {
        let mut all = names().collect::<Vec<_>>();
        let count = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), count);
    }

    #[test]
    fn suggest_similar_names() {
        assert_eq!(suggestions("sinn"), vec!["sin", "sinh", "asin"]);
        assert_eq!(suggestions("floorr"), vec!["floor"]);
        assert!(suggestions("zzzzzzzz").is_empty());
    }

    #[test]
    fn wrong_argument_count() {
        let err = find("sin").unwrap().call(&[], &Ctxt::default()).unwrap_err();
        assert_eq!(err.to_string(), "wrong number of arguments to `sin`");
        assert_eq!(find("log").unwrap().describe_arity(), "1 to 2 arguments");
    }
}
