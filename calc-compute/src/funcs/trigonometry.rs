//! General trigonometric and hyperbolic trigonometric functions.

use calc_error::Error;
use crate::consts::PI;
use crate::numerical::{ctxt::Ctxt, error::OutOfDomain, number::Number, trig_mode::TrigMode};
use crate::primitive::float;
use rug::Float;

/// Converts an angle given in the context's trigonometric mode to radians.
fn to_radians(n: Float, ctxt: &Ctxt) -> Float {
    match ctxt.trig_mode {
        TrigMode::Radians => n,
        TrigMode::Degrees => n * &*PI / 180,
    }
}

/// Converts an angle in radians to the context's trigonometric mode.
fn from_radians(n: Float, ctxt: &Ctxt) -> Float {
    match ctxt.trig_mode {
        TrigMode::Radians => n,
        TrigMode::Degrees => n * 180 / &*PI,
    }
}

/// Build a trigonometric function that takes in a single angle as input.
macro_rules! build_radian_input {
    ($($name:ident; $func:expr),* $(,)?) => {
        $(
            pub fn $name(args: &[Number], ctxt: &Ctxt) -> Result<Number, Error> {
                let n = to_radians(args[0].to_float(), ctxt);
                #[allow(clippy::redundant_closure_call)]
                Number::checked_float(($func)(n))
            }
        )*
    };
}

/// Build an inverse trigonometric function, which returns an angle.
macro_rules! build_radian_output {
    ($($name:ident; $func:expr),* $(,)?) => {
        $(
            pub fn $name(args: &[Number], ctxt: &Ctxt) -> Result<Number, Error> {
                let n = args[0].to_float();
                #[allow(clippy::redundant_closure_call)]
                Number::checked_float(from_radians(($func)(n)?, ctxt))
            }
        )*
    };
}

/// Build a hyperbolic trigonometric function.
macro_rules! build_hyperbolic {
    ($($name:ident; $func:expr),* $(,)?) => {
        $(
            pub fn $name(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
                #[allow(clippy::redundant_closure_call)]
                Number::checked_float(($func)(args[0].to_float()))
            }
        )*
    };
}

/// Checks that the argument of `asin` or `acos` lies in `[-1, 1]`.
fn unit_interval(name: &'static str, n: &Float) -> Result<(), Error> {
    if *n < -1 || *n > 1 {
        Err(Error::spanless(OutOfDomain { name, reason: "is only defined for inputs between -1 and 1" }))
    } else {
        Ok(())
    }
}

build_radian_input! {
    sin; Float::sin,
    cos; Float::cos,
    tan; |n: Float| {
        // tan is undefined where cos is zero, which a float only approaches
        if n.clone().cos().abs() < float(1e-100) {
            Float::with_val(n.prec(), f64::INFINITY)
        } else {
            n.tan()
        }
    },
}

build_radian_output! {
    asin; |n: Float| unit_interval("asin", &n).map(|_| n.asin()),
    acos; |n: Float| unit_interval("acos", &n).map(|_| n.acos()),
    atan; |n: Float| Ok::<_, Error>(n.atan()),
}

build_hyperbolic! {
    sinh; Float::sinh,
    cosh; Float::cosh,
    tanh; Float::tanh,
}

#[cfg(test)]
mod tests {
    use assert_float_eq::{
        assert_float_absolute_eq,
    };
    use super::*;

    fn degrees() -> Ctxt {
        Ctxt::with_trig_mode(TrigMode::Degrees)
    }

    #[test]
    fn sin_in_both_modes() {
        let half_pi = Number::Approx(float(&*PI) / 2);
        assert_float_absolute_eq!(sin(&[half_pi], &Ctxt::default()).unwrap().to_f64(), 1.0);
        assert_float_absolute_eq!(sin(&[Number::int(30)], &degrees()).unwrap().to_f64(), 0.5);
    }

    #[test]
    fn inverse_returns_degrees() {
        let angle = acos(&[Number::int(0)], &degrees()).unwrap();
        assert_float_absolute_eq!(angle.to_f64(), 90.0);
    }

    #[test]
    fn asin_out_of_domain() {
        let err = asin(&[Number::int(2)], &Ctxt::default()).unwrap_err();
        assert_eq!(err.to_string(), "argument out of domain for `asin`");
    }

    #[test]
    fn tan_at_right_angle() {
        assert!(tan(&[Number::int(90)], &degrees()).is_err());
    }
}
