//! Conversion from the parser's AST into [`SymExpr`].

use calc_error::Error;
use calc_parser::parser::{
    binary::Binary,
    call::Call,
    expr::Expr as AstExpr,
    literal::Literal,
    token::op::{BinOpKind, UnaryOpKind},
};
use crate::funcs::{self, describe_arity, power};
use crate::numerical::{
    error::{InvalidNumber, NestedEquation, UnknownFunction, WrongArgumentCount},
    number::Number,
};
use super::{Primary, SymExpr};

/// Converts an AST expression into a [`SymExpr`].
///
/// Fails if the expression contains an `=` sign, a number that cannot be read, or a call to a
/// function with the wrong number of arguments. A call to an unknown name with a single argument,
/// such as `x(y + 1)`, is read as implicit multiplication.
pub fn from_ast(expr: AstExpr) -> Result<SymExpr, Error> {
    match expr {
        AstExpr::Literal(Literal::Number(num)) => Number::from_decimal(&num.value)
            .map(SymExpr::number)
            .ok_or_else(|| Error::new(vec![num.span], InvalidNumber)),
        AstExpr::Literal(Literal::Symbol(sym)) => Ok(SymExpr::symbol(sym.name)),
        AstExpr::Paren(paren) => from_ast(paren.into_innermost()),
        AstExpr::Call(call) => from_call(call),
        AstExpr::Unary(unary) => {
            let operand = from_ast(*unary.operand)?;
            Ok(match unary.op.kind {
                UnaryOpKind::Neg => negate(operand),
                UnaryOpKind::Factorial => SymExpr::Primary(Primary::Call("factorial".to_string(), vec![operand])),
            })
        },
        AstExpr::Binary(bin) => from_binary(bin),
    }
}

/// Returns `-1 * expr`, folding the sign into a number literal.
fn negate(expr: SymExpr) -> SymExpr {
    match expr {
        SymExpr::Primary(Primary::Number(n)) => SymExpr::number(n.neg()),
        SymExpr::Mul(mut factors) => {
            factors.insert(0, SymExpr::number(Number::int(-1)));
            SymExpr::Mul(factors)
        },
        expr => SymExpr::Mul(vec![SymExpr::number(Number::int(-1)), expr]),
    }
}

/// Appends `expr` to a list of terms or factors, flattening nested sums or products.
fn push_flat(out: &mut Vec<SymExpr>, expr: SymExpr, kind: BinOpKind) {
    match (expr, kind) {
        (SymExpr::Add(terms), BinOpKind::Add) => out.extend(terms),
        (SymExpr::Mul(factors), BinOpKind::Mul) => out.extend(factors),
        (expr, _) => out.push(expr),
    }
}

fn from_binary(bin: Binary) -> Result<SymExpr, Error> {
    let Binary { lhs, op, rhs, .. } = bin;
    match op.kind {
        BinOpKind::Eq => Err(Error::new(vec![op.span], NestedEquation)),
        BinOpKind::Exp => Ok(SymExpr::Exp(Box::new(from_ast(*lhs)?), Box::new(from_ast(*rhs)?))),
        BinOpKind::Add | BinOpKind::Sub => {
            let mut terms = Vec::new();
            push_flat(&mut terms, from_ast(*lhs)?, BinOpKind::Add);
            let rhs = from_ast(*rhs)?;
            let rhs = if op.kind == BinOpKind::Sub { negate(rhs) } else { rhs };
            push_flat(&mut terms, rhs, BinOpKind::Add);
            Ok(SymExpr::Add(terms))
        },
        BinOpKind::Mul | BinOpKind::Div => {
            let mut factors = Vec::new();
            push_flat(&mut factors, from_ast(*lhs)?, BinOpKind::Mul);
            let rhs = from_ast(*rhs)?;
            if op.kind == BinOpKind::Div {
                factors.push(SymExpr::Exp(Box::new(rhs), Box::new(SymExpr::number(Number::int(-1)))));
            } else {
                push_flat(&mut factors, rhs, BinOpKind::Mul);
            }
            Ok(SymExpr::Mul(factors))
        },
    }
}

fn from_call(call: Call) -> Result<SymExpr, Error> {
    let name = call.name.name.clone();
    let given = call.args.len();
    let spans = call.outer_span().to_vec();
    let wrong_count = |expected: String| {
        Error::new(spans.clone(), WrongArgumentCount {
            name: name.clone(),
            expected,
            given,
        })
    };

    if let Some(arity) = power::arity(&name) {
        if arity != given {
            return Err(wrong_count(describe_arity(arity, arity)));
        }
        let args = convert_args(call.args)?;
        return power::lower(&name, args)
            .ok_or_else(|| wrong_count(describe_arity(arity, arity)));
    }

    if let Some(builtin) = funcs::find(&name) {
        if !builtin.accepts(given) {
            return Err(wrong_count(builtin.describe_arity()));
        }
        let args = convert_args(call.args)?;
        return Ok(SymExpr::Primary(Primary::Call(name, args)));
    }

    if given == 1 {
        let mut args = convert_args(call.args)?;
        let mut factors = vec![SymExpr::symbol(name)];
        if let Some(arg) = args.pop() {
            push_flat(&mut factors, arg, BinOpKind::Mul);
        }
        return Ok(SymExpr::Mul(factors));
    }

    Err(Error::new(spans, UnknownFunction {
        suggestions: funcs::suggestions(&name),
        name,
    }))
}

fn convert_args(args: Vec<AstExpr>) -> Result<Vec<SymExpr>, Error> {
    args.into_iter().map(from_ast).collect()
}

#[cfg(test)]
mod tests {
    use calc_parser::parser::Parser;
    use pretty_assertions::assert_eq;
    use crate::primitive::rational;
    use super::*;

    fn convert(input: &str) -> Result<SymExpr, Error> {
        from_ast(Parser::new(input).try_parse_full::<AstExpr>().unwrap())
    }

    fn sym(name: &str) -> SymExpr {
        SymExpr::symbol(name)
    }

    #[test]
    fn flatten_sums() {
        assert_eq!(convert("x + (y + z)").unwrap(), SymExpr::Add(vec![sym("x"), sym("y"), sym("z")]));
    }

    #[test]
    fn subtraction_and_division() {
        assert_eq!(convert("a - b").unwrap(), SymExpr::Add(vec![
            sym("a"),
            SymExpr::Mul(vec![SymExpr::number(Number::int(-1)), sym("b")]),
        ]));
        assert_eq!(convert("a / 2").unwrap(), SymExpr::Mul(vec![
            sym("a"),
            SymExpr::Exp(Box::new(SymExpr::number(Number::int(2))), Box::new(SymExpr::number(Number::int(-1)))),
        ]));
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(convert("0.1").unwrap(), SymExpr::number(Number::Exact(rational((1, 10)))));
        assert_eq!(convert("-2").unwrap(), SymExpr::number(Number::int(-2)));
    }

    #[test]
    fn unknown_single_argument_call_is_multiplication() {
        assert_eq!(convert("x(y + 1)").unwrap(), SymExpr::Mul(vec![
            sym("x"),
            SymExpr::Add(vec![sym("y"), SymExpr::number(Number::int(1))]),
        ]));
    }

    #[test]
    fn sqrt_is_lowered() {
        assert_eq!(convert("sqrt(4)").unwrap().to_string(), "sqrt(4)");
        assert_eq!(convert(r"\sqrt[3]{x}").unwrap().to_string(), "x^(3^-1)");
    }

    #[test]
    fn conversion_errors() {
        let err = convert("f(1, 2)").unwrap_err();
        assert_eq!(err.to_string(), "unknown function `f`");
        assert_eq!(err.spans.len(), 2);

        assert_eq!(convert("sin(1, 2)").unwrap_err().to_string(), "wrong number of arguments to `sin`");
        assert_eq!(convert("(x = 1) + 2").unwrap_err().to_string(), "misplaced equation");
    }
}
