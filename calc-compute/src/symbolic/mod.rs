//! Algebraic manipulation of expressions.
//!
//! # Expression representation
//!
//! Algebraic expressions in this module are represented as a tree of [`SymExpr`] nodes. It's
//! similar to the [`Expr`](calc_parser::parser::expr::Expr) nodes produced by `calc_parser`,
//! with the main difference being that [`SymExpr`] nodes **flatten** out the tree structure.
//!
//! For example, the expression `x + (y + z)` would be represented internally as a single
//! [`SymExpr::Add`] node with _three_ children, `x`, `y`, and `z`. This makes combining like
//! terms (`x + x = 2x`) a matter of scanning a single list.
//!
//! ```
//! use calc_compute::symbolic::expr::{from_ast, SymExpr};
//! use calc_parser::parser::{expr::Expr, Parser};
//!
//! let mut parser = Parser::new("x + (y + z)");
//! let ast_expr = parser.try_parse_full::<Expr>().unwrap();
//!
//! let expr = from_ast(ast_expr).unwrap();
//! assert_eq!(expr, SymExpr::Add(vec![
//!     SymExpr::symbol("x"),
//!     SymExpr::symbol("y"),
//!     SymExpr::symbol("z"),
//! ]));
//! ```
//!
//! # Simplification
//!
//! [`simplify()`] rebuilds an expression through canonical builders that fold numbers and
//! combine like terms and factors, keeping irrational values exact. [`evaluate()`] does the same
//! while approximating constants, irrational powers, and function calls.
//!
//! ```
//! use calc_compute::{symbolic::{expr::from_ast, simplify}, Ctxt};
//! use calc_parser::parser::{expr::Expr, Parser};
//!
//! let ast_expr = Parser::new("x + x + x").try_parse_full::<Expr>().unwrap();
//! let simplified = simplify(&from_ast(ast_expr).unwrap(), &Ctxt::default()).unwrap();
//! assert_eq!(simplified.to_string(), "3 * x");
//! ```

pub mod expr;
pub mod simplify;
pub mod solve;

pub use expr::SymExpr;
pub use simplify::{evaluate, simplify, simplify_with};
pub use solve::solve;
