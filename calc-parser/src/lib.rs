//! Parser for the input of the history calculator.
//!
//! The accepted language covers plain calculator syntax (`2x^2 + 3(x - 1)`) and the subset of
//! LaTeX produced by math input fields (`\frac{1}{2} \cdot \sqrt{x}`, `\mathrm{a0}`).

pub mod parser;
pub mod tokenizer;
