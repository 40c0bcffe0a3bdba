//! Parsing: chumsky grammar over the raw format string, producing the AST

pub mod ast;
mod grammar;

pub use grammar::parse;
