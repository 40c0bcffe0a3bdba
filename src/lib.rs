//! Compiler for the Extended Visual Format Language (EVFL).
//!
//! EVFL is a compact, Auto-Layout-flavored DSL for describing layout
//! constraints as text. A format string holds rows: visual rows such as
//! `H:|-[a]-[b]-|` lay views out along one axis, constraint rows such as
//! `C:a.width(100)` pin individual attributes. Compilation turns the rows
//! into a flat list of symbolic [`ConstraintDef`] records; feeding those to
//! a solver (or anything else) is the consumer's business.
//!
//! ```
//! use evfl::compile;
//!
//! let defs = compile("H:|[a]-[b]-|", None)?;
//! assert_eq!(defs.len(), 3);
//! assert_eq!(defs[1].to_string(), "a.right == b.left * 1 + default @ default");
//! # Ok::<(), evfl::SyntaxError>(())
//! ```
//!
//! In the records, `^` (interchangeably, the empty string) names the
//! superview, and an unset constant means "use the consumer's default
//! spacing" — it is distinct from a constant of zero.

pub mod constraint;
mod error;
mod lower;
pub mod parser;

pub use constraint::{Attribute, ConstraintDef, Relation};
pub use error::SyntaxError;
pub use lower::lower;
pub use parser::ast::Document;
pub use parser::parse;

/// Compile a format string into constraint records.
///
/// `default_priority`, when given, is assigned to every record that does not
/// carry an explicit `@priority`; records that do keep their own.
///
/// ```
/// let defs = evfl::compile("H:[a]-(444@555)-[b]", Some(500))?;
/// assert_eq!(defs[0].priority, Some(555));
/// # Ok::<(), evfl::SyntaxError>(())
/// ```
pub fn compile(
    source: &str,
    default_priority: Option<u32>,
) -> Result<Vec<ConstraintDef>, SyntaxError> {
    let document = parser::parse(source)?;
    Ok(lower::lower(&document, default_priority))
}
