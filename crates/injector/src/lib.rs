//! # Artifact Injector
//!
//! Rewrites the literal value of named field declarations in Java test
//! sources. Textual, not a parser: comments and string literals are masked
//! so only real declarations are touched.
//!
//! ```text
//! name ─┬─> @Parameter("name") [modifiers] Type var = <literal>;   (first)
//!       └─> Type name = <literal>;                                  (fallback)
//!                                     │
//!                 declared Type ──> format_literal(value) ──> replace <literal> only
//! ```
//!
//! ## Example
//!
//! ```rust
//! use artifact_injector::{inject, ParameterValue};
//! use std::collections::BTreeMap;
//!
//! let source = "@Parameter(\"limit\")\nprivate long limit = 10L;\n";
//! let mods = BTreeMap::from([("limit".to_string(), ParameterValue::from(25))]);
//! assert_eq!(
//!     inject(source, &mods).unwrap(),
//!     "@Parameter(\"limit\")\nprivate long limit = 25L;\n"
//! );
//! ```

mod error;
mod literal;
mod mask;
mod rewrite;
mod value;

pub use error::{InjectorError, Result};
pub use literal::{format_literal, quote, DeclaredType};
pub use mask::CodeMask;
pub use rewrite::{extract_parameters, inject, inject_with_report, InjectionReport, ParameterInfo};
pub use value::ParameterValue;
