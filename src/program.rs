//! Loading expression trees from JSON program files.
//!
//! A program file holds one serialized [`Expression`], externally tagged by
//! variant name:
//!
//! ```json
//! {"Sequence": {"expressions": [
//!     {"Assign": {"target": {"VarDecl": {"name": "x"}}, "value": {"Integer": {"value": 2}}}},
//!     {"Identifier": {"name": "x"}}
//! ]}}
//! ```

use std::{fs, path::Path};

use thiserror::Error;
use tracing::debug;

use crate::syntax::Expression;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid program: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_program(source: &str) -> Result<Expression, LoadError> {
    Ok(serde_json::from_str(source)?)
}

pub fn load_program(path: impl AsRef<Path>) -> Result<Expression, LoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let program = parse_program(&source)?;
    debug!(path = %path.display(), root = program.kind(), "loaded program");
    Ok(program)
}

/// Serializes `program` in the format [`parse_program`] reads.
pub fn to_json(program: &Expression) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(program)?)
}
