//! Typed attribute values
//!
//! Operator attributes are a typed variant map rather than an untyped
//! dictionary, so malformed encodings (notably permutation strings) are caught
//! when a pass reads them instead of surfacing later in codegen.

use indexmap::IndexMap;
use thiserror::Error;

/// A single typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// String value (permutations are comma-separated integer strings)
    Str(String),
    /// Integer list
    Ints(Vec<i64>),
}

impl AttrValue {
    /// Get the value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as an integer slice
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(v: Vec<i64>) -> Self {
        AttrValue::Ints(v)
    }
}

/// Attribute map: name → value, insertion order preserved
pub type AttrMap = IndexMap<String, AttrValue>;

/// Failure modes when parsing a permutation string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermParseError {
    /// The string contains no axes
    #[error("empty permutation")]
    Empty,

    /// An element is not a non-negative integer
    #[error("invalid axis `{0}`")]
    InvalidAxis(String),

    /// An axis index exceeds the rank implied by the axis count
    #[error("axis {axis} out of range for rank {rank}")]
    OutOfRange {
        /// Offending axis index
        axis: usize,
        /// Rank implied by the number of axes
        rank: usize,
    },

    /// An axis index occurs more than once
    #[error("axis {0} repeated")]
    Repeated(usize),
}

/// Parse a comma-separated permutation string such as `"0,2,1,3"`
///
/// The result must be a true permutation of `0..n` where `n` is the number of
/// listed axes; anything else is rejected. Downstream codegen consumes these
/// strings verbatim, so passes validate them before committing a rewrite.
pub fn parse_perm(s: &str) -> Result<Vec<usize>, PermParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(PermParseError::Empty);
    }

    let axes: Vec<usize> = trimmed
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<usize>()
                .map_err(|_| PermParseError::InvalidAxis(part.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let rank = axes.len();
    let mut seen = vec![false; rank];
    for &axis in &axes {
        if axis >= rank {
            return Err(PermParseError::OutOfRange { axis, rank });
        }
        if seen[axis] {
            return Err(PermParseError::Repeated(axis));
        }
        seen[axis] = true;
    }

    Ok(axes)
}
