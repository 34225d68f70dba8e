//! Typed numeric values crossing the module boundary.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use wasmtime::{Val, ValType};

/// A WebAssembly numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    /// 32-bit integer.
    I32,
    /// 64-bit integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl NumberKind {
    /// Map a wasmtime value type; `None` for vectors and references.
    #[must_use]
    pub fn from_val_type(ty: &ValType) -> Option<Self> {
        match ty {
            ValType::I32 => Some(Self::I32),
            ValType::I64 => Some(Self::I64),
            ValType::F32 => Some(Self::F32),
            ValType::F64 => Some(Self::F64),
            _ => None,
        }
    }

    /// The wasmtime value type.
    #[must_use]
    pub fn val_type(self) -> ValType {
        match self {
            Self::I32 => ValType::I32,
            Self::I64 => ValType::I64,
            Self::F32 => ValType::F32,
            Self::F64 => ValType::F64,
        }
    }

    /// Zero of this kind.
    #[must_use]
    pub fn zero(self) -> Number {
        match self {
            Self::I32 => Number::I32(0),
            Self::I64 => Number::I64(0),
            Self::F32 => Number::F32(0.0),
            Self::F64 => Number::F64(0.0),
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        })
    }
}

/// A numeric argument or result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Number {
    /// 32-bit integer.
    I32(i32),
    /// 64-bit integer.
    I64(i64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
}

/// Text that does not parse as the requested kind.
#[derive(Debug, Clone, Error)]
#[error("`{text}` is not a valid {kind}")]
pub struct ParseNumberError {
    /// Offending text.
    pub text: String,
    /// Requested kind.
    pub kind: NumberKind,
}

impl Number {
    /// Kind of this number.
    #[must_use]
    pub fn kind(&self) -> NumberKind {
        match self {
            Self::I32(_) => NumberKind::I32,
            Self::I64(_) => NumberKind::I64,
            Self::F32(_) => NumberKind::F32,
            Self::F64(_) => NumberKind::F64,
        }
    }

    /// Parse `text` as a number of `kind`, e.g. a command-line argument
    /// matched against an export's parameter type.
    ///
    /// # Errors
    ///
    /// Returns [`ParseNumberError`] if the text is not a literal of `kind`.
    pub fn parse_as(text: &str, kind: NumberKind) -> Result<Self, ParseNumberError> {
        let trimmed = text.trim();
        let parsed = match kind {
            NumberKind::I32 => trimmed.parse().map(Self::I32).ok(),
            NumberKind::I64 => trimmed.parse().map(Self::I64).ok(),
            NumberKind::F32 => trimmed.parse().map(Self::F32).ok(),
            NumberKind::F64 => trimmed.parse().map(Self::F64).ok(),
        };
        parsed.ok_or_else(|| ParseNumberError {
            text: text.to_string(),
            kind,
        })
    }

    pub(crate) fn to_val(self) -> Val {
        match self {
            Self::I32(v) => Val::I32(v),
            Self::I64(v) => Val::I64(v),
            Self::F32(v) => Val::F32(v.to_bits()),
            Self::F64(v) => Val::F64(v.to_bits()),
        }
    }

    pub(crate) fn from_val(val: &Val) -> Option<Self> {
        match val {
            Val::I32(v) => Some(Self::I32(*v)),
            Val::I64(v) => Some(Self::I64(*v)),
            Val::F32(bits) => Some(Self::F32(f32::from_bits(*bits))),
            Val::F64(bits) => Some(Self::F64(f64::from_bits(*bits))),
            _ => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
        }
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}
