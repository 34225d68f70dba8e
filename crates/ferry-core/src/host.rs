//! Raw call arguments as the calling host hands them over.

use std::fmt;

/// A single argument of a host call.
///
/// The host environment is dynamically typed; arguments arrive untyped and
/// each operation checks them against its own contract. Positions past the
/// end of the argument list read as [`HostValue::Undefined`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    /// Absent argument.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number (the host's numbers are doubles).
    Number(f64),
    /// String.
    String(String),
}

impl HostValue {
    /// Name of the value's type, used in argument error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// Borrow the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value is `undefined` or `null`.
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Argument at `index`, or [`HostValue::Undefined`] past the end.
    #[must_use]
    pub fn nth(args: &[HostValue], index: usize) -> &HostValue {
        static UNDEFINED: HostValue = HostValue::Undefined;
        args.get(index).unwrap_or(&UNDEFINED)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write_number(f, *n),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Print a double the way the host's `String(n)` does: plain notation for
/// decimal exponents in `-7..21`, `d.ddde+x` outside it, no negative zero.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return f.write_str("NaN");
    }
    if n.is_infinite() {
        return f.write_str(if n < 0.0 { "-Infinity" } else { "Infinity" });
    }
    if n == 0.0 {
        return f.write_str("0");
    }
    if n < 0.0 {
        f.write_str("-")?;
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e2`.
    let sci = format!("{:e}", n.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.write_str(&sci);
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.write_str(&sci);
    };
    let digits = mantissa.replace('.', "");
    let count = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    // Position of the decimal point relative to the first digit.
    let point = exp.saturating_add(1);
    let zeros = |len: i32| "0".repeat(usize::try_from(len).unwrap_or(0));

    if count <= point && point <= 21 {
        write!(f, "{digits}{}", zeros(point.saturating_sub(count)))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(usize::try_from(point).unwrap_or(0));
        write!(f, "{whole}.{fraction}")
    } else if -6 < point && point <= 0 {
        write!(f, "0.{}{digits}", zeros(point.saturating_neg()))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            write!(f, "{lead}e{sign}{}", exp.unsigned_abs())
        } else {
            write!(f, "{lead}.{rest}e{sign}{}", exp.unsigned_abs())
        }
    }
}
