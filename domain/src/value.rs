//! Script value type
//!
//! The value set a script run may hand back to the host. Engine adapters
//! convert their native return value into this type; the bridge only ever
//! transports its string rendering.

/// A simple value that can be returned from a script run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Nil,
}

impl std::fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Nil => write!(f, "nil"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_renders_unchanged() {
        assert_eq!(ScriptValue::String("hi:x".into()).to_string(), "hi:x");
    }

    #[test]
    fn test_numeric_rendering() {
        assert_eq!(ScriptValue::Integer(42).to_string(), "42");
        assert_eq!(ScriptValue::Float(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_boolean_and_nil_rendering() {
        assert_eq!(ScriptValue::Boolean(true).to_string(), "true");
        assert_eq!(ScriptValue::Boolean(false).to_string(), "false");
        assert_eq!(ScriptValue::Nil.to_string(), "nil");
    }
}
