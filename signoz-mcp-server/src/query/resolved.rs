//! Outcome of a lenient parse

/// A value that was either parsed from input or fell back to a default
///
/// Callers of the tool surface only see the value; the tag exists so
/// tests and logs can tell the two paths apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Parsed(T),
    Defaulted { value: T, reason: String },
}

impl<T> Resolved<T> {
    pub fn defaulted(value: T, reason: impl Into<String>) -> Self {
        Self::Defaulted {
            value,
            reason: reason.into(),
        }
    }

    #[cfg(test)]
    pub fn value(&self) -> &T {
        match self {
            Self::Parsed(value) | Self::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Parsed(value) | Self::Defaulted { value, .. } => value,
        }
    }

    #[cfg(test)]
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Defaulted { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let parsed = Resolved::Parsed(5);
        assert!(!parsed.is_defaulted());
        assert!(parsed.reason().is_none());
        assert_eq!(*parsed.value(), 5);

        let defaulted = Resolved::defaulted(60, "empty");
        assert!(defaulted.is_defaulted());
        assert_eq!(defaulted.reason(), Some("empty"));
        assert_eq!(defaulted.into_value(), 60);
    }
}
