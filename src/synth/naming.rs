//! Generated class naming
//!
//! Names are the build tuple's tags joined in order. The default separator is
//! empty (`ChilledFlowSensor`); a non-empty one gives `Chilled_Flow_Sensor`.

/// Joins build tuples into class names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    separator: String,
}

impl Naming {
    /// Plain concatenation
    pub fn concatenate() -> Self {
        Self::default()
    }

    pub fn separated(separator: impl Into<String>) -> Self {
        Self { separator: separator.into() }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn class_name<S: AsRef<str>>(&self, tuple: &[S]) -> String {
        let parts: Vec<&str> = tuple.iter().map(AsRef::as_ref).collect();
        parts.join(&self.separator)
    }
}
