use crate::translator::errors::TranslateError;
use crate::translator::validate::check_unit_name;

/// Per-unit translation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Qualifies static symbols as `<unit>.<index>`.
    pub unit: String,
    /// Prefix every block with a `// <instruction>` comment.
    pub annotate: bool,
}

impl Config {
    /// Annotated output for `unit`. The name is validated at translation time.
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            annotate: true,
        }
    }

    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn validate(&self) -> Result<(), TranslateError> {
        check_unit_name(&self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_annotated() {
        let config = Config::new("Main");
        assert!(config.annotate);
        assert!(!config.with_annotations(false).annotate);
    }

    #[test]
    fn validation() {
        assert!(Config::new("Sys").validate().is_ok());
        assert!(matches!(
            Config::new("1abc").validate(),
            Err(TranslateError::InvalidUnitName { .. })
        ));
    }
}
