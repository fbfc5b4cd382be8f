use crate::prelude::*;

/// Non-fatal finding which does not stop the sizing run.
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Warning {
    #[display("{n_values} value(s) have no unit and were read as watts")]
    MissingUnit { n_values: usize },

    #[display("{n_timestamps} timestamp(s) occur more than once, their values were averaged")]
    DuplicateTimestamps { n_timestamps: usize },

    #[display("the charge and discharge periods overlap")]
    OverlappingPeriods,
}

/// Value together with the warnings collected while producing it.
#[must_use]
#[derive(Clone, Debug)]
pub struct Diagnosed<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Diagnosed<T> {
    pub const fn new(value: T) -> Self {
        Self { value, warnings: Vec::new() }
    }

    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Log the warnings and unwrap the value.
    pub fn into_logged(self) -> T {
        for warning in &self.warnings {
            warn!("{warning}");
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_warning() {
        let diagnosed = Diagnosed::new(2)
            .with_warning(Warning::OverlappingPeriods)
            .with_warning(Warning::DuplicateTimestamps { n_timestamps: 1 });
        assert_eq!(diagnosed.value, 2);
        assert_eq!(
            diagnosed.warnings,
            [Warning::OverlappingPeriods, Warning::DuplicateTimestamps { n_timestamps: 1 }],
        );
    }

    #[test]
    fn test_into_logged() {
        let value = Diagnosed::new("value")
            .with_warning(Warning::MissingUnit { n_values: 3 })
            .into_logged();
        assert_eq!(value, "value");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Warning::MissingUnit { n_values: 3 }.to_string(),
            "3 value(s) have no unit and were read as watts",
        );
    }
}
