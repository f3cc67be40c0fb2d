use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Platform-scoped chart identifier.
///
/// Opaque beyond being non-empty; platforms that need integer ids check that
/// themselves via [`ChartId::as_integer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChartId(String);

impl ChartId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyChartId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.0.parse::<i64>().ok()
    }
}

impl Display for ChartId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ChartId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ChartId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ChartId> for String {
    fn from(value: ChartId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let parsed = ChartId::parse(" 3778678 ").expect("chart id should parse");
        assert_eq!(parsed.as_str(), "3778678");
        assert_eq!(parsed.as_integer(), Some(3_778_678));
    }

    #[test]
    fn rejects_blank_input() {
        let err = ChartId::parse("   ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyChartId);
    }

    #[test]
    fn non_numeric_ids_are_kept_but_have_no_integer_form() {
        let parsed = ChartId::parse("top-500").expect("chart id should parse");
        assert_eq!(parsed.as_integer(), None);
    }
}
