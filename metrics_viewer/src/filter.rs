//! Name based family filter

use regex::Regex;

use crate::model::MetricFamily;

/// A predicate over metric family names
///
/// Backed by a single compiled regular expression, matched anywhere in the
/// name. The default filter matches every name.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pattern: Option<Regex>,
}

impl Filter {
    /// Compile `pattern` into a [`Filter`]
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
        })
    }

    /// A filter that keeps every family
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Whether a family named `name` passes the filter
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Drop every family whose name does not pass the filter
    pub fn retain(&self, families: &mut Vec<MetricFamily>) {
        if self.pattern.is_some() {
            families.retain(|family| self.matches(&family.name));
        }
    }

    /// The source pattern, `None` when matching everything
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }
}
