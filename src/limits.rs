use std::sync::Arc;

use crate::filter::Filter;

/// Practically-unbounded sentinel used when a cap resolves to "no limit".
pub const UNBOUNDED: usize = usize::MAX;

/// The six resource caps the [`TreeBuilder`](crate::builder::TreeBuilder)
/// enforces while materialising a tree, plus an optional
/// [`Filter`](crate::filter::Filter).
///
/// A limit of `0` means "use the unbounded sentinel" rather than "forbid
/// everything" — mirroring `apollo_parser::Parser::token_limit`, where a
/// cap only ever narrows, never silently excludes everything.
#[derive(Clone)]
pub struct BuilderLimits {
    max_key_length: usize,
    max_string_length: usize,
    max_mantissa_digits: usize,
    max_exponent_digits: usize,
    max_content_nodes_per_container: usize,
    max_nesting_depth: usize,
    filter: Option<Arc<dyn Filter>>,
}

impl Default for BuilderLimits {
    /// The documented spec.md default: every cap resolves to
    /// "practically unbounded" (an explicit 32,767/127 for the two digit
    /// counts, the [`UNBOUNDED`] sentinel for everything else).
    fn default() -> Self {
        Self::unbounded()
    }
}

impl BuilderLimits {
    /// No caps at all (every field resolves to [`UNBOUNDED`]), matching
    /// spec.md's stated defaults.
    pub fn unbounded() -> Self {
        Self {
            max_key_length: 0,
            max_string_length: 0,
            max_mantissa_digits: 32_767,
            max_exponent_digits: 127,
            max_content_nodes_per_container: 0,
            max_nesting_depth: 0,
            filter: None,
        }
    }

    /// The "secure defaults" preset from spec.md §3, appropriate for
    /// parsing untrusted input.
    pub fn secure_defaults() -> Self {
        Self {
            max_key_length: 1024,
            max_string_length: 0,
            max_mantissa_digits: 19,
            max_exponent_digits: 3,
            max_content_nodes_per_container: 10_000,
            max_nesting_depth: 256,
            filter: None,
        }
    }

    pub fn with_max_key_length(mut self, n: usize) -> Self {
        self.max_key_length = n;
        self
    }

    pub fn with_max_string_length(mut self, n: usize) -> Self {
        self.max_string_length = n;
        self
    }

    pub fn with_max_mantissa_digits(mut self, n: usize) -> Self {
        self.max_mantissa_digits = n;
        self
    }

    pub fn with_max_exponent_digits(mut self, n: usize) -> Self {
        self.max_exponent_digits = n;
        self
    }

    pub fn with_max_content_nodes_per_container(mut self, n: usize) -> Self {
        self.max_content_nodes_per_container = n;
        self
    }

    pub fn with_max_nesting_depth(mut self, n: usize) -> Self {
        self.max_nesting_depth = n;
        self
    }

    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    fn resolve(n: usize) -> usize {
        if n == 0 {
            UNBOUNDED
        } else {
            n
        }
    }

    pub fn max_key_length(&self) -> usize {
        Self::resolve(self.max_key_length)
    }

    pub fn max_string_length(&self) -> usize {
        Self::resolve(self.max_string_length)
    }

    pub fn max_mantissa_digits(&self) -> usize {
        Self::resolve(self.max_mantissa_digits)
    }

    pub fn max_exponent_digits(&self) -> usize {
        Self::resolve(self.max_exponent_digits)
    }

    pub fn max_content_nodes_per_container(&self) -> usize {
        Self::resolve(self.max_content_nodes_per_container)
    }

    pub fn max_nesting_depth(&self) -> usize {
        Self::resolve(self.max_nesting_depth)
    }

    pub fn filter(&self) -> Option<&Arc<dyn Filter>> {
        self.filter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_means_unbounded() {
        let limits = BuilderLimits::unbounded().with_max_nesting_depth(0);
        assert_eq!(limits.max_nesting_depth(), UNBOUNDED);
    }

    #[test]
    fn secure_defaults_match_spec() {
        let limits = BuilderLimits::secure_defaults();
        assert_eq!(limits.max_key_length(), 1024);
        assert_eq!(limits.max_string_length(), UNBOUNDED);
        assert_eq!(limits.max_mantissa_digits(), 19);
        assert_eq!(limits.max_exponent_digits(), 3);
        assert_eq!(limits.max_content_nodes_per_container(), 10_000);
        assert_eq!(limits.max_nesting_depth(), 256);
    }
}
