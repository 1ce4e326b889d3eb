//! Parse-once cache for signature text.

use super::{parser, Signature};
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Maps signature text to its parsed form.
///
/// Owned by whoever needs it (typically one per member registry) rather than
/// shared process-wide. Safe to use from many threads; failed parses are not
/// cached.
#[derive(Debug, Default)]
pub struct SignatureCache {
    entries: DashMap<String, Arc<Signature>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed signature for `text`, parsing it on first use.
    pub fn parse(&self, text: &str) -> Result<Arc<Signature>> {
        if let Some(hit) = self.entries.get(text) {
            return Ok(Arc::clone(hit.value()));
        }

        let parsed = Arc::new(parser::parse(text)?);
        trace!(signature = text, "cached signature");
        let entry = self
            .entries
            .entry(text.to_string())
            .or_insert(parsed);
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_instance() {
        let cache = SignatureCache::new();
        let a = cache.parse("add::i(iii)").unwrap();
        let b = cache.parse("add::i(iii)").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = SignatureCache::new();
        assert!(cache.parse("add::i(x)").is_err());
        assert!(cache.is_empty());
    }
}
