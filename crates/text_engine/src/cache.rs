//! Memoized width lookups
//!
//! Layout measures the same short fragments (glyphs, dividers, padding) over
//! and over, so providers are usually wrapped once at startup and shared by
//! reference with every layout call.

use crate::FontMetrics;
use std::collections::HashMap;
use std::sync::RwLock;

/// Wraps a provider and caches `width` results per fragment
#[derive(Debug)]
pub struct CachedMetrics<M> {
    inner: M,
    widths: RwLock<HashMap<String, f32>>,
}

impl<M: FontMetrics> CachedMetrics<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            widths: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Number of memoized fragments
    pub fn cached_len(&self) -> usize {
        self.widths.read().map(|widths| widths.len()).unwrap_or(0)
    }

    /// Drop every memoized width
    pub fn clear(&self) {
        if let Ok(mut widths) = self.widths.write() {
            widths.clear();
        }
    }
}

impl<M: FontMetrics> FontMetrics for CachedMetrics<M> {
    fn width(&self, text: &str) -> f32 {
        if let Ok(widths) = self.widths.read() {
            if let Some(width) = widths.get(text) {
                return *width;
            }
        }

        let width = self.inner.width(text);
        // A poisoned lock only costs us the memo entry
        if let Ok(mut widths) = self.widths.write() {
            widths.insert(text.to_string(), width);
        }
        width
    }

    fn space_width(&self) -> f32 {
        self.inner.space_width()
    }

    fn tab_width(&self) -> f32 {
        self.inner.tab_width()
    }
}
