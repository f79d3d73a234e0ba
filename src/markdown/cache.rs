//! Memoization cache for markdown rendering
//!
//! Caches rendered output keyed by a hash of the input content.
//! When the same content is requested, returns the cached markup instead of
//! re-parsing.

use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Mutex, PoisonError};

use crate::markdown::{MarkdownRenderer, RENDER_CACHE_MAX_ENTRIES};
use crate::traits::Renderer;

/// Memoization cache for rendered markup.
///
/// Finished messages never change, so re-rendering a conversation only
/// parses the reply that is still streaming. When full, the oldest entry
/// is evicted first.
#[derive(Debug)]
pub struct RenderCache {
    /// Cache entries keyed by content hash
    entries: HashMap<u64, String>,
    /// Insertion order for eviction (oldest first)
    insertion_order: VecDeque<u64>,
    capacity: usize,
    /// Statistics: cache hits
    hits: u64,
    /// Statistics: cache misses
    misses: u64,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderCache {
    /// Create a new empty cache holding up to [`RENDER_CACHE_MAX_ENTRIES`]
    pub fn new() -> Self {
        Self::with_capacity(RENDER_CACHE_MAX_ENTRIES)
    }

    /// Create a cache holding up to `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Compute a hash for the given content string
    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Return the cached markup for `content`, rendering it on a miss.
    pub fn get_or_render<F>(&mut self, content: &str, render: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        let hash = Self::hash_content(content);

        if let Some(cached) = self.entries.get(&hash) {
            self.hits += 1;
            return cached.clone();
        }

        self.misses += 1;
        let markup = render(content);

        while self.entries.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.entries.insert(hash, markup.clone());
        self.insertion_order.push_back(hash);

        markup
    }

    /// Get cache statistics (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    /// Invalidate a specific content entry
    pub fn invalidate(&mut self, content: &str) {
        let hash = Self::hash_content(content);
        if self.entries.remove(&hash).is_some() {
            self.insertion_order.retain(|&h| h != hash);
        }
    }
}

/// A [`Renderer`] that memoizes another renderer's output.
#[derive(Debug)]
pub struct CachedRenderer<R: Renderer = MarkdownRenderer> {
    inner: R,
    cache: Mutex<RenderCache>,
}

impl<R: Renderer> CachedRenderer<R> {
    pub fn new(inner: R) -> Self {
        Self::with_cache(inner, RenderCache::new())
    }

    pub fn with_cache(inner: R, cache: RenderCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    /// Get cache statistics (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stats()
    }
}

impl Default for CachedRenderer<MarkdownRenderer> {
    fn default() -> Self {
        Self::new(MarkdownRenderer)
    }
}

impl<R: Renderer> Renderer for CachedRenderer<R> {
    fn render(&self, markdown: &str) -> String {
        // A panic inside a render leaves the cache consistent, so poisoning is ignored
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get_or_render(markdown, |content| self.inner.render(content))
    }
}
