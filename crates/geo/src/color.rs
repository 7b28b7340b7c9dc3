//! Marker colour assignment.
//!
//! Each point id draws the next unused entry of a fixed, ordered palette and
//! keeps it for the life of the allocator. Colours are never recycled while
//! the allocator lives: an id that drops out of the active set and returns
//! gets its original colour back. Once every entry is taken, new ids share the
//! fallback colour.

use bandit_core::config::PaletteConfig;
use bandit_telemetry::metrics;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Stable id → colour table over a finite palette.
#[derive(Debug, Clone)]
pub struct ColorAllocator {
    palette: Vec<String>,
    fallback: String,
    assignments: HashMap<String, String>,
    consumed: Vec<bool>,
    cursor: usize,
}

impl ColorAllocator {
    /// Allocator over `palette` (in order) with `fallback` for overflow.
    pub fn new(palette: Vec<String>, fallback: impl Into<String>) -> Self {
        let consumed = vec![false; palette.len()];
        Self {
            palette,
            fallback: fallback.into(),
            assignments: HashMap::new(),
            consumed,
            cursor: 0,
        }
    }

    pub fn from_config(config: &PaletteConfig) -> Self {
        Self::new(config.colors.clone(), config.fallback_color.clone())
    }

    /// Colour for `id`, allocating one on first sight.
    ///
    /// Idempotent per id. Exhaustion is not an error: the id is recorded with
    /// the fallback colour and a warning is logged.
    ///
    /// # Example
    /// ```
    /// use bandit_geo::ColorAllocator;
    ///
    /// let mut colors = ColorAllocator::new(vec!["#f00".into(), "#0f0".into()], "#888");
    /// assert_eq!(colors.assign("a"), "#f00");
    /// assert_eq!(colors.assign("b"), "#0f0");
    /// assert_eq!(colors.assign("a"), "#f00");
    /// assert_eq!(colors.assign("c"), "#888");
    /// ```
    pub fn assign(&mut self, id: &str) -> &str {
        if !self.assignments.contains_key(id) {
            let color = match self.next_unused() {
                Some(index) => {
                    self.consumed[index] = true;
                    debug!(point_id = %id, palette_index = index, "Assigned marker colour");
                    self.palette[index].clone()
                }
                None => {
                    warn!(
                        point_id = %id,
                        palette_size = self.palette.len(),
                        "Marker palette exhausted, using fallback colour"
                    );
                    metrics().increment("palette.fallback_assigned");
                    self.fallback.clone()
                }
            };
            self.assignments.insert(id.to_string(), color);
        }

        &self.assignments[id]
    }

    /// Advance the cursor to the next palette entry no other id holds.
    fn next_unused(&mut self) -> Option<usize> {
        while self.cursor < self.palette.len() {
            let index = self.cursor;
            self.cursor += 1;
            if !self.consumed[index] {
                return Some(index);
            }
        }
        None
    }

    /// Recorded colour for `id`, without allocating.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.assignments.get(id).map(String::as_str)
    }

    /// Drop every assignment and rewind the cursor.
    ///
    /// Only for discarding the whole point set; partial updates keep colours.
    pub fn reset(&mut self) {
        self.assignments.clear();
        self.consumed.fill(false);
        self.cursor = 0;
    }

    /// Number of ids with a recorded colour (fallback included).
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Palette entries still available.
    pub fn remaining(&self) -> usize {
        self.consumed.iter().filter(|used| !**used).count()
    }

    /// True once every palette entry has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn palette_size(&self) -> usize {
        self.palette.len()
    }

    pub fn fallback_color(&self) -> &str {
        &self.fallback
    }
}

impl Default for ColorAllocator {
    fn default() -> Self {
        Self::from_config(&PaletteConfig::default())
    }
}
