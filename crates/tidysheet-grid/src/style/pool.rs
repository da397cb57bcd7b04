//! Style pool for deduplication

use super::Style;
use ahash::AHashMap;

/// Deduplicating store of cell styles
///
/// Report sheets repeat a handful of styles across thousands of cells, so
/// cells hold a `u32` index into this pool instead of an owned `Style`.
/// Index 0 is always the default style.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a pool holding only the default style
    pub fn new() -> Self {
        let default = Style::default();
        let mut index_map = AHashMap::with_capacity(16);
        index_map.insert(default.clone(), 0);
        Self {
            styles: vec![default],
            index_map,
        }
    }

    /// Get the index for a style, inserting it if new
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.index_map.insert(style, idx);
        idx
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// The default style (index 0)
    pub fn default_style(&self) -> &Style {
        &self.styles[0]
    }

    /// Number of distinct styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True when only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_at_zero() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0), Some(&Style::default()));
    }

    #[test]
    fn test_deduplication() {
        let mut pool = StylePool::new();
        let a = pool.get_or_insert(Style::new().bold(true));
        let b = pool.get_or_insert(Style::new().bold(true));
        let c = pool.get_or_insert(Style::new().italic(true));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_default_reuses_index_zero() {
        let mut pool = StylePool::new();
        assert_eq!(pool.get_or_insert(Style::default()), 0);
    }
}
