//! Stable color assignment per entity.

use std::collections::HashMap;

use mapcard_domain::color::Color;
use mapcard_domain::id::EntityId;

/// Hands out palette colors in first-seen order and never forgets them.
///
/// Shared by live markers and history paths so that an entity keeps the same
/// color on both.
#[derive(Debug, Default)]
pub struct ColorCache {
    assigned: HashMap<EntityId, Color>,
    next_index: usize,
}

impl ColorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Color of `entity_id`, allocating the next palette entry on first use.
    pub fn color_for(&mut self, entity_id: &EntityId) -> Color {
        if let Some(color) = self.assigned.get(entity_id) {
            return *color;
        }
        let color = Color::by_index(self.next_index);
        self.next_index += 1;
        self.assigned.insert(entity_id.clone(), color);
        color
    }

    /// Number of entities that have been assigned a color.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
