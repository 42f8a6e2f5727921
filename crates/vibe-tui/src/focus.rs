//! FocusRing: keyboard focus cycling between the components on screen.

use crate::action::ComponentId;
use crate::router::{bottom_nav_visible, floating_player_visible, Route};

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.items.len() - 1
        } else {
            self.current - 1
        };
        self.current()
    }

    pub fn set(&mut self, id: ComponentId) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.items.contains(&id)
    }

    /// Replace the ring contents, keeping focus on the same component when it
    /// is still present.
    pub fn set_items(&mut self, items: Vec<ComponentId>) {
        let old = self.current();
        self.items = items;
        if let Some(id) = old {
            if let Some(pos) = self.items.iter().position(|&x| x == id) {
                self.current = pos;
                return;
            }
        }
        self.current = 0;
    }

    /// Focus the Nth item (0-indexed). No-op if out of bounds.
    pub fn set_by_position(&mut self, pos: usize) -> Option<ComponentId> {
        if pos < self.items.len() {
            self.current = pos;
            self.current()
        } else {
            None
        }
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

pub fn main_view_id(route: &Route) -> ComponentId {
    match route {
        Route::Welcome => ComponentId::Welcome,
        Route::Home => ComponentId::Home,
        Route::Song(_) => ComponentId::SongDetail,
        Route::Music => ComponentId::Music,
        Route::Favorites => ComponentId::Favorites,
        Route::Bio => ComponentId::Bio,
        Route::Admin => ComponentId::Admin,
    }
}

/// Focusable components for a route: the view itself, then whichever of the
/// floating player and bottom nav are visible there.
pub fn ring_for_route(route: &Route, has_current_song: bool) -> Vec<ComponentId> {
    let path = route.path();
    let mut items = vec![main_view_id(route)];
    if floating_player_visible(&path, has_current_song) {
        items.push(ComponentId::FloatingPlayer);
    }
    if bottom_nav_visible(&path) {
        items.push(ComponentId::BottomNav);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut ring = FocusRing::new(vec![
            ComponentId::Home,
            ComponentId::FloatingPlayer,
            ComponentId::BottomNav,
        ]);
        assert_eq!(ring.current(), Some(ComponentId::Home));
        assert_eq!(ring.prev(), Some(ComponentId::BottomNav));
        assert_eq!(ring.next(), Some(ComponentId::Home));
        assert_eq!(ring.next(), Some(ComponentId::FloatingPlayer));
    }

    #[test]
    fn test_set_items_keeps_focus_when_possible() {
        let mut ring = FocusRing::new(vec![ComponentId::Home, ComponentId::BottomNav]);
        ring.set(ComponentId::BottomNav);
        ring.set_items(vec![ComponentId::Music, ComponentId::BottomNav]);
        assert!(ring.is_focused(ComponentId::BottomNav));

        ring.set_items(vec![ComponentId::SongDetail]);
        assert_eq!(ring.current(), Some(ComponentId::SongDetail));
    }

    #[test]
    fn test_empty_ring() {
        let mut ring = FocusRing::default();
        assert_eq!(ring.next(), None);
        assert_eq!(ring.set_by_position(2), None);
    }

    #[test]
    fn test_ring_follows_visibility_rules() {
        assert_eq!(
            ring_for_route(&Route::Home, true),
            vec![
                ComponentId::Home,
                ComponentId::FloatingPlayer,
                ComponentId::BottomNav
            ]
        );
        assert_eq!(
            ring_for_route(&Route::Home, false),
            vec![ComponentId::Home, ComponentId::BottomNav]
        );
        assert_eq!(
            ring_for_route(&Route::Song("1".into()), true),
            vec![ComponentId::SongDetail]
        );
        assert_eq!(
            ring_for_route(&Route::Admin, true),
            vec![ComponentId::Admin, ComponentId::BottomNav]
        );
    }
}
