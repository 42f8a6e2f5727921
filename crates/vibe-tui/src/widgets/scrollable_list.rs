//! Generic selectable list with a text filter and a scroll window.

pub struct ScrollableList<T> {
    items: Vec<T>,
    /// Indices into `items` that pass the filter, in display order.
    visible: Vec<usize>,
    selected: usize,
    scroll_offset: usize,
    filter: String,
    filter_fn: Box<dyn Fn(&T, &str) -> bool + Send + Sync>,
}

impl<T> ScrollableList<T> {
    pub fn new(filter_fn: impl Fn(&T, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            filter: String::new(),
            filter_fn: Box::new(filter_fn),
        }
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.rebuild();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Keeps the same item selected when it still passes the new filter.
    pub fn set_filter(&mut self, query: &str) {
        let previous = self.visible.get(self.selected).copied();
        self.filter = query.to_string();
        self.rebuild();
        self.selected = previous
            .and_then(|p| self.visible.iter().position(|&i| i == p))
            .unwrap_or(0);
        self.scroll_offset = 0;
    }

    fn rebuild(&mut self) {
        self.visible = if self.filter.trim().is_empty() {
            (0..self.items.len()).collect()
        } else {
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| (self.filter_fn)(item, &self.filter))
                .map(|(i, _)| i)
                .collect()
        };
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.visible.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    /// Select the first visible item matching `pred`. Returns false when none
    /// does.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) -> bool {
        match self.visible.iter().position(|&i| pred(&self.items[i])) {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(*self.visible.get(self.selected)?)
    }

    /// Adjust the scroll window so the selection is inside `height` rows.
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Items inside the scroll window. Call `ensure_visible` first.
    pub fn visible_items(&self, height: usize) -> Vec<&T> {
        let start = self.scroll_offset.min(self.visible.len());
        let end = (start + height).min(self.visible.len());
        self.visible[start..end]
            .iter()
            .map(|&i| &self.items[i])
            .collect()
    }

    /// Row of the selection relative to the scroll window.
    pub fn selected_in_view(&self) -> usize {
        self.selected.saturating_sub(self.scroll_offset)
    }

    /// Select the item at `row` of the window. Returns false past the end.
    pub fn handle_click(&mut self, row: usize) -> bool {
        let target = self.scroll_offset + row;
        if target < self.visible.len() {
            self.selected = target;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> ScrollableList<&'static str> {
        let mut l = ScrollableList::new(|s: &&'static str, q: &str| s.contains(q));
        l.set_items(vec!["alpha", "beta", "gamma", "delta", "epsilon"]);
        l
    }

    #[test]
    fn test_filter_keeps_selection() {
        let mut l = list();
        l.select_down(3);
        assert_eq!(l.selected_item(), Some(&"delta"));
        l.set_filter("lt");
        assert_eq!(l.len(), 1);
        assert_eq!(l.selected_item(), Some(&"delta"));
        l.set_filter("");
        assert_eq!(l.selected_item(), Some(&"delta"));
    }

    #[test]
    fn test_filter_without_matches() {
        let mut l = list();
        l.set_filter("zzz");
        assert!(l.is_empty());
        assert_eq!(l.selected_item(), None);
        assert_eq!(l.total_len(), 5);
    }

    #[test]
    fn test_scroll_window_follows_selection() {
        let mut l = list();
        l.select_last();
        l.ensure_visible(2);
        assert_eq!(l.visible_items(2), vec![&"delta", &"epsilon"]);
        assert_eq!(l.selected_in_view(), 1);

        l.select_first();
        l.ensure_visible(2);
        assert_eq!(l.visible_items(2), vec![&"alpha", &"beta"]);
    }

    #[test]
    fn test_click_and_select_where() {
        let mut l = list();
        assert!(l.handle_click(2));
        assert_eq!(l.selected_item(), Some(&"gamma"));
        assert!(!l.handle_click(9));
        assert!(l.select_where(|s| s.starts_with('e')));
        assert_eq!(l.selected_item(), Some(&"epsilon"));
        assert!(!l.select_where(|s| s.is_empty()));
    }

    #[test]
    fn test_shrinking_items_clamps_selection() {
        let mut l = list();
        l.select_last();
        l.set_items(vec!["only"]);
        assert_eq!(l.selected_item(), Some(&"only"));
    }
}
