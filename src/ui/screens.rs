use crate::store::{Catalog, Roster};

/// Rows moved by PageUp/PageDown.
pub(crate) const PAGE_STEP: isize = 5;

/// Clamp `selected + offset` into `0..len`.
fn offset_selection(selected: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let moved = if offset.is_negative() {
        selected.saturating_sub(offset.unsigned_abs())
    } else {
        selected.saturating_add(offset.unsigned_abs())
    };
    moved.min(len - 1)
}

/// Catalog listing, optionally narrowed by a search term. Rows are catalog
/// indices so the listing never holds stale copies of the books.
pub(crate) struct BookListScreen {
    pub(crate) filter: Option<String>,
    pub(crate) rows: Vec<usize>,
    pub(crate) selected: usize,
}

impl BookListScreen {
    pub(crate) fn new(catalog: &Catalog) -> Self {
        let mut screen = Self {
            filter: None,
            rows: Vec::new(),
            selected: 0,
        };
        screen.refresh(catalog);
        screen
    }

    /// Recompute the visible rows after the catalog or the filter changed.
    pub(crate) fn refresh(&mut self, catalog: &Catalog) {
        self.rows = match self.filter.as_deref() {
            Some(term) if !term.trim().is_empty() => catalog.search_indices(term.trim()),
            _ => (0..catalog.len()).collect(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>, catalog: &Catalog) {
        self.filter = filter;
        self.selected = 0;
        self.refresh(catalog);
    }

    /// Catalog index of the highlighted row.
    pub(crate) fn current_index(&self) -> Option<usize> {
        self.rows.get(self.selected).copied()
    }

    /// Highlight the row showing catalog index `index`, if visible.
    pub(crate) fn focus_index(&mut self, index: usize) {
        if let Some(row) = self.rows.iter().position(|&i| i == index) {
            self.selected = row;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = offset_selection(self.selected, offset, self.rows.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

/// Roster listing with the selected student's loans shown alongside.
pub(crate) struct StudentListScreen {
    pub(crate) selected: usize,
    len: usize,
}

impl StudentListScreen {
    pub(crate) fn new(roster: &Roster) -> Self {
        Self {
            selected: 0,
            len: roster.len(),
        }
    }

    pub(crate) fn refresh(&mut self, roster: &Roster) {
        self.len = roster.len();
        if self.len == 0 {
            self.selected = 0;
        } else if self.selected >= self.len {
            self.selected = self.len - 1;
        }
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        (self.selected < self.len).then_some(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = offset_selection(self.selected, offset, self.len);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    pub(crate) fn select(&mut self, index: usize) {
        if index < self.len {
            self.selected = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use crate::store::GrowthPolicy;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new(4, GrowthPolicy::default()).unwrap();
        for (title, author) in [
            ("Harry Potter", "Rowling"),
            ("Dune", "Herbert"),
            ("The Casual Vacancy", "Rowling"),
        ] {
            catalog.add(NewBook::new(title, [author], 2000, 100)).unwrap();
        }
        catalog
    }

    #[test]
    fn selection_is_clamped() {
        assert_eq!(offset_selection(0, -3, 4), 0);
        assert_eq!(offset_selection(1, 10, 4), 3);
        assert_eq!(offset_selection(2, -1, 4), 1);
        assert_eq!(offset_selection(5, 1, 0), 0);
    }

    #[test]
    fn filter_keeps_catalog_indices() {
        let catalog = catalog();
        let mut screen = BookListScreen::new(&catalog);
        assert_eq!(screen.rows, vec![0, 1, 2]);

        screen.set_filter(Some("ROWLING".into()), &catalog);
        assert_eq!(screen.rows, vec![0, 2]);
        screen.move_selection(PAGE_STEP);
        assert_eq!(screen.current_index(), Some(2));

        screen.set_filter(Some("   ".into()), &catalog);
        assert_eq!(screen.rows, vec![0, 1, 2]);
    }

    #[test]
    fn refresh_pulls_selection_back_after_removal() {
        let mut catalog = catalog();
        let mut screen = BookListScreen::new(&catalog);
        screen.select_last();
        assert!(catalog.remove("Casual"));
        screen.refresh(&catalog);
        assert_eq!(screen.current_index(), Some(1));
    }

    #[test]
    fn student_screen_tracks_roster_length() {
        let mut roster = Roster::new(2, GrowthPolicy::default(), 3).unwrap();
        let mut screen = StudentListScreen::new(&roster);
        assert_eq!(screen.current_index(), None);

        roster.add(1, "Alice").unwrap();
        roster.add(2, "Bob").unwrap();
        screen.refresh(&roster);
        screen.select(1);
        assert_eq!(screen.current_index(), Some(1));
        screen.move_selection(-PAGE_STEP);
        assert_eq!(screen.current_index(), Some(0));
    }
}
