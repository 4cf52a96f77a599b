//! Client-side view state for the dashboard. The server owns the data; this
//! only tracks which slice of it is on screen.

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub search: String,
    /// "PAID" or "UNPAID"; `None` shows both.
    pub status: Option<&'static str>,
    pub descending: bool,
    pub page: i64,
    pub limit: i64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            descending: false,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListState {
    /// Changing what is filtered restarts from the first page; staying on
    /// page 3 of a filter that now has one page would show nothing.
    pub fn set_search(&mut self, search: String) {
        self.search = search;
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<&'static str>) {
        self.status = status;
        self.page = 1;
    }

    pub fn toggle_sort(&mut self) {
        self.descending = !self.descending;
        self.page = 1;
    }

    pub fn set_limit(&mut self, limit: i64) {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self.page = 1;
    }

    pub fn next_page(&mut self, total_pages: i64) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// After a delete the current page can fall past the end; snap back to
    /// the last page that still exists. Returns whether the page moved, so
    /// the caller knows the fetched slice is stale.
    pub fn clamp_page(&mut self, total_pages: i64) -> bool {
        if self.page > total_pages {
            self.page = total_pages.max(1);
            return true;
        }
        false
    }

    pub fn sort_token(&self) -> &'static str {
        if self.descending {
            "invoiceNo_desc"
        } else {
            "invoiceNo_asc"
        }
    }

    /// Query string for the list route.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        query.extend(self.filter_query());
        query
    }

    /// Query string for the export routes; same filter, no pagination.
    pub fn filter_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("sort", self.sort_token().to_owned())];
        if !self.search.trim().is_empty() {
            query.push(("search", self.search.trim().to_owned()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_owned()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_changes_reset_the_page() {
        let mut state = ListState::default();
        state.page = 4;
        state.set_search("INV".to_owned());
        assert_eq!(state.page, 1);

        state.page = 4;
        state.set_status(Some("PAID"));
        assert_eq!(state.page, 1);

        state.page = 4;
        state.toggle_sort();
        assert_eq!(state.page, 1);
        assert!(state.descending);

        state.page = 4;
        state.set_limit(25);
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, 25);
    }

    #[test]
    fn limit_is_clamped() {
        let mut state = ListState::default();
        state.set_limit(0);
        assert_eq!(state.limit, 1);
        state.set_limit(500);
        assert_eq!(state.limit, MAX_LIMIT);
    }

    #[test]
    fn paging_stays_in_bounds() {
        let mut state = ListState::default();
        state.prev_page();
        assert_eq!(state.page, 1);
        state.next_page(3);
        state.next_page(3);
        state.next_page(3);
        assert_eq!(state.page, 3);

        assert!(state.clamp_page(2));
        assert_eq!(state.page, 2);
        assert!(!state.clamp_page(2));
        assert!(state.clamp_page(0));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn query_omits_empty_filters() {
        let state = ListState::default();
        let query = state.query();
        assert_eq!(
            query,
            vec![
                ("page", "1".to_owned()),
                ("limit", "10".to_owned()),
                ("sort", "invoiceNo_asc".to_owned()),
            ]
        );

        let mut state = ListState::default();
        state.set_search("  acme  ".to_owned());
        state.set_status(Some("UNPAID"));
        state.toggle_sort();
        let query = state.filter_query();
        assert_eq!(
            query,
            vec![
                ("sort", "invoiceNo_desc".to_owned()),
                ("search", "acme".to_owned()),
                ("status", "UNPAID".to_owned()),
            ]
        );
    }
}
