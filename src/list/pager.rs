/// Page bookkeeping for an infinitely scrolling list.
///
/// Every load is issued a [`PageTicket`]. A refresh bumps the generation, so
/// a page requested before the refresh is recognised as stale when it lands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pager {
    current_page: u32,
    last_page: u32,
    loading: bool,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub page: u32,
    /// Append to the loaded items instead of replacing them.
    pub append: bool,
    generation: u64,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Starts over from page 1, superseding any load in flight.
    pub fn begin_refresh(&mut self) -> PageTicket {
        self.generation += 1;
        self.loading = true;
        PageTicket {
            page: 1,
            append: false,
            generation: self.generation,
        }
    }

    /// Ticket for the next page, or `None` while a load is in flight or
    /// when the last page is already loaded.
    pub fn begin_next(&mut self) -> Option<PageTicket> {
        if self.loading || !self.has_next_page() {
            return None;
        }
        self.loading = true;
        Some(PageTicket {
            page: self.current_page + 1,
            append: true,
            generation: self.generation,
        })
    }

    pub fn is_current(&self, ticket: &PageTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Records the outcome of a load. `pages` is `(current_page, last_page)`
    /// on success. Returns `false` for a stale ticket, which leaves the pager
    /// untouched.
    pub fn finish(&mut self, ticket: &PageTicket, pages: Option<(u32, u32)>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        if let Some((current, last)) = pages {
            self.current_page = current;
            self.last_page = last;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_follows_server_counts() {
        let mut pager = Pager::new();
        let ticket = pager.begin_refresh();
        assert!(pager.finish(&ticket, Some((1, 3))));
        assert!(pager.has_next_page());

        let next = pager.begin_next().unwrap();
        assert_eq!(next.page, 2);
        assert!(next.append);
    }

    #[test]
    fn no_next_page_on_last_page() {
        let mut pager = Pager::new();
        let ticket = pager.begin_refresh();
        pager.finish(&ticket, Some((2, 2)));
        assert!(!pager.has_next_page());
        assert!(pager.begin_next().is_none());
        assert!(!pager.is_loading());
    }

    #[test]
    fn in_flight_load_blocks_another() {
        let mut pager = Pager::new();
        let ticket = pager.begin_refresh();
        pager.finish(&ticket, Some((1, 5)));
        let first = pager.begin_next();
        assert!(first.is_some());
        assert!(pager.begin_next().is_none());
    }

    #[test]
    fn refresh_makes_pending_page_stale() {
        let mut pager = Pager::new();
        let ticket = pager.begin_refresh();
        pager.finish(&ticket, Some((1, 5)));
        let stale = pager.begin_next().unwrap();

        let fresh = pager.begin_refresh();
        assert!(!pager.finish(&stale, Some((2, 5))));
        assert!(pager.is_loading());
        assert!(pager.finish(&fresh, Some((1, 4))));
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.last_page(), 4);
    }
}
