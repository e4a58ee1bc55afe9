//! Page counting and the bounded window of page links.

/// Number of pages needed for `total_count` results, 0 when there are none
pub fn page_count(total_count: u64, page_size: u32) -> usize {
    if total_count == 0 || page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size)) as usize
}

/// A page-selection event, carrying the zero-based page index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSelection {
    pub index: usize,
}

impl PageSelection {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// 1-based page number to request
    pub fn page_number(self) -> u32 {
        u32::try_from(self.index).map_or(u32::MAX, |i| i.saturating_add(1))
    }
}

/// One entry in the rendered page bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// Zero-based page index
    Page(usize),
    /// Elided pages ("...")
    Break,
}

/// Shape of the page bar: how many pages around the selection and at each end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_range: usize,
    pub margin_pages: usize,
}

impl PageWindow {
    pub fn new(page_range: usize, margin_pages: usize) -> Self {
        Self {
            page_range: page_range.max(1),
            margin_pages,
        }
    }

    /// Links to show for `page_count` pages with `selected` highlighted
    pub fn links(&self, selected: usize, page_count: usize) -> Vec<PageLink> {
        if page_count == 0 {
            return Vec::new();
        }
        if page_count <= self.page_range {
            return (0..page_count).map(PageLink::Page).collect();
        }

        let selected = selected.min(page_count - 1);
        let end = (selected.saturating_sub(self.page_range / 2) + self.page_range).min(page_count);
        let start = end - self.page_range;
        let tail_start = page_count.saturating_sub(self.margin_pages);

        let shown = |index: usize| index < self.margin_pages || index >= tail_start || (start..end).contains(&index);
        // A break standing in for a single page would save nothing; show the page.
        let lone_gap = |index: usize| index > 0 && index + 1 < page_count && shown(index - 1) && shown(index + 1);

        let mut links = Vec::with_capacity(self.page_range + 2 * self.margin_pages + 2);
        for index in 0..page_count {
            if shown(index) || lone_gap(index) {
                links.push(PageLink::Page(index));
            } else if links.last() != Some(&PageLink::Break) {
                links.push(PageLink::Break);
            }
        }
        links
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(10, 1)
    }
}

/// Pagination control state for one result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub window: PageWindow,
    pub page_count: usize,
    /// Zero-based index of the current page
    pub selected: usize,
}

impl Paginator {
    pub fn new(window: PageWindow, page_count: usize, selected: usize) -> Self {
        Self {
            window,
            page_count,
            selected,
        }
    }

    pub fn links(&self) -> Vec<PageLink> {
        self.window.links(self.selected, self.page_count)
    }

    pub fn has_previous(&self) -> bool {
        self.selected > 0 && self.page_count > 0
    }

    pub fn has_next(&self) -> bool {
        self.selected + 1 < self.page_count
    }

    pub fn previous(&self) -> Option<PageSelection> {
        self.has_previous()
            .then(|| PageSelection::new(self.selected.min(self.page_count) - 1))
    }

    pub fn next(&self) -> Option<PageSelection> {
        self.has_next().then(|| PageSelection::new(self.selected + 1))
    }

    pub fn first(&self) -> Option<PageSelection> {
        (self.page_count > 0 && self.selected != 0).then(|| PageSelection::new(0))
    }

    pub fn last(&self) -> Option<PageSelection> {
        let last = self.page_count.checked_sub(1)?;
        (self.selected != last).then(|| PageSelection::new(last))
    }

    /// Select an arbitrary index, if it exists
    pub fn select(&self, index: usize) -> Option<PageSelection> {
        (index < self.page_count).then(|| PageSelection::new(index))
    }
}
