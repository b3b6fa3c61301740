//! Pagination

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Page number, starting at one.
    pub page: usize,
    pub page_size: usize,

    /// Items across every page.
    pub total: usize,
}

impl<T> Page<T> {
    /// Cut a full, already ordered listing down to one page.
    ///
    /// Page and page size below one are treated as one.
    #[must_use]
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = items.len();

        let items = items
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Self {
            items,
            page,
            page_size,
            total,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
