/// Default page size for product listings.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Builder for paginated product listings.
///
/// Page numbers are 1-based. Out-of-range values are normalized rather
/// than rejected: a page below 1 becomes 1, a limit below 1 becomes
/// [`DEFAULT_LIMIT`], and a limit above [`MAX_LIMIT`] is clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    page: u32,
    limit: u32,
    category: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            category: None,
        }
    }
}

impl ProductQuery {
    /// Creates a query for the first page with the default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a query from raw request values.
    pub fn from_params(page: Option<i64>, limit: Option<i64>, category: Option<String>) -> Self {
        let mut query = Self::new();
        if let Some(page) = page {
            query = query.page(page);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        match category {
            Some(category) => query.category(category),
            None => query,
        }
    }

    /// Selects a page (1-based).
    pub fn page(mut self, page: i64) -> Self {
        self.page = u32::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(1);
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = if limit < 1 {
            DEFAULT_LIMIT
        } else {
            u32::try_from(limit).map_or(MAX_LIMIT, |l| l.min(MAX_LIMIT))
        };
        self
    }

    /// Restricts the listing to one category. An empty string means no filter.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.is_empty()).then_some(category);
        self
    }

    pub fn page_number(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.limit
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Number of rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}
