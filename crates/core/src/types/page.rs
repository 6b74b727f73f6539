//! Offset pagination and sort value types shared by every list view.

use serde::{Deserialize, Serialize};

/// Errors produced while interpreting list query parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Page numbers start at 1.
    #[error("page must be at least 1 (got {0})")]
    InvalidPage(i64),
    /// Page size outside `1..=max`.
    #[error("limit must be between 1 and {max} (got {limit})")]
    InvalidLimit {
        /// Requested page size.
        limit: i64,
        /// Largest accepted page size.
        max: i64,
    },
    /// Sort column not in the entity's allow-list.
    #[error("cannot sort by {0:?}")]
    UnknownSortColumn(String),
    /// Sort direction other than `asc`/`desc`.
    #[error("sort order must be \"asc\" or \"desc\" (got {0:?})")]
    InvalidSortOrder(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// Parse a sort order, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `PageError::InvalidSortOrder` for anything but `asc`/`desc`.
    pub fn parse(s: &str) -> Result<Self, PageError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(PageError::InvalidSortOrder(s.to_owned())),
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Page used when the caller does not ask for one.
    pub const DEFAULT_PAGE: i64 = 1;
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT_LIMIT: i64 = 10;
    /// Largest page size a caller may request.
    pub const MAX_LIMIT: i64 = 100;

    /// Validate a page number and page size.
    ///
    /// # Errors
    ///
    /// Returns `PageError::InvalidPage` if `page < 1` and
    /// `PageError::InvalidLimit` if `limit` is outside `1..=MAX_LIMIT`.
    pub const fn new(page: i64, limit: i64) -> Result<Self, PageError> {
        if page < 1 {
            return Err(PageError::InvalidPage(page));
        }
        if limit < 1 || limit > Self::MAX_LIMIT {
            return Err(PageError::InvalidLimit {
                limit,
                max: Self::MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Build a request from optional query parameters, applying defaults.
    ///
    /// # Errors
    ///
    /// Same as [`PageRequest::new`].
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Result<Self, PageError> {
        Self::new(
            page.unwrap_or(Self::DEFAULT_PAGE),
            limit.unwrap_or(Self::DEFAULT_LIMIT),
        )
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed to hold `total` rows.
    #[must_use]
    pub const fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.limit - 1) / self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of a counted, sorted result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Rows matching the filters, before pagination.
    pub total: i64,
    /// Requested page number.
    pub page: i64,
    /// Requested page size.
    pub limit: i64,
    /// `ceil(total / limit)`.
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assemble a page from its rows, the unpaginated total and the request.
    #[must_use]
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: request.total_pages(total),
        }
    }

    /// Convert the rows with a fallible function, keeping the counts.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_below_one_is_rejected() {
        assert_eq!(PageRequest::new(0, 10), Err(PageError::InvalidPage(0)));
        assert_eq!(PageRequest::new(-3, 10), Err(PageError::InvalidPage(-3)));
    }

    #[test]
    fn test_limit_bounds() {
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, PageRequest::MAX_LIMIT + 1).is_err());
        assert!(PageRequest::new(1, PageRequest::MAX_LIMIT).is_ok());
    }

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_query(None, None).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 5).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 5).unwrap().offset(), 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = PageRequest::new(1, 5).unwrap();
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(5), 1);
        assert_eq!(req.total_pages(6), 2);
        assert_eq!(req.total_pages(7), 2);
    }

    #[test]
    fn test_total_pages_bounds_hold() {
        for limit in 1..=12 {
            let req = PageRequest::new(1, limit).unwrap();
            for total in 1..=60 {
                let pages = req.total_pages(total);
                assert!(total <= pages * limit);
                assert!(total > (pages - 1) * limit);
            }
        }
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), Ok(SortOrder::Asc));
        assert_eq!(SortOrder::parse("DESC"), Ok(SortOrder::Desc));
        assert!(matches!(
            SortOrder::parse("sideways"),
            Err(PageError::InvalidSortOrder(_))
        ));
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec![1, 2], 7, PageRequest::new(1, 2).unwrap());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 4);
        assert_eq!(json["total"], 7);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
