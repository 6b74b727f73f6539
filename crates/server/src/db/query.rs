//! Paginated query engine shared by every list view.
//!
//! A [`PaginatedQuery`] is a fixed `SELECT`/`FROM` pair plus a set of
//! [`Filter`]s, a [`Sort`] and a [`PageRequest`]. Running it counts the
//! filtered rows, then fetches one sorted slice, both inside a single read
//! transaction.
//!
//! Only fixed SQL fragments are ever pushed as text. Sort columns come from a
//! [`Sortable`] allow-list and every filter value is a bound parameter.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use rolodex_core::{Page, PageError, PageRequest, SortOrder};

/// Escape character used in every `LIKE` predicate.
const LIKE_ESCAPE: char = '\\';

/// An allow-listed set of sort keys for one entity.
pub trait Sortable: Copy + Sized {
    /// Key used when the caller does not choose one.
    const DEFAULT: Self;

    /// Look up a key by its public name.
    fn from_name(name: &str) -> Option<Self>;

    /// Qualified SQL column for this key.
    fn column(self) -> &'static str;

    /// Qualified SQL identity column, appended to every ordering.
    fn tie_breaker() -> &'static str;
}

/// A validated sort key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<S> {
    pub column: S,
    pub order: SortOrder,
}

impl<S: Sortable> Sort<S> {
    /// Build a sort from optional `sortBy`/`sortOrder` parameters.
    ///
    /// Missing or blank values fall back to the entity default, ascending.
    ///
    /// # Errors
    ///
    /// Returns `PageError::UnknownSortColumn` for a key outside the allow-list
    /// and `PageError::InvalidSortOrder` for a direction other than asc/desc.
    pub fn from_query(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<Self, PageError> {
        let column = match non_blank(sort_by) {
            Some(name) => {
                S::from_name(name).ok_or_else(|| PageError::UnknownSortColumn(name.to_owned()))?
            }
            None => S::DEFAULT,
        };
        let order = match non_blank(sort_order) {
            Some(order) => SortOrder::parse(order)?,
            None => SortOrder::default(),
        };
        Ok(Self { column, order })
    }
}

impl<S: Sortable> Default for Sort<S> {
    fn default() -> Self {
        Self {
            column: S::DEFAULT,
            order: SortOrder::Asc,
        }
    }
}

/// One predicate in a `WHERE` clause. Top-level filters are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// At least one of `columns` contains `term` as a literal substring.
    Contains {
        columns: &'static [&'static str],
        term: String,
    },
    /// Some row of a correlated subquery satisfies every inner filter.
    ///
    /// Renders as `EXISTS (SELECT 1 FROM {from} WHERE {correlation} AND ...)`.
    Exists {
        from: &'static str,
        correlation: &'static str,
        filters: Vec<Self>,
    },
}

impl Filter {
    /// Substring filter over `columns`, or `None` when `term` is absent or blank.
    #[must_use]
    pub fn contains(columns: &'static [&'static str], term: Option<&str>) -> Option<Self> {
        non_blank(term).map(|term| Self::Contains {
            columns,
            term: term.to_owned(),
        })
    }

    fn push_to(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Self::Contains { columns, term } => {
                let pattern = like_pattern(term);
                qb.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column)
                        .push(" LIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\'");
                }
                qb.push(")");
            }
            Self::Exists {
                from,
                correlation,
                filters,
            } => {
                qb.push("EXISTS (SELECT 1 FROM ")
                    .push(*from)
                    .push(" WHERE ")
                    .push(*correlation);
                for filter in filters {
                    qb.push(" AND ");
                    filter.push_to(qb);
                }
                qb.push(")");
            }
        }
    }
}

/// A counted, filtered, sorted, paginated selection.
#[derive(Debug, Clone)]
pub struct PaginatedQuery<S> {
    select: &'static str,
    from: &'static str,
    filters: Vec<Filter>,
    sort: Sort<S>,
    page: PageRequest,
}

impl<S: Sortable> PaginatedQuery<S> {
    /// Start a query.
    ///
    /// `select` is the column list (`SELECT ...`) and `from` the table
    /// expression including any joins (`FROM ... JOIN ...`).
    #[must_use]
    pub const fn new(
        select: &'static str,
        from: &'static str,
        sort: Sort<S>,
        page: PageRequest,
    ) -> Self {
        Self {
            select,
            from,
            filters: Vec::new(),
            sort,
            page,
        }
    }

    /// Add a filter if there is one.
    #[must_use]
    pub fn filter(mut self, filter: Option<Filter>) -> Self {
        self.filters.extend(filter);
        self
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, filter) in self.filters.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            filter.push_to(qb);
        }
    }

    /// SQL counting every filtered row.
    fn count_sql(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) ");
        qb.push(self.from);
        self.push_where(&mut qb);
        qb
    }

    /// SQL fetching the requested slice.
    fn page_sql(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(self.select);
        qb.push(" ").push(self.from);
        self.push_where(&mut qb);

        let column = self.sort.column.column();
        qb.push(" ORDER BY ")
            .push(column)
            .push(" ")
            .push(self.sort.order.as_sql());
        if column != S::tie_breaker() {
            qb.push(", ").push(S::tie_breaker()).push(" ASC");
        }

        qb.push(" LIMIT ")
            .push_bind(self.page.limit())
            .push(" OFFSET ")
            .push_bind(self.page.offset());
        qb
    }

    /// Count the filtered rows, then fetch one page of them.
    ///
    /// A page past the end yields no rows but the same `total`/`total_pages`.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if either statement fails.
    pub async fn fetch<T>(self, pool: &SqlitePool) -> Result<Page<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut tx = pool.begin().await?;

        let total: i64 = self
            .count_sql()
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await?;
        let rows: Vec<T> = self
            .page_sql()
            .build_query_as()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            total,
            page = self.page.page(),
            limit = self.page.limit(),
            returned = rows.len(),
            "paginated query"
        );
        Ok(Page::new(rows, total, self.page))
    }
}

/// Trimmed value, or `None` if it is absent or only whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `%term%` with `LIKE` wildcards in `term` escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
