//! Filtered list query support shared by every list endpoint: free-text
//! filtering, whitelisted sort keys and fixed-size pagination.

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{DatabaseConnection, PaginatorTrait, Selector, SelectorTrait};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Every list view shows this many rows per page.
pub const PAGE_SIZE: u64 = 5;

/// Query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Free-text filter; empty and whitespace-only values are ignored.
    pub q: Option<String>,
    /// Sort key; anything outside the entity's whitelist silently falls
    /// back to the default order.
    pub sort_by: Option<String>,
    /// 1-indexed page; out-of-range values clamp instead of erroring.
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

impl ListParams {
    /// The effective filter term, if any.
    pub fn search_term(&self) -> Option<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64) -> Self {
        let total_pages = total_pages_for(total);
        Self {
            items,
            total,
            page,
            per_page: PAGE_SIZE,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Number of pages a result set spans. An empty set still has one page so
/// clamping never produces page zero.
pub fn total_pages_for(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE).max(1)
}

/// Clamp a requested page into `1..=total_pages`.
pub fn clamp_page(requested: i64, total: u64) -> u64 {
    let wanted = if requested < 1 { 1 } else { requested as u64 };
    wanted.min(total_pages_for(total))
}

/// Case-insensitive substring match: `LOWER(col) LIKE '%term%'` with LIKE
/// metacharacters escaped, so `%` and `_` in the term match literally. Works
/// the same on SQLite and Postgres.
pub fn contains_ci(col: impl IntoColumnRef, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Run a selector through the shared pagination flow: count, clamp the
/// requested page, fetch that page.
pub async fn paginate_selector<'db, S>(
    db: &'db DatabaseConnection,
    selector: Selector<S>,
    requested: i64,
) -> Result<Page<S::Item>>
where
    S: SelectorTrait + Send + Sync + 'db,
{
    let paginator = selector.paginate(db, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let page = clamp_page(requested, total);
    let items = paginator.fetch_page(page - 1).await?;
    Ok(Page::new(items, total, page))
}
