//! Cursor-based pagination
//!
//! Every list operation pages newest-first over UUID v7 ids, whose ordering
//! is creation order. A cursor is the id of the last item of the previous
//! page and is an exclusive upper bound for the next one:
//!
//! ```text
//! page 1: fetch(cursor = None,    limit + 1) -> [i9 i8 i7 | i6]  next = i7
//! page 2: fetch(cursor = Some(i7), limit + 1) -> [i6 i5 i4 | i3]  next = i4
//! page 3: fetch(cursor = Some(i4), limit + 1) -> [i3 i2]          next = None
//! ```
//!
//! The extra row only signals that more items exist; it is never returned.
//! Pagination is forward-only and stateless.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

/// Bounds applied to requested page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Used for missing, unparsable or non-positive limits
    pub default: usize,
    /// Upper clamp
    pub max: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default: 30, max: 100 }
    }
}

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page size, always within `[1, limits.max]`
    pub limit: usize,
    /// Exclusive upper bound on ids
    pub cursor: Option<Uuid>,
}

impl PageRequest {
    /// First page with the default size.
    pub fn first(limits: &PageLimits) -> Self {
        Self {
            limit: limits.default,
            cursor: None,
        }
    }

    /// Normalize raw query parameters.
    ///
    /// - `limit`: non-numeric, zero or negative values use the default;
    ///   values above the maximum are clamped to it
    /// - `cursor`: anything that is not a valid id restarts from the newest item
    ///
    /// # Example
    ///
    /// ```
    /// use chain_directory::pagination::{PageLimits, PageRequest};
    ///
    /// let limits = PageLimits::default();
    /// assert_eq!(PageRequest::parse(Some("500"), None, &limits).limit, 100);
    /// assert_eq!(PageRequest::parse(Some("-5"), None, &limits).limit, 30);
    /// assert_eq!(PageRequest::parse(Some("abc"), Some("garbage"), &limits).cursor, None);
    /// ```
    pub fn parse(limit: Option<&str>, cursor: Option<&str>, limits: &PageLimits) -> Self {
        Self {
            limit: clamp_limit(limit, limits),
            cursor: cursor.and_then(parse_cursor),
        }
    }

    /// Same request pointed at the page after `cursor`.
    pub fn after(self, cursor: Uuid) -> Self {
        Self {
            cursor: Some(cursor),
            ..self
        }
    }
}

fn clamp_limit(raw: Option<&str>, limits: &PageLimits) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n >= 1 => (n as u64).min(limits.max as u64) as usize,
        _ => limits.default,
    }
}

fn parse_cursor(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            debug!(cursor = raw, "Discarding unparsable cursor, restarting from newest");
            None
        }
    }
}

/// Items that can be paged by their creation-ordered id.
pub trait CursorKey {
    /// The ordering key of this item.
    fn cursor_key(&self) -> Uuid;
}

impl CursorKey for chain_org::Organization {
    fn cursor_key(&self) -> Uuid {
        self.id
    }
}

impl CursorKey for chain_org::Restaurant {
    fn cursor_key(&self) -> Uuid {
        self.id
    }
}

impl CursorKey for chain_org::BranchRequest {
    fn cursor_key(&self) -> Uuid {
        self.id
    }
}

/// One page of results: `{items, nextCursor?}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Uuid>,
}

impl<T> Page<T> {
    /// An empty, final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Whether more items follow this page.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Convert the items, keeping the cursor.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

impl<T: CursorKey> Page<T> {
    /// Build a page from up to `limit + 1` descending rows.
    pub fn from_overfetch(mut rows: Vec<T>, limit: usize) -> Self {
        if rows.len() > limit {
            rows.truncate(limit);
            let next_cursor = rows.last().map(CursorKey::cursor_key);
            Self {
                items: rows,
                next_cursor,
            }
        } else {
            Self {
                items: rows,
                next_cursor: None,
            }
        }
    }
}

/// Fetch one page through `fetch`.
///
/// `fetch(cursor, take)` must return at most `take` rows with
/// `id < cursor` (when a cursor is given), ordered by id descending.
pub async fn paginate<T, E, F, Fut>(request: PageRequest, fetch: F) -> Result<Page<T>, E>
where
    T: CursorKey,
    F: FnOnce(Option<Uuid>, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let rows = fetch(request.cursor, request.limit.saturating_add(1)).await?;
    Ok(Page::from_overfetch(rows, request.limit))
}
