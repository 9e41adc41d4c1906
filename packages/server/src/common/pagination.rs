//! Forward-only keyset pagination over time-ordered ids.
//!
//! Callers pass `first` (page size) and `after` (opaque cursor from the last
//! page). Queries fetch one extra row so the page can report whether another
//! one follows.

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i32 = 25;
pub const MAX_PAGE_SIZE: i32 = 100;

/// Opaque cursor: the base64 form of the last id on a page.
///
/// Ids are UUID v7, so ordering by id is ordering by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(Uuid);

impl Cursor {
    pub fn new(id: Uuid) -> Self {
        Cursor(id)
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_bytes())
    }

    pub fn decode(s: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .context("Invalid cursor: not valid base64")?;
        let uuid = Uuid::from_slice(&bytes).context("Invalid cursor: not a valid UUID")?;
        Ok(Cursor(uuid))
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Pass back as `after` to fetch the next page.
    pub end_cursor: Option<String>,
}

/// Raw pagination input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationArgs {
    pub first: Option<i32>,
    pub after: Option<String>,
}

impl PaginationArgs {
    pub fn first(first: i32) -> Self {
        Self {
            first: Some(first),
            after: None,
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Apply defaults (25) and bounds (1-100) and decode the cursor.
    pub fn validate(&self) -> Result<ValidatedPaginationArgs, &'static str> {
        let limit = self
            .first
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let cursor = self
            .after
            .as_deref()
            .map(Cursor::decode)
            .transpose()
            .map_err(|_| "Invalid cursor")?
            .map(Cursor::into_uuid);

        Ok(ValidatedPaginationArgs { limit, cursor })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPaginationArgs {
    pub limit: i32,
    /// Return only rows with an id strictly greater than this.
    pub cursor: Option<Uuid>,
}

impl ValidatedPaginationArgs {
    /// SQL LIMIT value (limit + 1 to detect another page).
    pub fn fetch_limit(&self) -> i64 {
        (self.limit + 1) as i64
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Build a page from a `fetch_limit()`-sized result, keyed by `id_of`.
    pub fn from_fetched(
        fetched: Vec<T>,
        args: &ValidatedPaginationArgs,
        id_of: impl Fn(&T) -> Uuid,
    ) -> Self {
        let (items, has_next_page) = trim_results(fetched, args.limit);
        let end_cursor = items.last().map(|item| Cursor::new(id_of(item)).encode());
        Page {
            items,
            page_info: PageInfo {
                has_next_page,
                end_cursor,
            },
        }
    }
}

/// Trim results to `limit` and report whether more were fetched.
pub fn trim_results<T>(mut results: Vec<T>, limit: i32) -> (Vec<T>, bool) {
    let limit = limit.max(0) as usize;
    let has_more = results.len() > limit;
    results.truncate(limit);
    (results, has_more)
}
