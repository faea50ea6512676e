//! Pagination types: page requests, clamping limits, and result pages.
//!
//! Pagination here is offset/limit based and is designed to be fed straight
//! from HTTP query parameters, so [`PageRequest`] carries *signed* values and
//! every out-of-range input is clamped rather than rejected:
//!
//! - a negative offset is treated as 0;
//! - a zero or negative limit means "use the configured default";
//! - a limit above the configured maximum is capped at that maximum;
//! - an offset past the end of the collection yields an empty page.
//!
//! A request therefore never fails with an out-of-bounds error.

use serde::{Deserialize, Serialize};

/// An offset/limit window into a collection, as requested by the caller.
///
/// The default request (`offset = 0`, `limit = 0`) reads as "first page,
/// default page size" once normalized against a [`PageLimits`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    /// Number of records to skip. Negative values are clamped to 0.
    pub offset: i64,
    /// Maximum number of records to return. Zero or negative means "use the
    /// default limit"; values above the maximum are capped.
    pub limit: i64,
}

impl PageRequest {
    /// Creates a page request with the given raw offset and limit.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Resolves this request against the given limits, producing the actual
    /// `(offset, limit)` pair to slice with.
    pub fn normalize(&self, limits: &PageLimits) -> (usize, usize) {
        let offset = self.offset.max(0) as usize;

        let limit = if self.limit <= 0 {
            limits.default_limit
        } else {
            (self.limit as usize).min(limits.max_limit)
        };

        (offset, limit)
    }
}

/// Caller-configured bounds on page sizes.
///
/// `default_limit` is used when a request does not name a usable limit;
/// `max_limit` bounds the response size regardless of what the caller asks
/// for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Page size used when the request limit is zero or negative.
    pub default_limit: usize,
    /// Hard upper bound on any page size.
    pub max_limit: usize,
}

impl PageLimits {
    /// Creates page limits with the given default and maximum page sizes.
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self { default_limit, max_limit }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default_limit: 10, max_limit: 100 }
    }
}

/// A single page of results.
///
/// `total` is the number of records that matched *before* the offset/limit
/// slice, so a consumer can derive next/previous links without a second
/// query. `offset` and `limit` are the normalized values the slice was taken
/// with, not the raw request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The records in this page, in result order.
    pub items: Vec<T>,
    /// Total matching records across all pages.
    pub total: usize,
    /// The normalized offset this page was sliced at.
    pub offset: usize,
    /// The normalized limit this page was sliced with.
    pub limit: usize,
}

impl<T> Page<T> {
    /// Builds a page by slicing `items` according to `request`, clamped
    /// against `limits`.
    ///
    /// `items` must already be filtered and sorted; the slice is the final
    /// step. An offset at or past `items.len()` produces an empty page with
    /// `total` still reporting the full count.
    pub fn slice(items: Vec<T>, request: PageRequest, limits: &PageLimits) -> Self {
        let (offset, limit) = request.normalize(limits);
        let total = items.len();

        let items = items
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        Self { items, total, offset, limit }
    }

    /// Returns an empty page for the given request, reporting zero matches.
    pub fn empty(request: PageRequest, limits: &PageLimits) -> Self {
        let (offset, limit) = request.normalize(limits);

        Self { items: Vec::new(), total: 0, offset, limit }
    }

    /// Whether more records exist past this page.
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}
