//! Fixed-size pages over ordered listings.
use serde::{Deserialize, Serialize};

/// How many posts any listing page carries.
pub const POSTS_PER_PAGE: i64 = 10;

/// A client's request for one page of a listing, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
}

impl PageRequest {
    pub fn new(number: u32) -> Self {
        Self {
            number: number.max(1),
        }
    }

    /// The page that will actually be served: requests past the end come
    /// back clamped to the last page rather than an empty one.
    pub fn resolve(self, total: i64) -> u32 {
        self.number.min(page_count(total))
    }
}

/// Total pages for a listing of `total` items; an empty listing still has
/// one (empty) page.
pub fn page_count(total: i64) -> u32 {
    let pages = (total + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE;
    pages.max(1) as u32
}

/// Row offset of the given (already resolved) page number.
pub fn offset(number: u32) -> i64 {
    i64::from(number - 1) * POSTS_PER_PAGE
}

/// One served page plus the metadata listings render alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub pages: u32,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, number: u32, total: i64) -> Self {
        Self {
            items,
            number,
            pages: page_count(total),
            total,
        }
    }

    /// Serve a page out of a fully materialized listing.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as i64;
        let number = request.resolve(total);
        let items = all
            .into_iter()
            .skip(offset(number) as usize)
            .take(POSTS_PER_PAGE as usize)
            .collect();
        Self::new(items, number, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            pages: self.pages,
            total: self.total,
        }
    }
}
