use std::cmp::Ordering;
use crate::core::domain::Identifiable;
use crate::core::library::{SortField, SortOrder};

pub mod model;
pub mod validator;

pub trait Book: Identifiable {
    fn title(&self) -> &str;
    fn year(&self) -> i64;
    fn category(&self) -> &str;
}

// matches_category checks for a case-insensitive literal substring of the category
pub fn matches_category<B: Book>(book: &B, pattern: &str) -> bool {
    book.category().to_lowercase().contains(pattern.to_lowercase().as_str())
}

// compare_books orders by a single whitelisted field, ties are left to the caller's stable sort
pub fn compare_books<B: Book>(a: &B, b: &B, field: SortField, order: SortOrder) -> Ordering {
    let ordering = match field {
        SortField::Title => a.title().cmp(b.title()),
        SortField::Year => a.year().cmp(&b.year()),
    };
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

// sort_books sorts in place with a stable sort
pub fn sort_books<B: Book>(books: &mut [B], field: SortField, order: SortOrder) {
    books.sort_by(|a, b| compare_books(a, b, field, order));
}
