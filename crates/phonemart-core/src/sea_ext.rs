use sea_orm::{EntityTrait, QuerySelect, Select};

use phonemart_domain::pagination::PageRequest;

/// Apply `LIMIT`/`OFFSET` from a [`PageRequest`].
pub trait PageExt {
    fn page(self, page: PageRequest) -> Self;
}

impl<E> PageExt for Select<E>
where
    E: EntityTrait,
{
    fn page(self, page: PageRequest) -> Self {
        self.offset(page.offset()).limit(page.limit())
    }
}

/// Build a `LIKE`/`ILIKE` pattern matching `needle` anywhere, with `%`, `_` and `\`
/// in the input escaped.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
