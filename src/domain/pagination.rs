//! Offset/row pagination for explorer tables, mirrored in `offset` and
//! `rows` query parameters.

use crate::domain::chart_view::QueryState;

pub const MAX_ROWS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    offset: u64,
    rows: u64,
    total: u64,
}

impl Pagination {
    pub const OFFSET: &'static str = "offset";
    pub const ROWS: &'static str = "rows";

    pub fn new(rows: u64, total: u64) -> Self {
        Self { offset: 0, rows: rows.clamp(1, MAX_ROWS), total }
    }

    pub fn from_query(query: &QueryState, default_rows: u64, total: u64) -> Self {
        let rows = query
            .get(Self::ROWS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|rows| *rows > 0)
            .unwrap_or(default_rows);
        let offset = query.get(Self::OFFSET).and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(0);
        Self::new(rows, total).with_offset(offset)
    }

    /// Write `offset`/`rows`, dropping each when at its default.
    pub fn write_query(&self, query: &mut QueryState, default_rows: u64) {
        if self.offset == 0 {
            query.remove(Self::OFFSET);
        } else {
            query.set(Self::OFFSET, self.offset.to_string());
        }
        if self.rows == default_rows {
            query.remove(Self::ROWS);
        } else {
            query.set(Self::ROWS, self.rows.to_string());
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset.min(self.last_offset());
        self
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.rows).max(1)
    }

    /// Zero-based page holding the first visible row.
    pub fn page_index(&self) -> u64 {
        self.offset / self.rows
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.rows < self.total
    }

    pub fn first(&mut self) {
        self.offset = 0;
    }

    pub fn prev(&mut self) {
        self.offset = self.offset.saturating_sub(self.rows);
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.offset += self.rows;
        }
    }

    pub fn last(&mut self) {
        self.offset = self.last_offset();
    }

    pub fn go_to(&mut self, page: u64) {
        self.offset = page.saturating_mul(self.rows).min(self.last_offset());
    }

    /// Change page size, keeping the first visible row on screen.
    pub fn set_rows(&mut self, rows: u64) {
        self.rows = rows.clamp(1, MAX_ROWS);
        self.offset = (self.offset / self.rows) * self.rows;
        self.offset = self.offset.min(self.last_offset());
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        self.offset = self.offset.min(self.last_offset());
    }

    /// `"21 – 40 of 135"`, or `"0 of 0"` for an empty table.
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "0 of 0".to_string();
        }
        let from = self.offset + 1;
        let to = (self.offset + self.rows).min(self.total);
        format!("{from} – {to} of {}", self.total)
    }

    fn last_offset(&self) -> u64 {
        (self.page_count() - 1) * self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_pages() {
        let mut page = Pagination::new(20, 135);
        assert_eq!(page.page_count(), 7);
        assert!(!page.has_prev());
        page.next();
        assert_eq!(page.offset(), 20);
        assert_eq!(page.range_label(), "21 – 40 of 135");
        page.last();
        assert_eq!(page.offset(), 120);
        assert_eq!(page.range_label(), "121 – 135 of 135");
        assert!(!page.has_next());
        page.next();
        assert_eq!(page.offset(), 120);
        page.prev();
        page.first();
        assert_eq!(page.page_index(), 0);
    }

    #[test]
    fn resizing_keeps_first_row_visible() {
        let mut page = Pagination::new(20, 135).with_offset(60);
        page.set_rows(50);
        assert_eq!(page.offset(), 50);
        assert_eq!(page.page_index(), 1);
        page.set_total(30);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn empty_table() {
        let mut page = Pagination::new(20, 0);
        assert_eq!(page.page_count(), 1);
        page.go_to(5);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.range_label(), "0 of 0");
    }

    #[test]
    fn query_round_trip() {
        let query = QueryState::from_pairs([("offset", "9999"), ("rows", "50"), ("chart", "amount")]);
        let page = Pagination::from_query(&query, 20, 135);
        assert_eq!((page.offset(), page.rows()), (100, 50));

        let mut out = query.clone();
        Pagination::new(20, 135).write_query(&mut out, 20);
        assert_eq!(out.to_display_string(), "chart=amount");
        page.write_query(&mut out, 20);
        assert_eq!(Pagination::from_query(&out, 20, 135), page);
    }
}
