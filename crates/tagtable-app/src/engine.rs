// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{SortDirection, TableState, Tag};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Ascending comparison of two rows on `key`. Rows missing the key sort
/// after rows that have it; two rows missing it are equal.
pub fn compare_by_key(left: &Tag, right: &Tag, key: &str) -> Ordering {
    match (left.field(key), right.field(key)) {
        (Some(left), Some(right)) => left.cmp_value(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders rows by `key`. Ties fall back to the original position, so the
/// result is stable in both directions.
pub fn sort_rows<'a>(rows: &'a [Tag], key: &str, direction: SortDirection) -> Vec<&'a Tag> {
    let mut indexed = rows.iter().enumerate().collect::<Vec<(usize, &Tag)>>();
    indexed.sort_unstable_by(|(left_index, left), (right_index, right)| {
        direction
            .apply(compare_by_key(left, right, key))
            .then_with(|| left_index.cmp(right_index))
    });
    indexed.into_iter().map(|(_, row)| row).collect()
}

pub fn page_window<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_mul(page_size).min(rows.len());
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// Blank filler rows that keep a short last page at full height.
pub fn padding_rows(total: usize, page: usize, page_size: usize) -> usize {
    let remaining = total.saturating_sub(page.saturating_mul(page_size));
    page_size - remaining.min(page_size)
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

pub fn last_page(total: usize, page_size: usize) -> usize {
    page_count(total, page_size).saturating_sub(1)
}

pub fn toggle_selection(selected: &BTreeSet<String>, id: &str) -> BTreeSet<String> {
    let mut next = selected.clone();
    if !next.remove(id) {
        next.insert(id.to_owned());
    }
    next
}

pub fn select_all(rows: &[Tag]) -> BTreeSet<String> {
    rows.iter().map(|row| row.name.clone()).collect()
}

/// Ascending on `clicked` flips to descending; anything else lands on
/// ascending.
pub fn header_click(
    direction: SortDirection,
    key: &str,
    clicked: &str,
) -> (SortDirection, String) {
    let next = if key == clicked && direction == SortDirection::Asc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    (next, clicked.to_owned())
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisiblePage<'a> {
    pub rows: Vec<&'a Tag>,
    pub padding: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
}

impl VisiblePage<'_> {
    /// 1-based inclusive row range for the footer, `(0, 0)` when empty.
    pub fn range(&self) -> (usize, usize) {
        if self.rows.is_empty() {
            return (0, 0);
        }
        let first = self.page * self.page_size + 1;
        (first, first + self.rows.len() - 1)
    }
}

/// Sort-then-paginate over the current state. `None` while the dataset is
/// still pending.
pub fn visible_page(state: &TableState) -> Option<VisiblePage<'_>> {
    if !state.dataset.is_loaded() {
        return None;
    }

    let rows = state.dataset.rows();
    let page_size = state.page_size.rows();
    let sorted = sort_rows(rows, &state.sort_key, state.sort_direction);
    let window = page_window(&sorted, state.page, page_size).to_vec();

    Some(VisiblePage {
        rows: window,
        padding: padding_rows(rows.len(), state.page, page_size),
        total: rows.len(),
        page: state.page,
        page_count: page_count(rows.len(), page_size),
        page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        header_click, last_page, padding_rows, page_count, page_window, select_all, sort_rows,
        toggle_selection, visible_page,
    };
    use crate::{Dataset, PageSize, SortDirection, TableState, Tag};
    use std::collections::BTreeSet;

    fn names(rows: &[&Tag]) -> Vec<String> {
        rows.iter().map(|row| row.name.clone()).collect()
    }

    fn tied_rows() -> Vec<Tag> {
        vec![
            Tag::new("d", 3),
            Tag::new("a", 5),
            Tag::new("e", 3),
            Tag::new("b", 5),
            Tag::new("c", 1),
            Tag::new("f", 3),
        ]
    }

    #[test]
    fn ascending_sort_keeps_ties_in_original_order() {
        let rows = tied_rows();
        let sorted = sort_rows(&rows, "count", SortDirection::Asc);
        assert_eq!(names(&sorted), vec!["c", "d", "e", "f", "a", "b"]);
    }

    #[test]
    fn descending_sort_keeps_ties_in_original_order() {
        let rows = tied_rows();
        let sorted = sort_rows(&rows, "count", SortDirection::Desc);
        assert_eq!(names(&sorted), vec!["a", "b", "d", "e", "f", "c"]);
    }

    #[test]
    fn descending_is_reverse_of_ascending_without_ties() {
        let rows = vec![
            Tag::new("go", 70),
            Tag::new("rust", 40),
            Tag::new("c", 90),
            Tag::new("zig", 10),
        ];
        for key in ["count", "name"] {
            let mut ascending = names(&sort_rows(&rows, key, SortDirection::Asc));
            let descending = names(&sort_rows(&rows, key, SortDirection::Desc));
            ascending.reverse();
            assert_eq!(ascending, descending, "key {key}");
        }
    }

    #[test]
    fn name_sort_is_lexicographic() {
        let rows = vec![Tag::new("b", 1), Tag::new("C", 2), Tag::new("a", 3)];
        let sorted = sort_rows(&rows, "name", SortDirection::Asc);
        assert_eq!(names(&sorted), vec!["C", "a", "b"]);
    }

    #[test]
    fn unknown_key_keeps_original_order() {
        let rows = tied_rows();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = sort_rows(&rows, "no_such_field", direction);
            assert_eq!(names(&sorted), vec!["d", "a", "e", "b", "c", "f"]);
        }
    }

    #[test]
    fn partially_present_key_sorts_missing_rows_last() {
        let rows = vec![
            Tag::new("a", 1).with_extra("last_activity_date", 30),
            Tag::new("b", 1),
            Tag::new("c", 1).with_extra("last_activity_date", 10),
        ];
        let sorted = sort_rows(&rows, "last_activity_date", SortDirection::Asc);
        assert_eq!(names(&sorted), vec!["c", "a", "b"]);

        let sorted = sort_rows(&rows, "last_activity_date", SortDirection::Desc);
        assert_eq!(names(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn rows_missing_the_key_keep_input_order_among_themselves() {
        let rows = vec![
            Tag::new("x", 1),
            Tag::new("a", 1).with_extra("score", 2),
            Tag::new("y", 1),
            Tag::new("b", 1).with_extra("score", 1),
            Tag::new("z", 1),
        ];
        let sorted = sort_rows(&rows, "score", SortDirection::Asc);
        assert_eq!(names(&sorted), vec!["b", "a", "x", "y", "z"]);

        let sorted = sort_rows(&rows, "score", SortDirection::Desc);
        assert_eq!(names(&sorted), vec!["x", "y", "z", "a", "b"]);
    }

    #[test]
    fn pages_concatenate_back_to_the_sorted_sequence() {
        let rows = (0..23)
            .map(|index| Tag::new(format!("tag-{index:02}"), (index * 7 % 5) as i64))
            .collect::<Vec<_>>();
        let sorted = sort_rows(&rows, "count", SortDirection::Asc);

        for size in PageSize::ALL.map(PageSize::rows) {
            let mut rebuilt = Vec::new();
            for page in 0..page_count(sorted.len(), size) {
                rebuilt.extend_from_slice(page_window(&sorted, page, size));
            }
            assert_eq!(names(&rebuilt), names(&sorted), "page size {size}");
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let rows = tied_rows();
        assert!(page_window(&rows, 2, 5).is_empty());
        assert!(page_window(&rows, usize::MAX, 25).is_empty());
        assert_eq!(page_window(&rows, 1, 5).len(), 1);
    }

    #[test]
    fn padding_fills_short_and_out_of_range_pages() {
        assert_eq!(padding_rows(12, 0, 5), 0);
        assert_eq!(padding_rows(12, 2, 5), 3);
        assert_eq!(padding_rows(12, 3, 5), 5);
        assert_eq!(padding_rows(0, 0, 10), 10);
    }

    #[test]
    fn page_count_and_last_page() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(10, 5), 2);
        assert_eq!(page_count(11, 5), 3);
        assert_eq!(last_page(11, 5), 2);
        assert_eq!(last_page(0, 5), 0);
    }

    #[test]
    fn toggling_twice_restores_selection() {
        let original = BTreeSet::from(["go".to_owned(), "rust".to_owned()]);
        for id in ["rust", "zig"] {
            let once = toggle_selection(&original, id);
            assert_ne!(once, original);
            assert_eq!(toggle_selection(&once, id), original);
        }
    }

    #[test]
    fn select_all_covers_every_row_regardless_of_page() {
        let rows = tied_rows();
        let selected = select_all(&rows);
        assert_eq!(selected.len(), rows.len());
        assert!(rows.iter().all(|row| selected.contains(&row.name)));
    }

    #[test]
    fn header_click_cycles_asc_desc_and_resets_on_new_field() {
        let (direction, key) = header_click(SortDirection::Asc, "count", "count");
        assert_eq!((direction, key.as_str()), (SortDirection::Desc, "count"));

        let (direction, key) = header_click(direction, &key, "name");
        assert_eq!((direction, key.as_str()), (SortDirection::Asc, "name"));

        let (direction, key) = header_click(direction, &key, "name");
        assert_eq!((direction, key.as_str()), (SortDirection::Desc, "name"));

        let (direction, key) = header_click(direction, &key, "name");
        assert_eq!((direction, key.as_str()), (SortDirection::Asc, "name"));
    }

    #[test]
    fn visible_page_is_none_while_pending() {
        assert!(visible_page(&TableState::default()).is_none());
    }

    #[test]
    fn visible_page_sorts_then_slices() {
        let state = TableState {
            dataset: Dataset::Loaded(vec![
                Tag::new("a", 5),
                Tag::new("b", 5),
                Tag::new("c", 1),
            ]),
            ..TableState::default()
        };

        let page = visible_page(&state).expect("dataset is loaded");
        assert_eq!(names(&page.rows), vec!["c", "a", "b"]);
        assert_eq!(page.padding, 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.page_count, 1);
        assert_eq!(page.range(), (1, 3));
    }

    #[test]
    fn visible_page_range_tracks_current_page() {
        let state = TableState {
            dataset: Dataset::Loaded(tied_rows()),
            page: 1,
            ..TableState::default()
        };
        let page = visible_page(&state).expect("dataset is loaded");
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.range(), (6, 6));
        assert_eq!(page.padding, 4);

        let past_end = TableState { page: 7, ..state };
        let beyond = visible_page(&past_end).expect("dataset is loaded");
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.range(), (0, 0));
    }
}
