// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::engine::{header_click, last_page, select_all, toggle_selection};
use crate::{PageSize, SortDirection, TableState, TableStore, Tag};
use std::collections::BTreeSet;

pub const TABLE_TITLE: &str = "Table of Tags";

/// User interactions the table view understands.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    HeaderClicked(String),
    RowClicked(String),
    SelectAllClicked,
    PageChanged(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    PageSizeChanged(usize),
    CyclePageSize,
    DatasetLoaded(Vec<Tag>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Sorted {
        key: String,
        direction: SortDirection,
    },
    RowSelected(String),
    RowDeselected(String),
    SelectedAll(usize),
    DeselectedAll,
    PageChanged(usize),
    PageUnchanged,
    PageSizeChanged(PageSize),
    Loaded {
        rows: usize,
        pruned: usize,
    },
}

impl ActionOutcome {
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Sorted { key, direction } => Some(format!("sort {key} {}", direction.as_str())),
            Self::RowSelected(name) => Some(format!("selected {name}")),
            Self::RowDeselected(name) => Some(format!("deselected {name}")),
            Self::SelectedAll(count) => Some(format!("selected all {count}")),
            Self::DeselectedAll => Some("selection cleared".to_owned()),
            Self::PageChanged(page) => Some(format!("page {}", page + 1)),
            Self::PageUnchanged => None,
            Self::PageSizeChanged(size) => Some(format!("rows per page {}", size.rows())),
            Self::Loaded { rows, pruned: 0 } => Some(format!("loaded {rows} tags")),
            Self::Loaded { rows, pruned } => Some(format!(
                "loaded {rows} tags; dropped {pruned} stale selections"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl CheckboxState {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Unchecked => "[ ]",
            Self::Indeterminate => "[-]",
            Self::Checked => "[x]",
        }
    }
}

/// Header checkbox: checked when every loaded row is selected,
/// indeterminate when some are.
pub fn select_all_checkbox(state: &TableState) -> CheckboxState {
    let rows = state.dataset.rows();
    let selected = rows.iter().filter(|row| state.is_selected(&row.name)).count();
    if !rows.is_empty() && selected == rows.len() {
        CheckboxState::Checked
    } else if selected > 0 {
        CheckboxState::Indeterminate
    } else {
        CheckboxState::Unchecked
    }
}

pub fn toolbar_label(state: &TableState) -> String {
    if state.selected.is_empty() {
        TABLE_TITLE.to_owned()
    } else {
        format!("{} selected", state.selected.len())
    }
}

pub fn apply_action(store: &mut TableStore, action: TableAction) -> ActionOutcome {
    match action {
        TableAction::HeaderClicked(clicked) => {
            let state = store.state();
            let (direction, key) = header_click(state.sort_direction, &state.sort_key, &clicked);
            store.set_sort_direction(direction);
            store.set_sort_key(key.clone());
            ActionOutcome::Sorted { key, direction }
        }
        TableAction::RowClicked(name) => {
            let next = toggle_selection(&store.state().selected, &name);
            let selected = next.contains(&name);
            store.set_selection(next);
            if selected {
                ActionOutcome::RowSelected(name)
            } else {
                ActionOutcome::RowDeselected(name)
            }
        }
        TableAction::SelectAllClicked => {
            if select_all_checkbox(store.state()) == CheckboxState::Checked {
                store.set_selection(BTreeSet::<String>::new());
                ActionOutcome::DeselectedAll
            } else {
                let all = select_all(store.state().dataset.rows());
                let count = all.len();
                store.set_selection(all);
                ActionOutcome::SelectedAll(count)
            }
        }
        TableAction::PageChanged(page) => move_to_page(store, page),
        TableAction::NextPage => {
            let target = store.state().page.saturating_add(1).min(current_last_page(store));
            move_to_page(store, target)
        }
        TableAction::PrevPage => {
            let target = store
                .state()
                .page
                .saturating_sub(1)
                .min(current_last_page(store));
            move_to_page(store, target)
        }
        TableAction::FirstPage => move_to_page(store, 0),
        TableAction::LastPage => {
            let target = current_last_page(store);
            move_to_page(store, target)
        }
        TableAction::PageSizeChanged(rows) => {
            store.set_page_size(rows);
            store.set_page(0);
            ActionOutcome::PageSizeChanged(store.state().page_size)
        }
        TableAction::CyclePageSize => {
            let next = store.state().page_size.next();
            store.set_page_size(next.rows());
            store.set_page(0);
            ActionOutcome::PageSizeChanged(next)
        }
        TableAction::DatasetLoaded(rows) => {
            let count = rows.len();
            store.set_dataset(rows);
            let state = store.state();
            let retained = state
                .selected
                .iter()
                .filter(|name| state.dataset.contains(name))
                .cloned()
                .collect::<BTreeSet<String>>();
            let pruned = state.selected.len() - retained.len();
            if pruned > 0 {
                store.set_selection(retained);
            }
            ActionOutcome::Loaded {
                rows: count,
                pruned,
            }
        }
    }
}

fn current_last_page(store: &TableStore) -> usize {
    let state = store.state();
    last_page(state.dataset.len(), state.page_size.rows())
}

fn move_to_page(store: &mut TableStore, page: usize) -> ActionOutcome {
    if store.state().page == page {
        return ActionOutcome::PageUnchanged;
    }
    store.set_page(page);
    ActionOutcome::PageChanged(page)
}

#[cfg(test)]
mod tests {
    use super::{
        ActionOutcome, CheckboxState, TableAction, apply_action, select_all_checkbox, toolbar_label,
    };
    use crate::engine::visible_page;
    use crate::{PageSize, SortDirection, TableState, TableStore, Tag};
    use std::collections::BTreeSet;

    fn loaded_store(count: usize) -> TableStore {
        let mut store = TableStore::default();
        let rows = (0..count)
            .map(|index| Tag::new(format!("tag-{index:02}"), index as i64))
            .collect();
        apply_action(&mut store, TableAction::DatasetLoaded(rows));
        store
    }

    #[test]
    fn header_clicks_follow_the_sort_cycle() {
        let mut store = TableStore::default();

        apply_action(&mut store, TableAction::HeaderClicked("count".to_owned()));
        assert_eq!(store.state().sort_key, "count");
        assert_eq!(store.state().sort_direction, SortDirection::Desc);

        let outcome = apply_action(&mut store, TableAction::HeaderClicked("name".to_owned()));
        assert_eq!(
            outcome,
            ActionOutcome::Sorted {
                key: "name".to_owned(),
                direction: SortDirection::Asc,
            }
        );
        assert_eq!(store.state().sort_key, "name");
        assert_eq!(store.state().sort_direction, SortDirection::Asc);

        apply_action(&mut store, TableAction::HeaderClicked("name".to_owned()));
        assert_eq!(store.state().sort_direction, SortDirection::Desc);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut store = loaded_store(100);
        store.set_page_size(10);
        store.set_page(3);

        let outcome = apply_action(&mut store, TableAction::PageSizeChanged(25));
        assert_eq!(outcome, ActionOutcome::PageSizeChanged(PageSize::TwentyFive));
        assert_eq!(store.state().page, 0);
        assert_eq!(store.state().page_size, PageSize::TwentyFive);
    }

    #[test]
    fn cycle_page_size_wraps_and_resets_page() {
        let mut store = loaded_store(30);
        store.set_page(2);

        apply_action(&mut store, TableAction::CyclePageSize);
        assert_eq!(store.state().page_size, PageSize::Ten);
        assert_eq!(store.state().page, 0);

        apply_action(&mut store, TableAction::CyclePageSize);
        apply_action(&mut store, TableAction::CyclePageSize);
        assert_eq!(store.state().page_size, PageSize::Five);
    }

    #[test]
    fn row_click_toggles_membership() {
        let mut store = loaded_store(3);

        let first = apply_action(&mut store, TableAction::RowClicked("tag-01".to_owned()));
        assert_eq!(first, ActionOutcome::RowSelected("tag-01".to_owned()));
        assert!(store.state().is_selected("tag-01"));

        let second = apply_action(&mut store, TableAction::RowClicked("tag-01".to_owned()));
        assert_eq!(second, ActionOutcome::RowDeselected("tag-01".to_owned()));
        assert!(store.state().selected.is_empty());
    }

    #[test]
    fn select_all_spans_every_page_then_clears() {
        let mut store = loaded_store(12);
        store.set_page(2);
        store.set_sort_direction(SortDirection::Desc);

        let outcome = apply_action(&mut store, TableAction::SelectAllClicked);
        assert_eq!(outcome, ActionOutcome::SelectedAll(12));
        let expected = store
            .state()
            .dataset
            .rows()
            .iter()
            .map(|row| row.name.clone())
            .collect::<BTreeSet<_>>();
        assert_eq!(store.state().selected, expected);
        assert_eq!(select_all_checkbox(store.state()), CheckboxState::Checked);

        let outcome = apply_action(&mut store, TableAction::SelectAllClicked);
        assert_eq!(outcome, ActionOutcome::DeselectedAll);
        assert!(store.state().selected.is_empty());
    }

    #[test]
    fn partial_selection_makes_select_all_select_everything() {
        let mut store = loaded_store(4);
        apply_action(&mut store, TableAction::RowClicked("tag-00".to_owned()));
        assert_eq!(
            select_all_checkbox(store.state()),
            CheckboxState::Indeterminate
        );

        apply_action(&mut store, TableAction::SelectAllClicked);
        assert_eq!(store.state().selected.len(), 4);
    }

    #[test]
    fn next_and_prev_page_stay_in_bounds() {
        let mut store = loaded_store(12);

        assert_eq!(
            apply_action(&mut store, TableAction::NextPage),
            ActionOutcome::PageChanged(1)
        );
        apply_action(&mut store, TableAction::NextPage);
        assert_eq!(
            apply_action(&mut store, TableAction::NextPage),
            ActionOutcome::PageUnchanged
        );
        assert_eq!(store.state().page, 2);

        apply_action(&mut store, TableAction::FirstPage);
        assert_eq!(
            apply_action(&mut store, TableAction::PrevPage),
            ActionOutcome::PageUnchanged
        );

        apply_action(&mut store, TableAction::LastPage);
        assert_eq!(store.state().page, 2);
    }

    #[test]
    fn direct_page_change_may_land_past_the_end() {
        let mut store = loaded_store(3);
        apply_action(&mut store, TableAction::PageChanged(9));
        let page = visible_page(store.state()).expect("dataset is loaded");
        assert!(page.rows.is_empty());

        apply_action(&mut store, TableAction::PrevPage);
        assert_eq!(store.state().page, 0);
    }

    #[test]
    fn reload_prunes_stale_selections() {
        let mut store = loaded_store(3);
        store.set_selection(["tag-00", "tag-02"]);

        let outcome = apply_action(
            &mut store,
            TableAction::DatasetLoaded(vec![Tag::new("tag-00", 1), Tag::new("tag-05", 2)]),
        );
        assert_eq!(outcome, ActionOutcome::Loaded { rows: 2, pruned: 1 });
        assert_eq!(
            store.state().selected,
            BTreeSet::from(["tag-00".to_owned()])
        );
    }

    #[test]
    fn toolbar_label_reports_selection_count() {
        let mut state = TableState::default();
        assert_eq!(toolbar_label(&state), "Table of Tags");

        state.selected = BTreeSet::from(["a".to_owned(), "b".to_owned()]);
        assert_eq!(toolbar_label(&state), "2 selected");
    }

    #[test]
    fn end_to_end_window_preserves_tie_order() {
        let mut store = TableStore::default();
        apply_action(
            &mut store,
            TableAction::DatasetLoaded(vec![
                Tag::new("a", 5),
                Tag::new("b", 5),
                Tag::new("c", 1),
            ]),
        );

        let page = visible_page(store.state()).expect("dataset is loaded");
        let window = page
            .rows
            .iter()
            .map(|row| (row.name.as_str(), row.count))
            .collect::<Vec<_>>();
        assert_eq!(window, vec![("c", 1), ("a", 5), ("b", 5)]);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            ActionOutcome::Sorted {
                key: "count".to_owned(),
                direction: SortDirection::Desc,
            }
            .message()
            .as_deref(),
            Some("sort count desc")
        );
        assert_eq!(ActionOutcome::PageChanged(0).message().as_deref(), Some("page 1"));
        assert_eq!(ActionOutcome::PageUnchanged.message(), None);
        assert_eq!(
            ActionOutcome::Loaded { rows: 100, pruned: 0 }.message().as_deref(),
            Some("loaded 100 tags")
        );
    }
}
