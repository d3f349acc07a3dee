// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DEFAULT_SORT_KEY, Dataset, PageSize, SortDirection, Tag};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub sort_direction: SortDirection,
    pub sort_key: String,
    pub selected: BTreeSet<String>,
    pub page: usize,
    pub page_size: PageSize,
    pub dataset: Dataset,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            sort_direction: SortDirection::Asc,
            sort_key: DEFAULT_SORT_KEY.to_owned(),
            selected: BTreeSet::new(),
            page: 0,
            page_size: PageSize::Five,
            dataset: Dataset::Pending,
        }
    }
}

/// Each command replaces exactly one field of [`TableState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    SetSortDirection(SortDirection),
    SetSortKey(String),
    SetSelection(BTreeSet<String>),
    SetPage(usize),
    SetPageSize(PageSize),
    SetDataset(Vec<Tag>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SortDirectionChanged(SortDirection),
    SortKeyChanged(String),
    SelectionChanged { selected: usize },
    PageChanged(usize),
    PageSizeChanged(PageSize),
    DatasetReplaced { rows: usize },
}

impl TableState {
    pub fn apply(&mut self, command: StoreCommand) -> StoreEvent {
        match command {
            StoreCommand::SetSortDirection(direction) => {
                self.sort_direction = direction;
                StoreEvent::SortDirectionChanged(direction)
            }
            StoreCommand::SetSortKey(key) => {
                self.sort_key = key;
                StoreEvent::SortKeyChanged(self.sort_key.clone())
            }
            StoreCommand::SetSelection(selected) => {
                self.selected = selected;
                StoreEvent::SelectionChanged {
                    selected: self.selected.len(),
                }
            }
            StoreCommand::SetPage(page) => {
                self.page = page;
                StoreEvent::PageChanged(page)
            }
            StoreCommand::SetPageSize(size) => {
                self.page_size = size;
                StoreEvent::PageSizeChanged(size)
            }
            StoreCommand::SetDataset(rows) => {
                let count = rows.len();
                self.dataset = Dataset::Loaded(rows);
                StoreEvent::DatasetReplaced { rows: count }
            }
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }
}
