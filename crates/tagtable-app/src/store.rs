// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{PageSize, SortDirection, StoreCommand, StoreEvent, TableState, Tag};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Listener = Box<dyn FnMut(&TableState, &StoreEvent)>;

/// Owns the table state. Listeners run synchronously, in registration
/// order, after the field is written and before the mutating call returns.
pub struct TableStore {
    state: TableState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl TableStore {
    pub fn new(state: TableState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TableState, &StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch(&mut self, command: StoreCommand) -> StoreEvent {
        let event = self.state.apply(command);
        if let StoreEvent::DatasetReplaced { rows } = event {
            tracing::debug!(rows, "dataset replaced");
        }
        for (_, listener) in &mut self.listeners {
            listener(&self.state, &event);
        }
        event
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) -> StoreEvent {
        self.dispatch(StoreCommand::SetSortDirection(direction))
    }

    pub fn set_sort_key(&mut self, key: impl Into<String>) -> StoreEvent {
        self.dispatch(StoreCommand::SetSortKey(key.into()))
    }

    pub fn set_selection<I, S>(&mut self, ids: I) -> StoreEvent
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selected = ids.into_iter().map(Into::into).collect::<BTreeSet<String>>();
        self.dispatch(StoreCommand::SetSelection(selected))
    }

    pub fn set_page(&mut self, page: usize) -> StoreEvent {
        self.dispatch(StoreCommand::SetPage(page))
    }

    /// Sizes outside {5, 10, 25} are clamped to the nearest allowed size.
    pub fn set_page_size(&mut self, rows: usize) -> StoreEvent {
        let size = PageSize::nearest(rows);
        if size.rows() != rows {
            tracing::debug!(requested = rows, applied = size.rows(), "page size clamped");
        }
        self.dispatch(StoreCommand::SetPageSize(size))
    }

    pub fn set_dataset(&mut self, rows: Vec<Tag>) -> StoreEvent {
        self.dispatch(StoreCommand::SetDataset(rows))
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new(TableState::default())
    }
}

impl fmt::Debug for TableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
