// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use tagtable_api::{Client, TagQuery};
use tagtable_app::Tag;
use tagtable_tui::TagSource;

/// Live rows from the Stack Exchange `/tags` endpoint.
pub struct ApiSource {
    client: Client,
    query: TagQuery,
}

impl ApiSource {
    pub fn new(client: Client, query: TagQuery) -> Result<Self> {
        query
            .validate()
            .context("invalid [api] settings; fix site/sort/page_size values")?;
        Ok(Self { client, query })
    }
}

impl TagSource for ApiSource {
    fn fetch_tags(&self) -> Result<Vec<Tag>> {
        self.client.fetch_tags(&self.query)
    }

    fn describe(&self) -> String {
        format!("{} site={}", self.client.base_url(), self.query.site)
    }
}

/// Offline fixture rows for `--demo`.
pub struct DemoSource {
    rows: Vec<Tag>,
}

impl DemoSource {
    pub fn new() -> Self {
        Self {
            rows: tagtable_testkit::popular_tags(),
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TagSource for DemoSource {
    fn fetch_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        "demo fixtures".to_owned()
    }
}
