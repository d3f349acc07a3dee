// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde_json::json;
use tagtable_app::Tag;

const POPULAR_TAGS: [(&str, i64); 30] = [
    ("javascript", 2_529_140),
    ("python", 2_200_421),
    ("java", 1_917_358),
    ("c#", 1_615_211),
    ("php", 1_464_683),
    ("android", 1_417_163),
    ("html", 1_187_468),
    ("jquery", 1_034_793),
    ("c++", 806_624),
    ("css", 804_036),
    ("ios", 687_788),
    ("sql", 667_514),
    ("mysql", 662_088),
    ("r", 505_901),
    ("reactjs", 477_391),
    ("node.js", 471_047),
    ("arrays", 417_214),
    ("c", 403_835),
    ("asp.net", 371_229),
    ("json", 360_417),
    ("python-3.x", 347_766),
    (".net", 341_209),
    ("ruby-on-rails", 340_109),
    ("sql-server", 334_634),
    ("swift", 333_311),
    ("django", 309_002),
    ("angular", 307_064),
    ("objective-c", 292_406),
    ("excel", 291_983),
    ("pandas", 290_143),
];

const TAG_STEMS: [&str; 24] = [
    "async", "cache", "codec", "compiler", "cursor", "daemon", "driver", "encoder", "index",
    "kernel", "lexer", "linker", "mutex", "parser", "pipeline", "queue", "router", "runtime",
    "scheduler", "socket", "stream", "thread", "tokenizer", "vector",
];

const TAG_QUALIFIERS: [&str; 10] = [
    "api", "cli", "config", "io", "pool", "protocol", "server", "state", "test", "web",
];

/// A snapshot of the most popular Stack Overflow tags, most popular first.
pub fn popular_tags() -> Vec<Tag> {
    POPULAR_TAGS
        .iter()
        .map(|(name, count)| {
            Tag::new(*name, *count)
                .with_extra("has_synonyms", true)
                .with_extra("is_moderator_only", false)
                .with_extra("is_required", false)
        })
        .collect()
}

pub fn tags(rows: &[(&str, i64)]) -> Vec<Tag> {
    rows.iter()
        .map(|(name, count)| Tag::new(*name, *count))
        .collect()
}

/// Renders rows as the `/tags` response envelope.
pub fn items_body(rows: &[Tag]) -> Result<String> {
    let body = json!({
        "items": rows,
        "has_more": false,
        "quota_max": 300,
        "quota_remaining": 299,
    });
    serde_json::to_string(&body).context("encode tag items")
}

/// Seeded generator for tag datasets. Counts are drawn from a small range
/// so larger sets always contain ties.
pub struct TagFaker {
    state: u64,
}

impl TagFaker {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    // splitmix64
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        match n {
            0 | 1 => 0,
            _ => (self.next_u64() % n as u64) as usize,
        }
    }

    pub fn tag(&mut self, index: usize) -> Tag {
        let stem = TAG_STEMS[self.int_n(TAG_STEMS.len())];
        let qualifier = TAG_QUALIFIERS[self.int_n(TAG_QUALIFIERS.len())];
        let count = 1_000 * (1 + self.int_n(20) as i64);
        Tag::new(format!("{stem}-{qualifier}-{index}"), count)
            .with_extra("has_synonyms", self.int_n(2) == 1)
            .with_extra("is_moderator_only", false)
            .with_extra("is_required", false)
    }

    /// `count` rows with unique names.
    pub fn dataset(&mut self, count: usize) -> Vec<Tag> {
        (0..count).map(|index| self.tag(index)).collect()
    }
}
