// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod engine;
pub mod model;
pub mod state;
pub mod store;
pub mod view;

pub use model::*;
pub use state::*;
pub use store::*;
pub use view::*;
