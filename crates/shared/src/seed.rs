//! Bundled demo catalog the events container starts from.

use serde::{Deserialize, Serialize};

use crate::domain::{Event, Registration};

const SEED_JSON: &str = include_str!("../data/seed.json");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub events: Vec<Event>,
    pub registrations: Vec<Registration>,
}

pub fn catalog() -> serde_json::Result<Catalog> {
    serde_json::from_str(SEED_JSON)
}
