pub mod domain;
pub mod error;
pub mod query;
pub mod seed;
pub mod validation;
