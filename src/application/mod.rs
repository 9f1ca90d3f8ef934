//! Application services: the list pipeline, loaders and tool generators.

pub mod analytics;
pub mod error;
pub mod listing;
pub mod loader;
pub mod repos;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;
