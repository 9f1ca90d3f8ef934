pub mod categories;
pub mod content;
pub mod tools;
