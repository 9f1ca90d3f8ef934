//! Admin list pipeline for the HackerThink AI-news site.
//!
//! The four admin collections (interviews, news, products, tutorials) share
//! one pipeline: load, filter, sort, paginate, select and act. The
//! `hackerthink-admin` binary drives it against the site's REST API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub mod util {
    pub mod timezone;
}
