//! HTTP handlers.
//!
//! `tags` and `categories` are the admin JSON API (session required), thin
//! wrappers over the shared label rules in `taxonomy`. `blog` serves the
//! public listing pages.

pub mod blog;
pub mod categories;
pub mod tags;
mod taxonomy;
