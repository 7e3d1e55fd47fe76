//! Newsdesk - gateway for a news publishing site
//!
//! This library provides the gateway that sits between the news site's
//! browsers and its CMS backend, plus the admin client used by the back
//! office tooling.

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod services;
pub mod session;
