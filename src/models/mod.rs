//! Data models
//!
//! This module contains the data shapes used throughout the Newsdesk gateway:
//! - Backend documents (AdminUser, NewsArticle, NewsCategory)
//! - Pagination request/response types

mod article;
mod pagination;
mod user;

pub use article::{ArticleCategory, ArticleStatus, NewsArticle, NewsCategory};
pub use pagination::{PaginateOptions, PaginationResult, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, MAX_PAGE};
pub use user::{AdminRole, AdminUser};
