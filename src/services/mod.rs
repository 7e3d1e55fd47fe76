//! Services layer
//!
//! This module contains the logic the HTTP handlers delegate to:
//! - Forwarding requests to the upstream backend
//! - Paginating document queries
//! - Generating sitemap and robots.txt

pub mod backend;
pub mod pagination;
pub mod sitemap;

pub use backend::{error_message, extract_documents, BackendClient, BackendError, BackendResponse, ForwardRequest};
pub use pagination::{paginate, DocumentQuery, FindOptions, MemoryQuery, QueryError};
pub use sitemap::{SitemapBuilder, SitemapEntry};
