//! Sitemap and robots.txt generation

use chrono::{DateTime, Utc};

use crate::models::{NewsArticle, NewsCategory};
use crate::services::backend::{extract_documents, BackendClient};

/// Static pages listed in every sitemap
pub const STATIC_PATHS: &[&str] = &["/", "/about", "/contact"];

/// Upper bound on articles fetched for the sitemap
const SITEMAP_ARTICLE_LIMIT: u32 = 1000;

/// One `<url>` entry
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Builds sitemap entries for the public site
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    site_url: String,
}

impl SitemapBuilder {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path == "/" {
            format!("{}/", self.site_url)
        } else {
            format!("{}{}", self.site_url, path)
        }
    }

    /// Entries for static pages, categories and articles, in that order
    pub fn entries(&self, categories: &[NewsCategory], articles: &[NewsArticle]) -> Vec<SitemapEntry> {
        let mut entries: Vec<SitemapEntry> = STATIC_PATHS
            .iter()
            .map(|path| SitemapEntry {
                loc: self.url(path),
                last_modified: None,
                change_frequency: if *path == "/" { "hourly" } else { "monthly" },
                priority: if *path == "/" { 1.0 } else { 0.5 },
            })
            .collect();

        entries.extend(categories.iter().map(|category| SitemapEntry {
            loc: self.url(&format!("/category/{}", urlencoding::encode(&category.slug))),
            last_modified: category.updated_at,
            change_frequency: "daily",
            priority: 0.7,
        }));

        entries.extend(articles.iter().map(|article| SitemapEntry {
            loc: self.url(&format!("/news/{}", urlencoding::encode(&article.slug))),
            last_modified: article.last_modified(),
            change_frequency: "weekly",
            priority: 0.8,
        }));

        entries
    }

    /// Render entries as a sitemap.org XML document
    pub fn render(&self, entries: &[SitemapEntry]) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for entry in entries {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(modified) = entry.last_modified {
                xml.push_str(&format!(
                    "    <lastmod>{}</lastmod>\n",
                    modified.format("%Y-%m-%dT%H:%M:%SZ")
                ));
            }
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_frequency));
            xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }
        xml.push_str("</urlset>\n");
        xml
    }

    /// robots.txt pointing crawlers at the sitemap
    pub fn robots(&self) -> String {
        format!(
            "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api\n\nSitemap: {}\n",
            self.url("/sitemap.xml")
        )
    }

    /// Fetch categories and articles from the backend and render the sitemap.
    ///
    /// A failed fetch leaves that section out; the static pages are always listed.
    pub async fn generate(&self, backend: &BackendClient) -> String {
        let articles_query = format!("limit={}&status=published", SITEMAP_ARTICLE_LIMIT);
        let (categories, articles) = tokio::join!(
            backend.get_json("/categories", None),
            backend.get_json("/articles", Some(&articles_query)),
        );

        let categories: Vec<NewsCategory> = match categories {
            Ok(body) => decode_all(&body, "categories"),
            Err(e) => {
                tracing::warn!("Sitemap: failed to load categories: {}", e);
                Vec::new()
            }
        };
        let articles: Vec<NewsArticle> = match articles {
            Ok(body) => decode_all(&body, "articles"),
            Err(e) => {
                tracing::warn!("Sitemap: failed to load articles: {}", e);
                Vec::new()
            }
        };

        self.render(&self.entries(&categories, &articles))
    }
}

/// Decode every document that matches `T`, skipping malformed ones
fn decode_all<T: serde::de::DeserializeOwned>(body: &serde_json::Value, collection: &str) -> Vec<T> {
    extract_documents(body, collection)
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!("Sitemap: skipping malformed {} document: {}", collection, e);
                None
            }
        })
        .collect()
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
