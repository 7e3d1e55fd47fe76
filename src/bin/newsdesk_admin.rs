//! Back-office command line client for the Newsdesk gateway.
//!
//! Usage:
//!
//! ```text
//! newsdesk-admin login <email> <password>
//! newsdesk-admin logout
//! newsdesk-admin whoami
//! newsdesk-admin articles [page] [limit]
//! ```
//!
//! `NEWSDESK_GATEWAY_URL` selects the gateway (default `http://localhost:3000`),
//! `NEWSDESK_AUTH_FILE` the credential file (default `.newsdesk/auth.json`).

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdesk::client::AdminClient;
use newsdesk::models::{DEFAULT_LIMIT, DEFAULT_PAGE};
use newsdesk::session::AuthStore;

const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000";
const DEFAULT_AUTH_FILE: &str = ".newsdesk/auth.json";

const USAGE: &str = "usage: newsdesk-admin <login <email> <password> | logout | whoami | articles [page] [limit]>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "newsdesk=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let gateway = std::env::var("NEWSDESK_GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
    let auth_file = std::env::var("NEWSDESK_AUTH_FILE").unwrap_or_else(|_| DEFAULT_AUTH_FILE.to_string());
    let client = AdminClient::new(&gateway, AuthStore::file(auth_file))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["login", email, password] => {
            let admin = client.login(email, password).await.context("Login failed")?;
            println!("Signed in as {} <{}> ({})", admin.display_name(), admin.email, admin.role);
        }
        ["logout"] => {
            client.logout()?;
            println!("Signed out");
        }
        ["whoami"] => {
            if !client.auth().is_authenticated()? {
                bail!("Not signed in");
            }
            let admin = match client.refresh_profile().await {
                Ok(admin) => admin,
                Err(e) => {
                    tracing::warn!("Could not refresh profile: {}", e);
                    client.current_admin()?.context("Not signed in")?
                }
            };
            println!("{} <{}> ({})", admin.display_name(), admin.email, admin.role);
        }
        ["articles", rest @ ..] if rest.len() <= 2 => {
            let page = parse_arg(rest.first(), DEFAULT_PAGE, "page")?;
            let limit = parse_arg(rest.get(1), DEFAULT_LIMIT, "limit")?;
            let result = client.list_articles(page, limit).await?;
            if result.is_empty() {
                println!("No articles on page {}", result.page);
                return Ok(());
            }
            for article in &result.docs {
                println!("{}\t{}\t{:?}", article.id, article.title, article.status);
            }
            println!(
                "page {}/{} ({} articles)",
                result.page, result.total_pages, result.total_docs
            );
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn parse_arg(value: Option<&&str>, default: u64, name: &str) -> Result<u64> {
    match value {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} must be a positive number, got '{}'", name, value)),
        None => Ok(default),
    }
}
