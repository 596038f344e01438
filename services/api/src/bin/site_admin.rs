//! site-admin: command-line client for the site's admin dashboard.
//!
//! Keeps the admin session in `$CONFIG_DIR/site-admin/session.json` so a login
//! lasts across invocations until it expires (24 hours by default).
//!
//! # Subcommands
//! - `login --username <name> --password <pw>`: sign in
//! - `logout`: end the session here and on the server
//! - `status`: show who is signed in
//! - `overview`: dashboard counters
//! - `list <collection> [--page N] [--per-page N]`: browse admin collections
//! - `contact-status <id> <status>`: move a contact submission along

use anyhow::{bail, Context};
use api_lib::adapters::FileStorage;
use api_lib::web::auth::{AuthResponse, LoginRequest, SESSION_COOKIE};
use api_lib::web::listing::Page;
use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use reqwest::{header, StatusCode};
use site_core::domain::{AdminUser, ContactStatus, OverviewStats};
use site_core::ports::{CredentialVerifier, PortError, PortResult, SessionStorage};
use site_core::session::{default_ttl, AuthState, SessionStore};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";
const TOKEN_KEY: &str = "site-token";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "site-admin", version, about = "Admin client for the site API")]
struct Cli {
    /// API server URL
    #[arg(long, env = "SITE_API_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Where the session is kept between runs
    #[arg(long, env = "SITE_ADMIN_SESSION")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in as an admin
    Login {
        #[arg(long, env = "SITE_ADMIN_USERNAME")]
        username: String,

        #[arg(long, env = "SITE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the signed-in admin
    Status,

    /// Show dashboard counters
    Overview,

    /// List an admin collection
    List {
        collection: Collection,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },

    /// Change the status of a contact submission
    ContactStatus { id: i64, status: StatusArg },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Collection {
    Contacts,
    Feedback,
    Blog,
    CaseStudies,
    Events,
}

impl Collection {
    fn path(self) -> &'static str {
        match self {
            Collection::Contacts => "/admin/contacts",
            Collection::Feedback => "/admin/feedback",
            Collection::Blog => "/admin/blog",
            Collection::CaseStudies => "/admin/case-studies",
            Collection::Events => "/admin/events",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    New,
    Contacted,
    Closed,
}

impl From<StatusArg> for ContactStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::New => ContactStatus::New,
            StatusArg::Contacted => ContactStatus::Contacted,
            StatusArg::Closed => ContactStatus::Closed,
        }
    }
}

// ============================================================================
// Remote Credential Check
// ============================================================================

/// Checks credentials against `POST /auth/login` and remembers the issued token.
struct ApiVerifier {
    client: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl ApiVerifier {
    fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    fn take_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|mut t| t.take())
    }
}

fn token_from_set_cookie(value: &str) -> Option<String> {
    value
        .split(';')
        .next()?
        .trim()
        .strip_prefix(SESSION_COOKIE)?
        .strip_prefix('=')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl CredentialVerifier for ApiVerifier {
    async fn verify(&self, username: &str, password: &str) -> PortResult<Option<AdminUser>> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "login returned {}",
                response.status()
            )));
        }

        let token = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(token_from_set_cookie)
            .ok_or_else(|| PortError::Unexpected("login response carried no session".into()))?;
        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token);
        }
        Ok(Some(AdminUser {
            username: body.username,
        }))
    }
}

// ============================================================================
// Authenticated Requests
// ============================================================================

struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl Client {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn cookie(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.token)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .header(header::COOKIE, self.cookie())
            .query(query)
            .send()
            .await
            .with_context(|| format!("request to {} failed", path))?;
        Ok(checked(response).await?.json().await?)
    }
}

async fn checked(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        bail!("session is no longer valid on the server; run `site-admin login`");
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("server returned {}: {}", status, text);
    }
    Ok(response)
}

/// Drops the stored server token, logging rather than failing if the file
/// cannot be rewritten.
fn forget_token(store: &mut SessionStore<FileStorage>) {
    if let Err(e) = store.storage_mut().remove(TOKEN_KEY) {
        warn!("Failed to remove {} from session storage: {:?}", TOKEN_KEY, e);
    }
}

/// Restores the stored session, or explains how to get one.
fn signed_in(store: &mut SessionStore<FileStorage>) -> anyhow::Result<(AdminUser, String)> {
    store.init(Utc::now());
    let user = match store.state() {
        AuthState::Authenticated(user) => user.clone(),
        _ => {
            forget_token(store);
            bail!("not signed in; run `site-admin login`");
        }
    };
    let token = store
        .storage()
        .get(TOKEN_KEY)
        .context("stored session has no server token; run `site-admin login`")?;
    Ok((user, token))
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let http = reqwest::Client::new();
    let path = cli.session_file.unwrap_or_else(FileStorage::default_path);
    let mut store = SessionStore::new(FileStorage::open(path), default_ttl());

    match cli.command {
        Commands::Login { username, password } => {
            let verifier = ApiVerifier::new(http, &cli.server);
            if !store.login(&username, &password, &verifier, Utc::now()).await {
                bail!("login failed for {}", username);
            }
            let token = verifier
                .take_token()
                .context("server did not issue a session token")?;
            store
                .storage_mut()
                .set(TOKEN_KEY, &token)
                .map_err(|e| anyhow::anyhow!("could not save session: {}", e))?;
            println!(
                "Signed in as {} (session file: {})",
                username,
                store.storage().path().display()
            );
        }

        Commands::Logout => {
            if let Ok((_, token)) = signed_in(&mut store) {
                let response = http
                    .post(format!("{}/auth/logout", cli.server.trim_end_matches('/')))
                    .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                    .send()
                    .await;
                if let Err(e) = response {
                    warn!("Could not reach the server to end the session: {}", e);
                }
            }
            store.logout();
            forget_token(&mut store);
            println!("Signed out.");
        }

        Commands::Status => match signed_in(&mut store) {
            Ok((user, _)) => println!("Signed in as {}", user.username),
            Err(_) => println!("Not signed in."),
        },

        Commands::Overview => {
            let (_, token) = signed_in(&mut store)?;
            let client = Client {
                http,
                base_url: cli.server,
                token,
            };
            let stats: OverviewStats = client.get("/admin/overview", &[]).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }

        Commands::List {
            collection,
            page,
            per_page,
        } => {
            let (_, token) = signed_in(&mut store)?;
            let client = Client {
                http,
                base_url: cli.server,
                token,
            };
            let listing: Page<serde_json::Value> = client
                .get(
                    collection.path(),
                    &[("page", page.to_string()), ("per_page", per_page.to_string())],
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&listing.items)?);
            println!(
                "page {}/{} ({} items)",
                listing.current_page, listing.total_pages, listing.total_items
            );
        }

        Commands::ContactStatus { id, status } => {
            let (_, token) = signed_in(&mut store)?;
            let client = Client {
                http,
                base_url: cli.server,
                token,
            };
            let status: ContactStatus = status.into();
            let response = client
                .http
                .put(client.url(&format!("/admin/contacts/{}/status", id)))
                .header(header::COOKIE, client.cookie())
                .json(&serde_json::json!({ "status": status }))
                .send()
                .await?;
            checked(response).await?;
            println!("Contact {} is now {}", id, status.as_str());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_token_from_set_cookie() {
        assert_eq!(
            token_from_set_cookie("session=abc123; HttpOnly; Path=/").as_deref(),
            Some("abc123")
        );
        assert_eq!(token_from_set_cookie("session=; Max-Age=0"), None);
        assert_eq!(token_from_set_cookie("other=abc"), None);
    }

    #[test]
    fn expired_session_also_forgets_the_server_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut storage = FileStorage::open(&path);
        storage.set(TOKEN_KEY, "abc123").unwrap();

        let mut store = SessionStore::new(storage, default_ttl());
        assert!(signed_in(&mut store).is_err());
        assert_eq!(store.storage().get(TOKEN_KEY), None);
        assert_eq!(FileStorage::open(&path).get(TOKEN_KEY), None);
    }
}
