//! Directory reconciliation: fetch the external roster, then merge it.
//!
//! Connection settings come from the config file, overridden by non-blank
//! rows in the store's settings table. Missing settings are not an error:
//! the run reports `ok: false` without contacting anything.

pub mod client;
pub mod merge;

pub use client::DirectoryClient;
pub use merge::{extract, merge};

use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::DirectoryConfig;
use crate::error::Result;
use crate::store::settings::{DIRECTORY_API_TOKEN, DIRECTORY_BASE_URL, DIRECTORY_COMPANY_ID};
use crate::store::Store;
use crate::types::SyncOutcome;

/// Effective connection settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySettings {
    pub base_url: String,
    pub api_token: String,
    pub company_id: String,
}

impl DirectorySettings {
    pub fn resolve(store: &Store, config: &DirectoryConfig) -> Result<Self> {
        Ok(Self {
            base_url: store.setting_or(DIRECTORY_BASE_URL, &config.base_url)?,
            api_token: store.setting_or(DIRECTORY_API_TOKEN, &config.api_token)?,
            company_id: store.setting_or(DIRECTORY_COMPANY_ID, &config.company_id)?,
        })
    }

    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.api_token.is_empty()
    }
}

/// Run one full sync. Never fails: every failure path becomes an
/// `ok: false` outcome and local records stay as they were.
pub async fn sync_directory(store: &Store, config: &DirectoryConfig, clock: &dyn Clock) -> SyncOutcome {
    let settings = match DirectorySettings::resolve(store, config) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to read directory settings");
            return SyncOutcome::failed(format!("failed to read directory settings: {e}"));
        }
    };
    if !settings.is_complete() {
        return SyncOutcome::failed("directory config missing");
    }

    let client = match DirectoryClient::new(
        &settings.base_url,
        &settings.api_token,
        &settings.company_id,
        config.timeout(),
    ) {
        Ok(c) => c,
        Err(e) => return SyncOutcome::failed(format!("failed to build directory client: {e}")),
    };

    let records = match client.fetch_all().await {
        Ok(r) => r,
        Err(e) => {
            warn!(url = client.url(), error = %e, "directory sync failed");
            return SyncOutcome::failed(format!("directory unavailable, using local cache: {e}"));
        }
    };

    match merge(store, &records, clock.now()) {
        Ok(merged) => {
            info!(
                fetched = records.len(),
                created = merged.created,
                updated = merged.updated,
                "directory merged"
            );
            SyncOutcome::completed(merged)
        }
        Err(e) => {
            warn!(error = %e, "directory merge failed");
            SyncOutcome::failed(format!("directory merge failed: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::directory::client::RESOURCE_PATH;
    use crate::store::fixtures::open_tmp;
    use chrono::NaiveDate;
    use mockito::Matcher;
    use serde_json::json;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2026, 4, 2).unwrap())
    }

    fn config_for(server: &mockito::ServerGuard) -> DirectoryConfig {
        DirectoryConfig {
            base_url: server.url(),
            api_token: "tok".to_string(),
            timeout_secs: 5,
            ..DirectoryConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_config_is_reported_not_raised() {
        let (_dir, store) = open_tmp();
        let outcome = sync_directory(&store, &DirectoryConfig::default(), &clock()).await;
        assert_eq!(outcome, SyncOutcome::failed("directory config missing"));
    }

    #[test]
    fn settings_table_overrides_config() {
        let (_dir, store) = open_tmp();
        store.set_setting(DIRECTORY_BASE_URL, "https://db.example").unwrap();
        store.set_setting(DIRECTORY_API_TOKEN, "db-token").unwrap();

        let config = DirectoryConfig {
            base_url: "https://file.example".to_string(),
            company_id: "12".to_string(),
            ..DirectoryConfig::default()
        };
        let resolved = DirectorySettings::resolve(&store, &config).unwrap();
        assert_eq!(
            resolved,
            DirectorySettings {
                base_url: "https://db.example".to_string(),
                api_token: "db-token".to_string(),
                company_id: "12".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn two_pages_are_merged() {
        let (_dir, store) = open_tmp();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RESOURCE_PATH)
            .match_query(Matcher::Exact("only_active=false".into()))
            .with_status(200)
            .with_body(
                json!({
                    "data": [{"id": 1, "first_name": "A", "last_name": "Uno", "active": true}],
                    "meta": {"has_next_page": true, "end_cursor": "abc"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", RESOURCE_PATH)
            .match_query(Matcher::Exact("only_active=false&cursor=abc".into()))
            .with_status(200)
            .with_body(
                json!({
                    "data": [{"id": 2, "first_name": "B", "last_name": "Due", "active": false}],
                    "meta": {"has_next_page": false}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let outcome = sync_directory(&store, &config_for(&server), &clock()).await;
        assert!(outcome.ok, "{}", outcome.message);
        assert_eq!((outcome.created, outcome.updated), (2, 0));

        let second = sync_directory(&store, &config_for(&server), &clock()).await;
        assert_eq!((second.created, second.updated), (0, 2));
        assert_eq!(store.employees().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failure_on_second_page_commits_nothing() {
        let (_dir, store) = open_tmp();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RESOURCE_PATH)
            .match_query(Matcher::Exact("only_active=false".into()))
            .with_status(200)
            .with_body(
                json!({
                    "data": [{"id": 1, "active": true}],
                    "meta": {"has_next_page": true, "end_cursor": "abc"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", RESOURCE_PATH)
            .match_query(Matcher::Exact("only_active=false&cursor=abc".into()))
            .with_status(502)
            .create_async()
            .await;

        let outcome = sync_directory(&store, &config_for(&server), &clock()).await;
        assert!(!outcome.ok);
        assert!(outcome.message.starts_with("directory unavailable"));
        assert_eq!((outcome.created, outcome.updated), (0, 0));
        assert!(store.employees().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unexpected_payload_aborts_sync() {
        let (_dir, store) = open_tmp();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RESOURCE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"["not", "an", "object"]"#)
            .create_async()
            .await;

        let outcome = sync_directory(&store, &config_for(&server), &clock()).await;
        assert!(!outcome.ok);
        assert!(outcome.message.contains("unexpected directory payload"));
    }

    #[tokio::test]
    async fn last_synced_at_comes_from_clock() {
        let (_dir, store) = open_tmp();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RESOURCE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data": [{"id": "x1", "active": true}], "meta": {"has_next_page": false}}"#)
            .create_async()
            .await;

        let clock = clock();
        sync_directory(&store, &config_for(&server), &clock).await;
        let emp = store.employee_by_external_id("x1").unwrap().unwrap();
        assert_eq!(emp.last_synced_at, clock.now());
    }

    #[tokio::test]
    async fn hung_directory_reports_failure() {
        let (_dir, store) = open_tmp();
        let (url, _server) = crate::test_support::silent_server().await;
        let config = DirectoryConfig {
            base_url: url,
            api_token: "tok".to_string(),
            timeout_secs: 1,
            ..DirectoryConfig::default()
        };

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            sync_directory(&store, &config, &clock()),
        )
        .await
        .expect("sync must not hang");
        assert!(!outcome.ok);
        assert!(outcome.message.starts_with("directory unavailable"));
        assert!(store.employees().unwrap().is_empty());
    }
}
