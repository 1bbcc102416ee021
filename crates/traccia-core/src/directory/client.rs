//! Cursor-paginated fetch of the external employee roster.
//!
//! The whole roster is fetched before anything is merged: a failure on any
//! page aborts the attempt and no partial data is returned.

use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, TracciaError};

/// Employees resource, appended to a bare base URL.
pub const RESOURCE_PATH: &str = "/api/2026-01-01/resources/employees/employees";

/// Full resource URL for `base`. A base that already points at the
/// employees resource is used unchanged.
pub fn resource_url(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.contains("/api/") && base.contains("/resources/employees/employees") {
        base.to_string()
    } else {
        format!("{base}{RESOURCE_PATH}")
    }
}

/// One decoded page: its records and the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Value>,
    pub next_cursor: Option<String>,
}

/// Decode a page body. A body that is not an object, or whose `data` is not
/// an array, is an unexpected payload. Missing `data` is an empty page.
pub fn parse_page(payload: Value) -> Result<Page> {
    let Value::Object(mut body) = payload else {
        return Err(TracciaError::UnexpectedPayload(
            "response body is not a JSON object".into(),
        ));
    };

    let records = match body.remove("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(TracciaError::UnexpectedPayload(format!(
                "'data' is not an array: {other}"
            )))
        }
    };

    let meta = body.get("meta");
    let has_next = meta
        .and_then(|m| m.get("has_next_page"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let next_cursor = if has_next {
        meta.and_then(|m| m.get("end_cursor"))
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    Ok(Page {
        records,
        next_cursor,
    })
}

pub struct DirectoryClient {
    http: reqwest::Client,
    url: String,
    token: String,
    company_id: Option<String>,
}

impl DirectoryClient {
    pub fn new(base_url: &str, token: &str, company_id: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let company_id = Some(company_id.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(Self {
            http,
            url: resource_url(base_url),
            token: token.trim().to_string(),
            company_id,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch every page in order and concatenate the records. Stops early if
    /// the directory hands back a cursor it already gave.
    pub async fn fetch_all(&self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();
        let mut pages = 0u32;

        loop {
            let page = self.fetch_page(cursor.as_deref()).await?;
            pages += 1;
            debug!(
                page = pages,
                records = page.records.len(),
                has_next = page.next_cursor.is_some(),
                "directory page fetched"
            );
            records.extend(page.records);
            match page.next_cursor {
                Some(next) if !seen.insert(next.clone()) => {
                    warn!(cursor = %next, pages, "directory repeated a cursor; stopping");
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page> {
        // Inactive staff must come back too so the merge can deactivate them.
        let mut query: Vec<(&str, &str)> = vec![("only_active", "false")];
        if let Some(company) = self.company_id.as_deref() {
            query.push(("company_id", company));
        }
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let resp = self
            .http
            .get(&self.url)
            .query(&query)
            .header("x-api-key", &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TracciaError::DirectoryStatus(status.as_u16()));
        }

        let payload: Value = resp.json().await?;
        parse_page(payload)
    }
}
