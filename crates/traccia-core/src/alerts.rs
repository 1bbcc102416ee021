//! Notification engine.
//!
//! For every certification: classify it, resolve its rule, find the due
//! thresholds, pass each through the dispatch gate, deliver on the enabled
//! channels, and record the send in the ledger.
//!
//! A send is recorded once delivery was *attempted* without error, even if
//! the enabled channel skipped itself for lack of configuration. A channel
//! error leaves the threshold unrecorded so the next run retries it.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::channels::{Channels, WebhookPayload};
use crate::clock::Clock;
use crate::error::Result;
use crate::expiry::{classify, days_left};
use crate::gate::{due_thresholds, DispatchGate};
use crate::rules::{ResolvedRule, RuleSet};
use crate::store::Store;
use crate::types::{AlertOutcome, ExpiryStatus, LedgerInsert, TrackableItem};

pub async fn run_alerts(store: &Store, channels: &Channels, clock: &dyn Clock) -> Result<AlertOutcome> {
    let today = clock.today();
    let items = store.trackable_items()?;
    let rules = RuleSet::new(store.alert_rules()?);
    let admins = store.active_admin_emails()?;
    let gate = DispatchGate::new(store);

    let mut outcome = AlertOutcome::default();
    for item in &items {
        let status = classify(item.expiry_date, today);
        let days = days_left(item.expiry_date, today);
        let rule = rules.resolve(&item.cert_type);

        let due = due_thresholds(&rule.thresholds, days, status);
        if due.is_empty() {
            continue;
        }
        let recipients = merge_recipients(&rule.recipients, &admins);

        for threshold in due {
            match gate.is_due_and_unsent(item.id, threshold) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(certification_id = item.id, threshold, "already sent");
                    continue;
                }
                Err(e) => {
                    warn!(certification_id = item.id, threshold, error = %e, "ledger lookup failed");
                    continue;
                }
            }

            if let Err(e) = deliver(channels, &rule, &recipients, item, status, days, threshold).await {
                warn!(
                    certification_id = item.id,
                    threshold,
                    error = %e,
                    "alert dispatch failed"
                );
                continue;
            }

            match store.record_send(item.id, threshold, clock.now()) {
                Ok(LedgerInsert::Recorded) => outcome.sent += 1,
                Ok(LedgerInsert::AlreadyRecorded) => {
                    debug!(certification_id = item.id, threshold, "send raced; already recorded")
                }
                Err(e) => {
                    warn!(certification_id = item.id, threshold, error = %e, "failed to record send")
                }
            }
        }
    }

    info!(sent = outcome.sent, items = items.len(), %today, "alert run finished");
    Ok(outcome)
}

/// Rule recipients plus active administrators, deduplicated and sorted.
pub fn merge_recipients(rule_recipients: &[String], admins: &[String]) -> Vec<String> {
    rule_recipients
        .iter()
        .chain(admins)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn deliver(
    channels: &Channels,
    rule: &ResolvedRule,
    recipients: &[String],
    item: &TrackableItem,
    status: ExpiryStatus,
    days: i64,
    threshold: u32,
) -> Result<()> {
    if rule.email_enabled {
        channels
            .mail
            .send(recipients, &subject(item), &body(item, status, days))
            .await?;
    }
    if rule.webhook_enabled {
        channels
            .webhook
            .send(&WebhookPayload {
                certification_id: item.id,
                employee_id: item.employee_id,
                threshold,
                days_left: days,
                status,
            })
            .await?;
    }
    Ok(())
}

fn subject(item: &TrackableItem) -> String {
    format!("[Formazione] {} - {}", item.title, item.owner_name())
}

fn body(item: &TrackableItem, status: ExpiryStatus, days: i64) -> String {
    format!(
        "Certificato: {}\nTipo: {}\nDipendente: {}\nScadenza: {}\nStato: {}\nGiorni alla scadenza: {}\n",
        item.title,
        item.cert_type,
        item.owner_name(),
        item.expiry_date.format("%Y-%m-%d"),
        status,
        days
    )
}
