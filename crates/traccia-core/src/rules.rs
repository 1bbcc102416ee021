//! Alert rule resolution.
//!
//! A category-scoped rule wins over the global rule; when neither exists the
//! built-in defaults apply (all default thresholds, email on, webhook off).

use crate::thresholds::{parse_thresholds, DEFAULT_THRESHOLDS};
use crate::types::AlertRule;
use std::collections::HashMap;

/// The effective settings for one item, thresholds already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub thresholds: Vec<u32>,
    pub email_enabled: bool,
    pub webhook_enabled: bool,
    pub recipients: Vec<String>,
}

impl ResolvedRule {
    pub fn defaults() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            email_enabled: true,
            webhook_enabled: false,
            recipients: Vec::new(),
        }
    }

    fn from_rule(rule: &AlertRule) -> Self {
        Self {
            thresholds: parse_thresholds(&rule.thresholds_csv),
            email_enabled: rule.email_enabled,
            webhook_enabled: rule.webhook_enabled,
            recipients: split_recipients(&rule.recipient_emails),
        }
    }
}

/// Split a comma-separated address list, dropping blanks.
pub fn split_recipients(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// All stored rules, indexed for resolution.
#[derive(Debug, Default)]
pub struct RuleSet {
    global: Option<AlertRule>,
    by_category: HashMap<String, AlertRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        let mut set = Self::default();
        for rule in rules {
            match rule.cert_type.clone() {
                Some(category) => {
                    set.by_category.insert(category, rule);
                }
                None => set.global = Some(rule),
            }
        }
        set
    }

    pub fn resolve(&self, cert_type: &str) -> ResolvedRule {
        self.by_category
            .get(cert_type)
            .or(self.global.as_ref())
            .map(ResolvedRule::from_rule)
            .unwrap_or_else(ResolvedRule::defaults)
    }
}
