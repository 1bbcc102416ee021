use crate::output::{print_json, print_table, yes_no};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use traccia_core::thresholds::{format_thresholds, parse_thresholds};
use traccia_core::types::AlertRule;

use super::{load_config, open_store};

#[derive(Subcommand)]
pub enum RulesSubcommand {
    /// List stored alert rules
    List,

    /// Create or replace the rule for a category (or the global rule)
    Set {
        /// Certification category; omit for the global rule
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated day thresholds, e.g. 90,60,30
        #[arg(long)]
        thresholds: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        email: bool,
        #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
        webhook: bool,
        /// Comma-separated extra recipients
        #[arg(long, default_value = "")]
        recipients: String,
    },
}

pub fn run(config_path: &Path, subcmd: RulesSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RulesSubcommand::List => list(config_path, json),
        RulesSubcommand::Set {
            category,
            thresholds,
            email,
            webhook,
            recipients,
        } => {
            let rule = AlertRule {
                cert_type: category.filter(|c| !c.trim().is_empty()),
                thresholds_csv: thresholds,
                email_enabled: email,
                webhook_enabled: webhook,
                recipient_emails: recipients,
            };
            set(config_path, rule, json)
        }
    }
}

fn list(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let store = open_store(&load_config(config_path)?)?;
    let rules = store.alert_rules().context("failed to read alert rules")?;

    if json {
        return print_json(&rules);
    }
    if rules.is_empty() {
        println!("No alert rules. Built-in defaults apply.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = rules
        .iter()
        .map(|r| {
            vec![
                r.cert_type.clone().unwrap_or_else(|| "(global)".to_string()),
                format_thresholds(&parse_thresholds(&r.thresholds_csv)),
                yes_no(r.email_enabled).to_string(),
                yes_no(r.webhook_enabled).to_string(),
                r.recipient_emails.clone(),
            ]
        })
        .collect();
    print_table(
        &["CATEGORY", "THRESHOLDS", "EMAIL", "WEBHOOK", "RECIPIENTS"],
        &rows,
    );
    Ok(())
}

fn set(config_path: &Path, rule: AlertRule, json: bool) -> anyhow::Result<()> {
    if parse_thresholds(&rule.thresholds_csv).is_empty() {
        anyhow::bail!(
            "no valid thresholds in '{}'; expected comma-separated day counts",
            rule.thresholds_csv
        );
    }

    let store = open_store(&load_config(config_path)?)?;
    store.upsert_rule(&rule).context("failed to save alert rule")?;

    if json {
        print_json(&rule)?;
    } else {
        let scope = rule.cert_type.as_deref().unwrap_or("global");
        println!(
            "Saved {scope} rule: thresholds {}",
            format_thresholds(&parse_thresholds(&rule.thresholds_csv))
        );
    }
    Ok(())
}
