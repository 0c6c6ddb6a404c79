use crate::app::{AppContext, SettingsHandle};
use crate::config::{validate_app_state, validate_settings};

use serde::Serialize;
use tracing::info;

/// Result of one diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

impl Check {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            ok: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Check local settings and backend reachability.
pub async fn run_diagnostics(ctx: &AppContext) -> Vec<Check> {
    info!("Running diagnostics...");
    let mut checks = Vec::new();

    let problems = match &ctx.settings {
        SettingsHandle::Web(store) => validate_settings(&store.get()),
        SettingsHandle::Mobile(store) => validate_app_state(&store.get()),
    };
    if problems.is_empty() {
        checks.push(Check::pass("settings", "valid"));
    } else {
        let detail: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
        checks.push(Check::fail("settings", detail.join("; ")));
    }

    let source = ctx.client.settings();
    checks.push(match source.api_key() {
        Some(_) => Check::pass("api_key", "configured"),
        None => Check::fail("api_key", "missing"),
    });

    match ctx.client.health().await {
        Ok(status) => checks.push(Check::pass("health", status.status)),
        Err(e) => checks.push(Check::fail("health", e.to_string())),
    }

    match ctx.client.healthz().await {
        Ok(components) => {
            for (component, status) in components {
                let name = format!("healthz.{component}");
                checks.push(if status == "ok" {
                    Check::pass(&name, status)
                } else {
                    Check::fail(&name, status)
                });
            }
        }
        Err(e) => checks.push(Check::fail("healthz", e.to_string())),
    }

    info!(
        failed = checks.iter().filter(|c| !c.ok).count(),
        "Diagnostics complete"
    );
    checks
}
