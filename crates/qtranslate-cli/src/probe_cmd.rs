//! `qtranslate probe` — "test connection" for providers and the speech service.

use anyhow::{bail, Context, Result};
use colored::Colorize;

use qtranslate_core::config::{load_config, Config};
use qtranslate_providers::HealthProber;

use crate::helpers;

/// Which probes to run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeTargets {
    /// Provider id or name; `None` means the active provider.
    pub provider: Option<String>,
    pub all: bool,
    pub speech: bool,
}

/// Run the probe command. Fails if any probe is unhealthy.
pub async fn run(targets: ProbeTargets) -> Result<()> {
    let config = load_config(None);
    let prober = HealthProber::new();
    let cancel = helpers::cancel_on_ctrl_c();

    println!();
    println!("{}", "  Health Check".cyan().bold());
    println!();

    let mut failures = 0usize;

    if targets.all {
        let reports = prober
            .probe_all(&config.providers, Some(&config.speech.endpoint), &cancel)
            .await;
        for report in &reports {
            helpers::print_health(&report.label, &report.status);
        }
        failures = reports.iter().filter(|r| !r.status.is_healthy()).count();
    } else {
        if !targets.speech || targets.provider.is_some() {
            let profile = pick_provider(&config, targets.provider.as_deref())?;
            let status = prober.probe_provider(profile, &cancel).await;
            helpers::print_health(&format!("Provider: {}", profile.name), &status);
            failures += usize::from(!status.is_healthy());
        }
        if targets.speech {
            let status = prober
                .probe_side_service(Some(&config.speech.endpoint), &cancel)
                .await;
            helpers::print_health("Speech service", &status);
            failures += usize::from(!status.is_healthy());
        }
    }

    cancel.cancel();
    println!();

    if failures > 0 {
        bail!("{} check(s) failed", failures);
    }
    Ok(())
}

fn pick_provider<'a>(
    config: &'a Config,
    key: Option<&str>,
) -> Result<&'a qtranslate_core::config::ProviderProfile> {
    match key {
        Some(key) => config
            .find_provider(key)
            .with_context(|| format!("No provider matches '{}'", key)),
        None => config
            .active_provider()
            .context("No provider configured. Run `qtranslate onboard` first."),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
