//! Terminal rendering of install events.
//!
//! The streaming strategy reports byte progress, which drives an
//! `indicatif` bar. The accelerator prints its own progress, so nothing is
//! drawn for it.

use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};

use mlget_core::{InstallEvent, InstallObserver};

/// Printed when `aria2c` is missing and the streaming fallback is used.
pub const FALLBACK_NOTICE: &str =
    "aria2c not found, falling back to single-stream downloader (no multi-connection resume).";

/// Turns install events into terminal output.
#[derive(Default)]
pub struct InstallReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl InstallReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer closure forwarding events to this reporter.
    pub fn observer(self: &Arc<Self>) -> InstallObserver {
        let reporter = Arc::clone(self);
        Arc::new(move |event: &InstallEvent| reporter.handle(event))
    }

    /// Notice line for an event, if it warrants one.
    pub fn notice(event: &InstallEvent) -> Option<String> {
        match event {
            InstallEvent::Resolved { candidates } if candidates.len() > 1 => Some(format!(
                "Resolved {} candidates, trying them in order",
                candidates.len()
            )),
            InstallEvent::TaskRegistered { task_id, out_path } => Some(format!(
                "Download registered (id={task_id}) -> {}",
                out_path.display()
            )),
            InstallEvent::StrategySelected {
                accelerator_missing: true,
                ..
            } => Some(FALLBACK_NOTICE.to_string()),
            InstallEvent::StrategySelected { strategy, .. } => {
                Some(format!("Using {strategy} transfer"))
            }
            InstallEvent::AttemptFailed {
                task_id,
                status_code,
                diagnostic,
            } => Some(format!(
                "Attempt {task_id} failed (status {status_code}): {diagnostic}"
            )),
            InstallEvent::Resolved { .. } | InstallEvent::Progress { .. } => None,
        }
    }

    pub fn handle(&self, event: &InstallEvent) {
        if let InstallEvent::Progress {
            downloaded, total, ..
        } = event
        {
            self.update(*downloaded, *total);
            return;
        }

        // Any other event ends the current bar before printing.
        self.finish();
        if let Some(line) = Self::notice(event) {
            println!("{line}");
        }
    }

    fn update(&self, downloaded: u64, total: Option<u64>) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let bar = guard.get_or_insert_with(|| create_bar(total));
        if let Some(total) = total {
            bar.set_length(total);
        }
        bar.set_position(downloaded);
    }

    /// Clear any active progress bar.
    pub fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}

fn create_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(t) if t > 0 => {
            let bar = ProgressBar::new(t);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
            ) {
                bar.set_style(style.progress_chars("█▓░"));
            }
            bar
        }
        _ => {
            let bar = ProgressBar::new_spinner();
            let template = "{spinner:.green} [{elapsed_precise}] {bytes}";
            if let Ok(style) = ProgressStyle::default_spinner().template(template) {
                bar.set_style(style);
            }
            bar
        }
    }
}
