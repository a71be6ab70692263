//! Progress bar utilities.

use std::sync::Mutex;

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use crate::download::{CompletionEvent, DownloadHooks, ProgressEvent};
use crate::output::console::print_success;

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Create a progress bar for downloads.
pub fn create_download_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}

/// Create a byte counter for downloads of unknown size.
pub fn create_byte_counter() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix} {spinner:.green} {bytes} ({bytes_per_sec})")
            .unwrap(),
    );
    bar
}

/// Download hooks that render a progress bar per file.
#[derive(Default)]
pub struct ProgressHooks {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressHooks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DownloadHooks for ProgressHooks {
    fn on_progress(&self, event: &ProgressEvent<'_>) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        let bar = slot.get_or_insert_with(|| {
            let bar = match event.total {
                Some(total) => create_download_bar(total),
                None => create_byte_counter(),
            };
            bar.set_prefix(format!(
                "[{}/{}]",
                event.position.ordinal, event.position.total
            ));
            bar
        });
        bar.set_position(event.transferred);
    }

    fn on_complete(&self, _event: &CompletionEvent<'_>) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn on_finalized(&self, event: &CompletionEvent<'_>) {
        print_success(&format!(
            "[{}/{}] Saved {} ({})",
            event.position.ordinal,
            event.position.total,
            event.path.display(),
            HumanBytes(event.file_size)
        ));
    }
}
