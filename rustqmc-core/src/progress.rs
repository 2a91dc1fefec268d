//! Best-effort progress reporting. A process-wide toggle decides
//! whether long runs show a terminal bar; reporting carries no
//! correctness weight and embedding callers usually switch it off.

use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn progress reporting on or off for the whole process.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// A bar over a known number of steps. Hidden when reporting is
/// disabled, so call sites can drive it unconditionally.
pub fn bar(len: u64, message: &str) -> ProgressBar {
    if !enabled() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len} ({elapsed})"),
    );
    bar.set_message(message);
    bar
}
