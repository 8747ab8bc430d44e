//! ANSI color helpers for CLI output.
//!
//! Colors are disabled when `NO_COLOR` is set, when the caller passes
//! `--no-color`, or when stderr is not worth decorating (`TERM=dumb`).

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

static DISABLED: AtomicBool = AtomicBool::new(false);

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Initialize the global color state from CLI flags and environment.
pub fn init(no_color_flag: bool) {
    let env_disabled = std::env::var_os("NO_COLOR").is_some()
        || std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
    DISABLED.store(no_color_flag || env_disabled, Ordering::Relaxed);
}

pub fn is_disabled() -> bool {
    DISABLED.load(Ordering::Relaxed)
}

fn paint(code: &str, text: &str) -> String {
    if is_disabled() {
        text.to_string()
    } else {
        format!("{code}{text}{RESET}")
    }
}

/// Namespaced color constructors used by the CLI presenter.
pub struct Colors;

impl Colors {
    pub fn success(text: &str) -> String {
        paint(GREEN, text)
    }

    pub fn error(text: &str) -> String {
        paint(RED, text)
    }

    pub fn warning(text: &str) -> String {
        paint(YELLOW, text)
    }

    pub fn info(text: &str) -> String {
        paint(CYAN, text)
    }

    pub fn dim(text: &str) -> String {
        paint(DIM, text)
    }

    pub fn bold(text: &str) -> String {
        paint(BOLD, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_passes_text_through() {
        DISABLED.store(true, Ordering::Relaxed);
        assert_eq!(Colors::error("boom"), "boom");
        assert_eq!(Colors::dim("note"), "note");
    }

    #[test]
    fn test_enabled_wraps_with_reset() {
        DISABLED.store(false, Ordering::Relaxed);
        let painted = Colors::success("ok");
        assert!(painted.starts_with("\x1b[32m"));
        assert!(painted.ends_with(RESET));
        DISABLED.store(true, Ordering::Relaxed);
    }
}
