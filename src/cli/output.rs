/// Output formatting: rendered templates or JSON on stdout, notices and errors on stderr.
use std::io::Write;

use serde::Serialize;

use crate::proxy::LoginRecord;
use crate::template::Template;
use crate::types::{ErrorOutput, LoginOutput};

/// Output context passed to the lookup workflow.
pub struct OutputCtx {
    /// Write records and errors as JSON.
    pub json: bool,
    /// Omit the newline after each rendered record.
    pub suppress_newline: bool,
    /// When true, log step timings at debug level.
    pub debug: bool,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(json: bool, suppress_newline: bool, debug: bool) -> Self {
        Self {
            json,
            suppress_newline,
            debug,
        }
    }

    /// Start a named debug timer. Logs elapsed on drop only when `--debug` is set.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> DebugTimer {
        DebugTimer::new(label, self.debug)
    }
}

// --- Credentials ---

/// Render every record through `template`, in order.
#[must_use]
pub fn format_logins(logins: &[LoginRecord], template: &Template, suppress_newline: bool) -> String {
    let mut out = String::new();
    for login in logins {
        out.push_str(&template.render(login));
        if !suppress_newline {
            out.push('\n');
        }
    }
    out
}

/// Write the records for a successful lookup to stdout.
pub fn write_logins(logins: &[LoginRecord], template: &Template, ctx: &OutputCtx) {
    if ctx.json {
        let output: Vec<LoginOutput> = logins.iter().map(LoginOutput::from).collect();
        print_json(&output);
    } else {
        print!("{}", format_logins(logins, template, ctx.suppress_newline));
        let _ = std::io::stdout().flush();
    }
}

/// Report a lookup that matched nothing. Not an error.
pub fn write_no_logins(url: &str, ctx: &OutputCtx) {
    if ctx.json {
        print_json::<[LoginOutput]>(&[]);
    }
    write_notice(&format!("No logins found for URL: {url}"));
}

// --- Notices ---

/// Write a progress notice to stderr, keeping stdout for credentials.
pub fn write_notice(message: &str) {
    let _ = writeln!(std::io::stderr().lock(), "{message}");
}

// --- Error output ---

/// Write a structured error to stderr.
pub fn write_error(err: &ErrorOutput, json: bool) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    if json {
        let s = serde_json::to_string_pretty(err).unwrap_or_default();
        let _ = writeln!(out, "{s}");
    } else {
        let _ = writeln!(out, "Error: {}", err.error.message);
    }
}

// --- Debug timer ---

/// A RAII timer that logs elapsed milliseconds on drop.
///
/// Created via [`OutputCtx::timer`]. Does nothing when `debug` is false.
pub struct DebugTimer {
    label: &'static str,
    start: std::time::Instant,
    active: bool,
}

impl DebugTimer {
    #[must_use]
    fn new(label: &'static str, active: bool) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
            active,
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        if self.active {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            log::debug!("{}: {ms:.2}ms", self.label);
        }
    }
}

// --- Generic JSON helpers ---

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => log::error!("JSON serialization error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<LoginRecord> {
        vec![
            LoginRecord {
                name: Some("A".to_owned()),
                login: Some("u".to_owned()),
                password: Some("p".to_owned()),
            },
            LoginRecord {
                name: Some("B".to_owned()),
                login: None,
                password: Some("q".to_owned()),
            },
        ]
    }

    #[test]
    fn test_format_with_newlines() {
        let t = Template::parse("%n/%l/%p");
        assert_eq!(format_logins(&sample()[..1], &t, false), "A/u/p\n");
        assert_eq!(format_logins(&sample(), &t, false), "A/u/p\nB/N/A/q\n");
    }

    #[test]
    fn test_format_suppressed_newline() {
        let t = Template::parse("%n/%l/%p");
        assert_eq!(format_logins(&sample()[..1], &t, true), "A/u/p");
        assert_eq!(format_logins(&sample(), &t, true), "A/u/pB/N/A/q");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_logins(&[], &Template::default(), false), "");
    }

    #[test]
    fn test_timer_inactive_without_debug() {
        let ctx = OutputCtx::new(false, false, false);
        let timer = ctx.timer("noop");
        assert!(!timer.active);
    }
}
