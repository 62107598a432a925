//! Terminal output and the persistent activity log.
//!
//! Every message is also appended (timestamped, ANSI codes stripped) to
//! `$XDG_CACHE_HOME/classkit/classkit.log` (default `~/.cache/classkit/`),
//! regardless of the verbose flag, so a teacher can reconstruct what a
//! student's machine actually did.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Structured logger with verbose awareness and file persistence.
pub struct Logger {
    verbose: bool,
    log_file: Option<PathBuf>,
}

/// Return the log file path under `$XDG_CACHE_HOME/classkit/` (or `~/.cache/classkit/`).
fn log_file_path(file_name: &str) -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
        });
    let dir = cache_dir.join("classkit");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(file_name))
}

/// Strip ANSI escape sequences from a string.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm' (end of SGR sequence)
            for inner in chars.by_ref() {
                if inner == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a typed response counts as a "yes".
///
/// The classroom runs in French, so both French and English affirmatives
/// are accepted.
#[must_use]
pub fn is_affirmative(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "oui" | "o" | "yes" | "y"
    )
}

impl Logger {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self::with_log_name(verbose, "classkit.log")
    }

    /// Create a logger writing to a uniquely named file, so parallel test
    /// runs never truncate each other's logs.
    #[cfg(test)]
    #[must_use]
    pub fn for_tests() -> Self {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self::with_log_name(
            false,
            &format!("classkit-test-{}-{n}.log", std::process::id()),
        )
    }

    fn with_log_name(verbose: bool, file_name: &str) -> Self {
        let log_file = log_file_path(file_name);

        // Truncate and write header (new run = fresh log)
        if let Some(ref path) = log_file {
            let version =
                option_env!("CLASSKIT_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
            let header = format!(
                "==========================================\n\
                 classkit {version} {}\n\
                 ==========================================\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
            let _ = fs::write(path, header);
        }

        Self { verbose, log_file }
    }

    /// Append a line to the persistent log file.
    fn write_to_file(&self, level: &str, msg: &str) {
        if let Some(ref path) = self.log_file
            && let Ok(mut f) = fs::OpenOptions::new().append(true).open(path)
        {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let clean = strip_ansi(msg);
            let _ = writeln!(f, "{ts} {level} {clean}");
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    pub fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        self.write_to_file("ERR", msg);
    }

    pub fn warn(&self, msg: &str) {
        eprintln!("\x1b[33mWARN\x1b[0m  {msg}");
        self.write_to_file("WRN", msg);
    }

    pub fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        self.write_to_file("STG", msg);
    }

    pub fn info(&self, msg: &str) {
        println!("  {msg}");
        self.write_to_file("INF", msg);
    }

    pub fn success(&self, msg: &str) {
        println!("  \x1b[32m✓\x1b[0m {msg}");
        self.write_to_file("OK ", msg);
    }

    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        // Always log debug to file, even when not verbose on terminal
        self.write_to_file("DBG", msg);
    }

    pub fn dry_run(&self, msg: &str) {
        println!("  \x1b[33m[DRY RUN]\x1b[0m {msg}");
        self.write_to_file("DRY", msg);
    }

    /// Ask a yes/no question on the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout cannot be used.
    pub fn confirm(&self, prompt: &str) -> io::Result<bool> {
        print!("{prompt} (oui/non): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let accepted = is_affirmative(&input);
        self.write_to_file(
            "ASK",
            &format!("{prompt} -> {}", if accepted { "yes" } else { "no" }),
        );
        Ok(accepted)
    }

    /// Ask for a free-form line of input. Returns the trimmed response,
    /// falling back to `default` when the response is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout cannot be used.
    pub fn prompt_line(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(d) if !d.is_empty() => print!("{prompt} [{d}]: "),
            _ => print!("{prompt}: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            Ok(default.unwrap_or("").to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn logger_new() {
        let log = Logger::for_tests();
        assert!(!log.verbose);
    }

    #[test]
    fn logger_verbose() {
        let log = Logger::with_log_name(true, "classkit-test-verbose.log");
        assert!(log.verbose);
    }

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(strip_ansi("no codes here"), "no codes here");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
    }

    #[test]
    fn affirmative_accepts_french_and_english() {
        assert!(is_affirmative("oui"));
        assert!(is_affirmative("o"));
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  OUI \n"));
    }

    #[test]
    fn affirmative_rejects_everything_else() {
        assert!(!is_affirmative("non"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("maybe"));
    }

    #[test]
    fn log_file_is_created() {
        let log = Logger::for_tests();
        if let Some(path) = log.log_path() {
            assert!(path.exists(), "log file should be created on Logger::new");
        }
    }

    #[test]
    fn debug_always_written_to_file() {
        let log = Logger::for_tests(); // verbose=false
        // Unique marker so the assertion survives parallel tests
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        if let Some(path) = log.log_path() {
            let contents = fs::read_to_string(path).unwrap();
            assert!(
                contents.contains(&marker),
                "debug messages should always appear in the log file"
            );
        }
    }
}
