//! Log sanitization for patient inputs and identifiers.
//!
//! Everything the subscriber formats passes through [`SanitizingMakeWriter`]
//! before reaching the log sink. It redacts:
//! - Numeric lists (the shape of a formatted feature vector)
//! - UUIDs, emails, phone and SSN-like numbers
//! - Contextual secrets (`key=...`, `seed=...` followed by long base64/hex)
//!
//! Call sites should still avoid logging raw inputs; `FeatureVector` does
//! not print its values through `Debug`.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

/// Upper bound on bytes sanitized per line.
const MAX_SANITIZE_BYTES: usize = 16 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct Rules {
    set: RegexSet,
    rules: Vec<Rule>,
}

static RULES: OnceLock<Rules> = OnceLock::new();

fn rules() -> &'static Rules {
    RULES.get_or_init(|| {
        let table: [(&str, &str); 6] = [
            (
                r"\[\s*-?\d+(?:\.\d+)?(?:[eE]-?\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?(?:[eE]-?\d+)?)+\s*\]",
                "[REDACTED-FEATURES]",
            ),
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-UUID]",
            ),
            (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
            (
                r"(?i)\b[a-z0-9][a-z0-9._%+-]{0,63}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
            (
                r"(?i)\b(?:key|seed|secret|password|token)\b\s*[:=]\s*[A-Za-z0-9+/]{32,}={0,2}",
                "[REDACTED-SECRET]",
            ),
        ];

        // The table is static; a failure here is a programming error.
        let set = RegexSet::new(table.iter().map(|(p, _)| *p)).expect("valid regex set");
        let rules = table
            .iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("valid regex"),
                replacement: *replacement,
            })
            .collect();
        Rules { set, rules }
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact sensitive patterns from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, MAX_SANITIZE_BYTES)
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let rules = rules();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut out = prefix.to_string();
    for idx in rules.set.matches(prefix).into_iter() {
        let rule = &rules.rules[idx];
        out = rule.regex.replace_all(&out, rule.replacement).into_owned();
    }
    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// Whether `input` contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, MAX_SANITIZE_BYTES);
    rules().set.is_match(prefix)
}

/// `MakeWriter` wrapper that sanitizes each formatted log line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sanitized = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline must not buffer without bound.
        if self.buffer.len() > MAX_SANITIZE_BYTES * 2 {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_feature_lists() {
        let line = "predict category=Diabetes features=[1.0, 85.0, 66.0, 26.6, 0.351]";
        let out = sanitize(line);
        assert!(out.contains("[REDACTED-FEATURES]"));
        assert!(!out.contains("85.0"));
        assert!(out.contains("category=Diabetes"));
    }

    #[test]
    fn test_redacts_negative_and_exponent_values() {
        let out = sanitize("row=[-4.813031, 2.1e-5]");
        assert_eq!(out, "row=[REDACTED-FEATURES]");
    }

    #[test]
    fn test_keeps_ordinary_text() {
        let line = "Loaded 5 models from \"models\" in 12ms";
        assert_eq!(sanitize(line), line);
        assert!(!contains_sensitive(line));
        // A single bracketed number is not a feature vector.
        assert!(!contains_sensitive("retry [1]"));
    }

    #[test]
    fn test_redacts_identifiers() {
        let out = sanitize("patient 550e8400-e29b-41d4-a716-446655440000 mail a.b@clinic.org");
        assert!(out.contains("[REDACTED-UUID]"));
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(sanitize("SSN: 123-45-6789").contains("[REDACTED-SSN]"));
    }

    #[test]
    fn test_redacts_secrets() {
        let out = sanitize("seed=QWxhZGRpbjpvcGVuIHNlc2FtZSB3aXRoIGxvbmcgc2VjcmV0");
        assert!(out.contains("[REDACTED-SECRET]"));
    }

    #[test]
    fn test_truncates_large_input() {
        let out = sanitize_with_limit("abcdefghij", 4);
        assert_eq!(out, "abcd [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer.write_all(b"features=[1.0, 2.0]\n").expect("write");
            writer.write_all(b"partial").expect("write");
            writer.flush().expect("flush");
        }
        let text = String::from_utf8(sink).expect("utf8");
        assert_eq!(text, "features=[REDACTED-FEATURES]\npartial");
    }
}
