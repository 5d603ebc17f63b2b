use std::fmt::Write;

use sha2::{Digest, Sha256};

const MAX_STEM_LEN: usize = 80;

/// Deterministic, filesystem-safe output base: `{title_stem}--{short_hash(locator)}`.
///
/// The same title and locator always produce the same base, so re-scraping a
/// page overwrites the previous output instead of piling up copies.
pub fn default_output_base(title: &str, locator: &str) -> String {
    format!("{}--{}", title_stem(title), short_hash(locator))
}

fn title_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in title.chars() {
        if c.is_alphanumeric() || c == '-' || c == '.' {
            if pending_separator && !stem.is_empty() {
                stem.push('_');
            }
            pending_separator = false;
            stem.push(c);
        } else {
            pending_separator = true;
        }
    }
    let mut stem = stem.trim_matches(&['.', '-'][..]).to_string();
    if stem.chars().count() > MAX_STEM_LEN {
        stem = stem.chars().take(MAX_STEM_LEN).collect();
    }
    if stem.is_empty() {
        stem.push_str("untitled");
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
