//! Post-processing of LLM markdown before it is sent to Telegram.

use regex::Regex;
use std::sync::LazyLock;

static EXTRA_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

fn is_list_item(line: &str) -> bool {
    line.trim_start().starts_with('-')
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Normalize digest whitespace.
///
/// 1. Blank lines between two consecutive dash list items are dropped.
/// 2. Any run of 3+ newlines is collapsed to exactly 2.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        kept.push(line);
        i += 1;

        if !is_list_item(line) {
            continue;
        }
        let mut j = i;
        while j < lines.len() && is_blank(lines[j]) {
            j += 1;
        }
        if j > i && j < lines.len() && is_list_item(lines[j]) {
            i = j;
        }
    }

    EXTRA_NEWLINES
        .replace_all(&kept.join("\n"), "\n\n")
        .into_owned()
}
