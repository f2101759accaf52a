//! Filename tag grammar: encoding, decoding, sanitizing, and stripping tag
//! blocks embedded in a file's basename.

use crate::config::MAX_STRIP_ITERATIONS;
use crate::models::settings::{TagFormat, TagGrammar, TagGrouping, TagPosition};

/// Replace characters illegal (or awkward) in filenames with visually similar
/// substitutes, drop control characters below code point 32 (tab excepted),
/// and trim surrounding spaces/dots. Never returns an empty string.
pub fn sanitize_tag_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let mapped = match c {
            '<' => '＜',
            '>' => '＞',
            ':' => '：',
            '"' => '\'',
            '|' => '丨',
            '?' => '？',
            '*' => '＊',
            other => other,
        };
        if (mapped as u32) < 32 && mapped != '\t' {
            continue;
        }
        out.push(mapped);
    }
    let trimmed = out.trim_matches(|c: char| c == ' ' || c == '.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a basename into `(stem, ext)` where `ext` is everything from the
/// last `.` onward, or empty if there is no `.`.
pub fn split_basename(basename: &str) -> (String, String) {
    match basename.rfind('.') {
        Some(idx) => (basename[..idx].to_string(), basename[idx..].to_string()),
        None => (basename.to_string(), String::new()),
    }
}

/// The delimiter sets stripping and decoding should try: the three built-in
/// grammars plus the currently configured custom one, if any. Position,
/// spacing, and grouping are copied from `current` since only the delimiter
/// triple varies across legacy filenames.
fn candidate_grammars(current: &TagGrammar) -> Vec<TagGrammar> {
    let mut candidates = vec![
        with_format(current, TagFormat::SquareBrackets),
        with_format(current, TagFormat::Brackets),
        with_format(current, TagFormat::Parentheses),
    ];
    if current.format == TagFormat::Custom {
        candidates.push(current.clone());
    }
    candidates
}

fn with_format(current: &TagGrammar, format: TagFormat) -> TagGrammar {
    let mut g = current.clone();
    g.format = format;
    g
}

/// Encode a tag list into a basename under `grammar`, stripping any existing
/// tag blocks first.
pub fn encode(basename: &str, tags: &[String], grammar: &TagGrammar) -> String {
    let (raw_stem, ext) = split_basename(basename);
    let known = candidate_grammars(grammar);
    let stripped_stem = strip(&raw_stem, &known);

    if tags.is_empty() {
        return format!("{stripped_stem}{ext}");
    }

    let sanitized_tags: Vec<String> = tags.iter().map(|t| sanitize_tag_name(t)).collect();
    let (raw_prefix, raw_suffix, raw_separator) = grammar.delimiters();
    let (prefix, suffix, separator) = if grammar.format == TagFormat::Custom {
        (
            sanitize_tag_name(raw_prefix),
            sanitize_tag_name(raw_suffix),
            sanitize_tag_name(raw_separator),
        )
    } else {
        (
            raw_prefix.to_string(),
            raw_suffix.to_string(),
            raw_separator.to_string(),
        )
    };

    let block = match grammar.grouping {
        TagGrouping::Combined => format!("{prefix}{}{suffix}", sanitized_tags.join(&separator)),
        TagGrouping::Individual => sanitized_tags
            .iter()
            .map(|t| format!("{prefix}{t}{suffix}"))
            .collect::<String>(),
    };

    let space = if grammar.add_spaces { " " } else { "" };
    match grammar.position {
        TagPosition::Prefix => format!("{block}{space}{stripped_stem}{ext}"),
        TagPosition::Suffix => format!("{stripped_stem}{space}{block}{ext}"),
    }
}

/// Decode the tag list embedded in a basename, trying the configured grammar
/// (individual layout at its position, then combined layout at either end)
/// against each candidate delimiter set until one yields a non-empty list.
pub fn decode(basename: &str, grammar: &TagGrammar) -> Vec<String> {
    let (stem, _ext) = split_basename(basename);
    for candidate in candidate_grammars(grammar) {
        let (prefix, suffix, separator) = candidate.delimiters();
        if prefix.is_empty() || suffix.is_empty() {
            continue;
        }

        let individual = peel_individual(&stem, prefix, suffix, grammar.position)
            .filter(|tags| !tags.is_empty());
        let combined = peel_combined(&stem, prefix, suffix, separator).filter(|tags| !tags.is_empty());

        // Try the layout matching the configured grouping first: a combined
        // block's interior can itself look like one valid individual block
        // (e.g. "[draft, 2025]" peels as the single tag "draft, 2025"), so
        // trying individual unconditionally first would misread it.
        let ordered = match grammar.grouping {
            TagGrouping::Combined => [combined, individual],
            TagGrouping::Individual => [individual, combined],
        };
        if let Some(tags) = ordered.into_iter().flatten().next() {
            return tags;
        }
    }
    Vec::new()
}

fn peel_individual(
    stem: &str,
    prefix: &str,
    suffix: &str,
    position: TagPosition,
) -> Option<Vec<String>> {
    let mut remaining = stem.to_string();
    let mut tags = Vec::new();

    loop {
        match position {
            TagPosition::Suffix => {
                let trimmed = remaining.trim_end();
                if !trimmed.ends_with(suffix) {
                    break;
                }
                let without_suffix = &trimmed[..trimmed.len() - suffix.len()];
                match without_suffix.rfind(prefix) {
                    Some(idx) => {
                        let interior = &without_suffix[idx + prefix.len()..];
                        if interior.contains(prefix) || interior.contains(suffix) {
                            break;
                        }
                        tags.push(interior.trim().to_string());
                        remaining = without_suffix[..idx].to_string();
                    }
                    None => break,
                }
            }
            TagPosition::Prefix => {
                let trimmed = remaining.trim_start();
                if !trimmed.starts_with(prefix) {
                    break;
                }
                let without_prefix = &trimmed[prefix.len()..];
                match without_prefix.find(suffix) {
                    Some(idx) => {
                        let interior = &without_prefix[..idx];
                        if interior.contains(prefix) || interior.contains(suffix) {
                            break;
                        }
                        tags.push(interior.trim().to_string());
                        remaining = without_prefix[idx + suffix.len()..].to_string();
                    }
                    None => break,
                }
            }
        }
    }

    if tags.is_empty() {
        return None;
    }
    if matches!(position, TagPosition::Suffix) {
        tags.reverse();
    }
    Some(tags)
}

fn peel_combined(stem: &str, prefix: &str, suffix: &str, separator: &str) -> Option<Vec<String>> {
    let split_block = |interior: &str| -> Vec<String> {
        interior
            .split(separator)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    let trimmed_end = stem.trim_end();
    if trimmed_end.ends_with(suffix) {
        let without_suffix = &trimmed_end[..trimmed_end.len() - suffix.len()];
        if let Some(idx) = without_suffix.rfind(prefix) {
            let tags = split_block(&without_suffix[idx + prefix.len()..]);
            if !tags.is_empty() {
                return Some(tags);
            }
        }
    }

    let trimmed_start = stem.trim_start();
    if trimmed_start.starts_with(prefix) {
        let without_prefix = &trimmed_start[prefix.len()..];
        if let Some(idx) = without_prefix.find(suffix) {
            let tags = split_block(&without_prefix[..idx]);
            if !tags.is_empty() {
                return Some(tags);
            }
        }
    }

    None
}

/// Strip all tag blocks from a stem across every candidate grammar, sweeping
/// repeatedly until a pass makes no change or `MAX_STRIP_ITERATIONS` is hit.
pub fn strip(stem: &str, grammars: &[TagGrammar]) -> String {
    let mut current = stem.to_string();

    for _ in 0..MAX_STRIP_ITERATIONS {
        let mut changed = false;

        for grammar in grammars {
            let (prefix, suffix, _) = grammar.delimiters();
            if prefix.is_empty() || suffix.is_empty() {
                continue;
            }

            while let Some(next) = peel_one_suffix_block(&current, prefix, suffix) {
                current = next;
                changed = true;
            }
            while let Some(next) = peel_one_prefix_block(&current, prefix, suffix) {
                current = next;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    current.trim().to_string()
}

fn peel_one_suffix_block(stem: &str, prefix: &str, suffix: &str) -> Option<String> {
    let trimmed = stem.trim_end();
    if !trimmed.ends_with(suffix) {
        return None;
    }
    let without_suffix = &trimmed[..trimmed.len() - suffix.len()];
    let idx = without_suffix.rfind(prefix)?;
    let interior = &without_suffix[idx + prefix.len()..];
    if interior.contains(prefix) || interior.contains(suffix) {
        return None;
    }
    Some(without_suffix[..idx].trim_end().to_string())
}

fn peel_one_prefix_block(stem: &str, prefix: &str, suffix: &str) -> Option<String> {
    let trimmed = stem.trim_start();
    if !trimmed.starts_with(prefix) {
        return None;
    }
    let without_prefix = &trimmed[prefix.len()..];
    let idx = without_prefix.find(suffix)?;
    let interior = &without_prefix[..idx];
    if interior.contains(prefix) || interior.contains(suffix) {
        return None;
    }
    Some(without_prefix[idx + suffix.len()..].trim_start().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_grammar() -> TagGrammar {
        TagGrammar::default()
    }

    #[test]
    fn encode_combined_suffix() {
        let g = default_grammar();
        let result = encode("report.pdf", &["draft".to_string(), "2025".to_string()], &g);
        assert_eq!(result, "report [draft, 2025].pdf");
    }

    #[test]
    fn decode_combined_suffix() {
        let g = default_grammar();
        let tags = decode("report [draft, 2025].pdf", &g);
        assert_eq!(tags, vec!["draft".to_string(), "2025".to_string()]);
    }

    #[test]
    fn encode_empty_tags_strips_existing_block() {
        let g = default_grammar();
        let result = encode("report [draft].pdf", &[], &g);
        assert_eq!(result, "report.pdf");
    }

    #[test]
    fn encode_individual_prefix_no_spaces() {
        let mut g = default_grammar();
        g.position = TagPosition::Prefix;
        g.grouping = TagGrouping::Individual;
        g.add_spaces = false;
        g.format = TagFormat::Parentheses;
        let result = encode("photo.jpg", &["sunset".to_string()], &g);
        assert_eq!(result, "(sunset)photo.jpg");
    }

    #[test]
    fn decode_individual_prefix() {
        let mut g = default_grammar();
        g.position = TagPosition::Prefix;
        g.grouping = TagGrouping::Individual;
        g.format = TagFormat::Parentheses;
        let tags = decode("(sunset) photo.jpg", &g);
        assert_eq!(tags, vec!["sunset".to_string()]);
    }

    #[test]
    fn strip_is_idempotent() {
        let g = default_grammar();
        let known = candidate_grammars(&g);
        let once = strip("report [draft, 2025].pdf", &known);
        let twice = strip(&once, &known);
        assert_eq!(once, twice);
    }

    #[test]
    fn sanitize_replaces_illegal_characters() {
        let sanitized = sanitize_tag_name("a<b>c:d\"e|f?g*h");
        assert!(!sanitized.contains(['<', '>', ':', '"', '|', '?', '*']));
    }

    #[test]
    fn sanitize_empty_becomes_underscore() {
        assert_eq!(sanitize_tag_name("   ..  "), "_");
    }
}
