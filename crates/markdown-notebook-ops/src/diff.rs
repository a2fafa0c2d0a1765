use similar::TextDiff;

/// Unified diff between a chapter and its rewritten form, or `None` when the
/// rewrite changed nothing.
pub fn build_unified_diff(original: &str, modified: &str, path: &str) -> Option<String> {
    if original == modified {
        return None;
    }

    let diff = TextDiff::from_lines(original, modified);
    let header_old = format!("a/{path}");
    let header_new = format!("b/{path}");

    Some(
        diff.unified_diff()
            .header(&header_old, &header_new)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_for_identical_content() {
        assert!(build_unified_diff("abc", "abc", "01-intro.md").is_none());
    }

    #[test]
    fn shows_retagged_fence() {
        let diff =
            build_unified_diff("```bash\nls\n```\n", "```python\n!ls\n```\n", "01-intro.md")
                .unwrap();
        assert!(diff.contains("--- a/01-intro.md"));
        assert!(diff.contains("-```bash"));
        assert!(diff.contains("+```python"));
        assert!(diff.contains("+!ls"));
    }
}
