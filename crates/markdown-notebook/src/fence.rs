use crate::rules::{BlockKind, RewriteRules};

/// Opening fence of a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    pub indent: String,
    pub marker: char,
    pub len: usize,
    pub info: String,
}

impl Fence {
    /// Language tag: the first word of the info string.
    pub fn tag(&self) -> Option<&str> {
        self.info.split_whitespace().next()
    }

    /// Render this fence with its info string replaced by `tag`.
    pub fn retagged(&self, tag: &str) -> String {
        let mut line = String::with_capacity(self.indent.len() + self.len + tag.len());
        line.push_str(&self.indent);
        for _ in 0..self.len {
            line.push(self.marker);
        }
        line.push_str(tag);
        line
    }
}

pub fn detect_fence_start(line: &str) -> Option<Fence> {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return None;
    }

    let mut chars = rest.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let mut count = 1usize;
    for ch in chars {
        if ch == first {
            count += 1;
        } else {
            break;
        }
    }

    if count < 3 {
        return None;
    }

    // Marker chars are ASCII, so `count` is also the byte length of the run.
    let info = rest[count..].trim();
    if first == '`' && info.contains('`') {
        return None;
    }

    Some(Fence {
        indent: line[..line.len() - rest.len()].to_string(),
        marker: first,
        len: count,
        info: info.to_string(),
    })
}

pub fn is_closing_fence(line: &str, fence: &Fence) -> bool {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return false;
    }

    let trimmed = rest.trim_end();
    let mut count = 0usize;
    for ch in trimmed.chars() {
        if ch == fence.marker {
            count += 1;
        } else {
            return false;
        }
    }

    count >= fence.len
}

/// Map a fence info string to the kind of rewrite it asks for.
pub fn classify_tag(info: &str, rules: &RewriteRules) -> Option<BlockKind> {
    let tag = info.split_whitespace().next()?;
    let matches = |tags: &[String]| tags.iter().any(|candidate| candidate == tag);

    if matches(&rules.shell_tags) {
        Some(BlockKind::Shell)
    } else if matches(&rules.source_tags) {
        Some(BlockKind::Source)
    } else if matches(&rules.build_tags) {
        Some(BlockKind::Build)
    } else {
        None
    }
}

/// Return the file named by a comment line such as `// foo.cpp`.
///
/// The comment must hold exactly one word after the prefix; prose comments
/// are not treated as file names.
pub fn extract_target_file<'a>(line: &'a str, comment_prefix: &str) -> Option<&'a str> {
    let body = line.trim().strip_prefix(comment_prefix)?.trim();
    if body.is_empty() || body.contains(char::is_whitespace) {
        return None;
    }
    Some(body)
}

fn split_indent(line: &str) -> (usize, &str) {
    let mut width = 0usize;
    let mut byte_index = 0usize;

    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => {
                width += 1;
                byte_index = idx + ch.len_utf8();
            }
            '\t' => {
                width += 4;
                byte_index = idx + ch.len_utf8();
            }
            _ => {
                byte_index = idx;
                break;
            }
        }
    }

    if byte_index == 0 {
        (width, line)
    } else {
        (width, &line[byte_index..])
    }
}
