//! Rewrites fenced code blocks in tutorial markdown so that a notebook
//! converter turns them into runnable cells.
//!
//! The rewrite is a single left-to-right pass with one line of lookahead:
//! a recognised opening fence is held until the next line shows whether the
//! block has a body to merge with.

mod fence;
mod line;
mod rules;
mod state;

pub use fence::{classify_tag, detect_fence_start, extract_target_file, is_closing_fence, Fence};
pub use line::{read_lines, split_lines, LineRecord};
pub use rules::{BlockKind, RewriteRules};

use state::Scanner;
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

/// A block that was rewritten, located by its opening fence (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenBlock {
    pub kind: BlockKind,
    pub line: usize,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub blocks: Vec<RewrittenBlock>,
}

impl RewriteOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Files the rewritten document will write when its cells run.
    pub fn written_files(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| block.target.as_deref())
    }
}

pub fn rewrite_str(input: &str, rules: &RewriteRules) -> RewriteOutcome {
    rewrite_lines(&split_lines(input), rules, input.len())
}

pub fn rewrite_from_reader<R: Read>(
    reader: &mut BufReader<R>,
    rules: &RewriteRules,
) -> io::Result<RewriteOutcome> {
    let lines = read_lines(reader)?;
    let capacity = lines.last().map(|line| line.end).unwrap_or(0);
    Ok(rewrite_lines(&lines, rules, capacity))
}

pub fn rewrite_from_path(path: &Path, rules: &RewriteRules) -> io::Result<RewriteOutcome> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    rewrite_from_reader(&mut reader, rules)
}

fn rewrite_lines(lines: &[LineRecord], rules: &RewriteRules, capacity: usize) -> RewriteOutcome {
    let mut scanner = Scanner::new(rules, capacity + capacity / 8);
    for (idx, line) in lines.iter().enumerate() {
        scanner.push(line, idx + 1);
    }
    scanner.finish()
}
