use crate::fence::{classify_tag, detect_fence_start, extract_target_file, is_closing_fence, Fence};
use crate::line::LineRecord;
use crate::rules::{BlockKind, RewriteRules};
use crate::{RewriteOutcome, RewrittenBlock};

enum ScanState {
    Prose,
    /// A recognised fence waiting for its first body line.
    Pending {
        fence: Fence,
        kind: BlockKind,
        line: LineRecord,
        number: usize,
    },
    /// Inside a rewritten shell block; body lines get the marker.
    Shell { fence: Fence },
    /// Inside any other block; lines pass through until it closes.
    Verbatim { fence: Fence },
}

pub struct Scanner<'r> {
    rules: &'r RewriteRules,
    state: ScanState,
    output: String,
    blocks: Vec<RewrittenBlock>,
}

impl<'r> Scanner<'r> {
    pub fn new(rules: &'r RewriteRules, capacity: usize) -> Self {
        Self {
            rules,
            state: ScanState::Prose,
            output: String::with_capacity(capacity),
            blocks: Vec::new(),
        }
    }

    /// Feed one line; `number` is its 1-based position in the document.
    pub fn push(&mut self, line: &LineRecord, number: usize) {
        let state = std::mem::replace(&mut self.state, ScanState::Prose);
        self.state = match state {
            ScanState::Prose => self.open(line, number),
            ScanState::Pending {
                fence,
                kind,
                line: held,
                number: fence_number,
            } => self.resolve(fence, kind, held, fence_number, line),
            ScanState::Shell { fence } => {
                if is_closing_fence(&line.text, &fence) {
                    line.push_into(&mut self.output);
                    ScanState::Prose
                } else {
                    self.output.push_str(&self.rules.shell_marker);
                    line.push_into(&mut self.output);
                    ScanState::Shell { fence }
                }
            }
            ScanState::Verbatim { fence } => {
                line.push_into(&mut self.output);
                if is_closing_fence(&line.text, &fence) {
                    ScanState::Prose
                } else {
                    ScanState::Verbatim { fence }
                }
            }
        };
    }

    pub fn finish(mut self) -> RewriteOutcome {
        // A recognised fence on the last line has no body to merge with.
        if let ScanState::Pending { line, .. } = &self.state {
            line.push_into(&mut self.output);
        }
        RewriteOutcome {
            text: self.output,
            blocks: self.blocks,
        }
    }

    fn open(&mut self, line: &LineRecord, number: usize) -> ScanState {
        let Some(fence) = detect_fence_start(&line.text) else {
            line.push_into(&mut self.output);
            return ScanState::Prose;
        };

        match classify_tag(&fence.info, self.rules) {
            Some(kind) => ScanState::Pending {
                fence,
                kind,
                line: line.clone(),
                number,
            },
            None => {
                line.push_into(&mut self.output);
                ScanState::Verbatim { fence }
            }
        }
    }

    fn resolve(
        &mut self,
        fence: Fence,
        kind: BlockKind,
        held: LineRecord,
        fence_number: usize,
        line: &LineRecord,
    ) -> ScanState {
        if is_closing_fence(&line.text, &fence) {
            held.push_into(&mut self.output);
            line.push_into(&mut self.output);
            return ScanState::Prose;
        }

        match kind {
            BlockKind::Shell => {
                self.emit_retagged(&fence, &held);
                self.output.push_str(&self.rules.shell_marker);
                line.push_into(&mut self.output);
                self.record(kind, fence_number, None);
                ScanState::Shell { fence }
            }
            BlockKind::Source => {
                match extract_target_file(&line.text, &self.rules.comment_prefix) {
                    Some(file) => {
                        let directive = self.rules.write_line(file);
                        self.emit_retagged(&fence, &held);
                        self.output.push_str(&directive);
                        self.output.push_str(line.ending);
                        self.record(kind, fence_number, Some(file.to_string()));
                    }
                    None => {
                        log::debug!(
                            "line {fence_number}: {} block has no file comment, left as is",
                            fence.tag().unwrap_or_default()
                        );
                        held.push_into(&mut self.output);
                        line.push_into(&mut self.output);
                    }
                }
                ScanState::Verbatim { fence }
            }
            BlockKind::Build => {
                let directive = self.rules.write_line(&self.rules.build_file);
                self.emit_retagged(&fence, &held);
                self.output.push_str(&directive);
                self.output.push_str(held.ending);
                line.push_into(&mut self.output);
                self.record(kind, fence_number, Some(self.rules.build_file.clone()));
                ScanState::Verbatim { fence }
            }
        }
    }

    fn emit_retagged(&mut self, fence: &Fence, held: &LineRecord) {
        self.output.push_str(&fence.retagged(&self.rules.script_tag));
        self.output.push_str(held.ending);
    }

    fn record(&mut self, kind: BlockKind, line: usize, target: Option<String>) {
        self.blocks.push(RewrittenBlock { kind, line, target });
    }
}
