use std::io::{self, BufRead};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub text: String,
    pub ending: &'static str,
    pub start: usize,
    pub end: usize,
}

impl LineRecord {
    pub fn push_into(&self, output: &mut String) {
        output.push_str(&self.text);
        output.push_str(self.ending);
    }
}

pub fn read_lines<R: BufRead>(reader: &mut R) -> io::Result<Vec<LineRecord>> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(split_lines(&contents))
}

/// Split `input` into lines, remembering each terminator so the text can be
/// reassembled byte for byte.
pub fn split_lines(input: &str) -> Vec<LineRecord> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for raw in input.split_inclusive('\n') {
        let (text, ending) = if let Some(stripped) = raw.strip_suffix("\r\n") {
            (stripped, "\r\n")
        } else if let Some(stripped) = raw.strip_suffix('\n') {
            (stripped, "\n")
        } else {
            (raw, "")
        };

        lines.push(LineRecord {
            text: text.to_string(),
            ending,
            start: offset,
            end: offset + raw.len(),
        });

        offset += raw.len();
    }

    lines
}
