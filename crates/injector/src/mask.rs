/// Byte ranges of a Java source that are comments or literals rather than code.
///
/// Used to reject regex matches that begin inside a comment or a string, so a
/// commented-out declaration is never rewritten.
#[derive(Debug, Default, Clone)]
pub struct CodeMask {
    /// Sorted, non-overlapping `[start, end)` ranges
    masked: Vec<(usize, usize)>,
}

impl CodeMask {
    pub fn scan(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut masked = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            let start = pos;
            let end = match bytes[pos] {
                b'/' if bytes.get(pos + 1) == Some(&b'/') => line_end(bytes, pos),
                b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                    find(bytes, pos + 2, b"*/").map_or(bytes.len(), |at| at + 2)
                }
                b'"' if bytes[pos..].starts_with(b"\"\"\"") => {
                    text_block_end(bytes, pos + 3)
                }
                b'"' => quoted_end(bytes, pos + 1, b'"'),
                b'\'' => quoted_end(bytes, pos + 1, b'\''),
                _ => {
                    pos += 1;
                    continue;
                }
            };
            masked.push((start, end));
            pos = end;
        }

        Self { masked }
    }

    pub fn is_code(&self, offset: usize) -> bool {
        let idx = self.masked.partition_point(|&(_, end)| end <= offset);
        self.masked
            .get(idx)
            .map_or(true, |&(start, _)| offset < start)
    }
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |at| from + at)
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| from + at)
}

/// End of a `'...'` or `"..."` literal; an unterminated one stops at the newline.
fn quoted_end(bytes: &[u8], mut pos: usize, quote: u8) -> usize {
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => return pos,
            b if b == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn text_block_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() {
        if bytes[pos] == b'\\' {
            pos += 2;
        } else if bytes[pos..].starts_with(b"\"\"\"") {
            return pos + 3;
        } else {
            pos += 1;
        }
    }
    bytes.len()
}
