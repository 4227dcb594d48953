//! Greedy fixed-width line layout shared by every artifact format.

/// Wrap width for PDF bodies, in characters.
pub const PDF_WRAP_WIDTH: usize = 80;
/// Wrap width for PNG bodies, in characters.
pub const IMAGE_WRAP_WIDTH: usize = 42;

/// A body line and its distance below the top of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub text: String,
    pub offset: u32,
}

/// Laid-out poem body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub lines: Vec<PlacedLine>,
    /// Total vertical advance consumed by the body
    pub height: u32,
}

/// Greedily pack the words of one line into lines shorter than `width`
/// characters. A single word longer than the width gets a line of its own.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let candidate_len = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if candidate_len < width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = candidate_len;
        } else {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        wrapped.push(current);
    }

    wrapped
}

/// Lay out a poem: every wrapped line advances by `line_height`, every blank
/// input line by half of it.
pub fn layout_poem(poem: &str, width: usize, line_height: u32) -> Layout {
    let mut lines = Vec::new();
    let mut offset = 0;

    for line in poem.split('\n') {
        if line.trim().is_empty() {
            offset += line_height / 2;
            continue;
        }
        for text in wrap_line(line, width) {
            lines.push(PlacedLine { text, offset });
            offset += line_height;
        }
    }

    Layout {
        lines,
        height: offset,
    }
}
