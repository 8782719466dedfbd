//! Line classifiers for the Markdown subset intent documents are written in.
//!
//! Each classifier looks at a single raw line. None of them keep state; the
//! segmenter owns the only state (the open fence marker).

const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "• "];
const DECORATOR_CHARS: [char; 6] = ['-', '=', '*', '_', '⸻', '—'];

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

/// Returns the fence marker run (three or more backticks or tildes) when the
/// line opens or closes a fenced block. Four or more leading spaces make an
/// indented code block instead, so those never count.
pub fn fence_marker(line: &str) -> Option<&str> {
    let leading = leading_spaces(line);
    if leading >= 4 {
        return None;
    }
    let stripped = &line[leading..];
    let marker = stripped.bytes().next().filter(|b| *b == b'`' || *b == b'~')?;
    let run = stripped.bytes().take_while(|b| *b == marker).count();
    (run >= 3).then(|| &stripped[..run])
}

/// A closing fence uses the opener's character, is at least as long, and
/// carries nothing but spaces after the marker run.
pub fn is_closing_fence(line: &str, open_marker: &str) -> bool {
    let Some(open_char) = open_marker.bytes().next() else {
        return false;
    };
    let Some(marker) = fence_marker(line) else {
        return false;
    };
    if marker.as_bytes()[0] != open_char || marker.len() < open_marker.len() {
        return false;
    }
    let rest = &line[leading_spaces(line) + marker.len()..];
    rest.trim_start_matches(' ').is_empty()
}

/// ATX heading: up to three leading spaces, one to six `#`, then a space.
pub fn is_heading(line: &str) -> bool {
    if leading_spaces(line) >= 4 {
        return false;
    }
    let trimmed = line.trim();
    match trimmed.find(|c: char| c != '#') {
        Some(hashes) => (1..=6).contains(&hashes) && trimmed.as_bytes()[hashes] == b' ',
        None => false,
    }
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Two leading spaces or a tab.
pub fn is_indented(line: &str) -> bool {
    line.starts_with("  ") || line.starts_with('\t')
}

pub fn is_bullet(line: &str) -> bool {
    let trimmed = line.trim();
    BULLET_MARKERS
        .iter()
        .any(|marker| trimmed.starts_with(marker))
}

/// Thematic break such as `---`, `***` or `⸻⸻⸻`: one repeated separator
/// character, at least three times.
pub fn is_decorator(line: &str) -> bool {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !DECORATOR_CHARS.contains(&first) {
        return false;
    }
    let mut count = 1;
    for ch in chars {
        if ch != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Byte offset just past the `N.` / `N)` marker of an ordered list line,
/// provided the marker is followed by a space.
fn numbered_marker_end(trimmed: &str) -> Option<usize> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let bytes = trimmed.as_bytes();
    match (bytes.get(digits), bytes.get(digits + 1)) {
        (Some(b'.' | b')'), Some(b' ')) => Some(digits + 1),
        _ => None,
    }
}

/// Ordered list item: digits, then `.` or `)`, then a space.
pub fn is_numbered_item(line: &str) -> bool {
    numbered_marker_end(line.trim()).is_some()
}

/// Removes an ordered or bullet list marker and surrounding whitespace.
pub fn strip_list_prefix(line: &str) -> String {
    let trimmed = line.trim();
    if let Some(end) = numbered_marker_end(trimmed) {
        return trimmed[end..].trim().to_string();
    }
    for marker in BULLET_MARKERS {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}
