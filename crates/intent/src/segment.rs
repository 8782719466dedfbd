use crate::error::{IntentError, Result};
use crate::markdown;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One discrete unit of declared intent (a requirement or a plan step).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// `<PREFIX>-<NNN>`, assigned in document order
    pub id: String,
    /// First contributing line (1-indexed)
    pub line_start: usize,
    /// Last contributing line (1-indexed, inclusive)
    pub line_end: usize,
    pub text: String,
}

/// Recognizes a line that opens a new item the way `N. ` does.
pub type ItemMatcher = fn(&str) -> bool;

/// Produces the stored text for a line that opened an item.
pub type PrefixStripper = fn(&str) -> String;

/// Deterministic splitter of a Markdown-ish document into [`Item`]s.
///
/// Headings, blank lines and thematic breaks only end the current item.
/// List items swallow their indented continuation (including indented
/// fenced blocks), and top-level fenced blocks attach to whatever item is
/// open at the time.
#[derive(Clone)]
pub struct Segmenter {
    id_prefix: String,
    is_item_start: ItemMatcher,
    strip_prefix: PrefixStripper,
}

impl Segmenter {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            is_item_start: markdown::is_numbered_item,
            strip_prefix: markdown::strip_list_prefix,
        }
    }

    /// Replaces the ordered-list recognizer (e.g. to accept `Step 3:` headers).
    #[must_use]
    pub fn with_item_matcher(mut self, matcher: ItemMatcher) -> Self {
        self.is_item_start = matcher;
        self
    }

    #[must_use]
    pub fn with_prefix_stripper(mut self, stripper: PrefixStripper) -> Self {
        self.strip_prefix = stripper;
        self
    }

    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<Item>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| IntentError::read(path, err))?;
        let items = self.parse_reader(file).map_err(|err| match err {
            IntentError::Io(source) => IntentError::read(path, source),
            other => other,
        })?;
        log::debug!(
            "Segmented {} into {} {} items",
            path.display(),
            items.len(),
            self.id_prefix
        );
        Ok(items)
    }

    pub fn parse_reader(&self, reader: impl Read) -> Result<Vec<Item>> {
        let lines = BufReader::new(reader)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()?;
        Ok(self.segment(&lines))
    }

    pub fn segment_str(&self, text: &str) -> Vec<Item> {
        let lines: Vec<&str> = text.lines().collect();
        self.segment(&lines)
    }

    pub fn segment<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Item> {
        let mut scan = Scan::new(&self.id_prefix);
        let mut state = ScanState::Outside;
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx].as_ref();
            let line_no = idx + 1;
            idx += 1;

            if let ScanState::InFence(marker) = state {
                if markdown::is_closing_fence(line, marker) {
                    state = ScanState::Outside;
                }
                scan.pending.begin(line_no);
                scan.pending.push(line_no, Cow::Borrowed(line));
                continue;
            }

            if let Some(marker) = markdown::fence_marker(line) {
                scan.pending.begin(line_no);
                scan.pending.push(line_no, Cow::Borrowed(line));
                state = ScanState::InFence(marker);
                continue;
            }

            if markdown::is_heading(line) || markdown::is_blank(line) {
                scan.flush();
                continue;
            }

            let top_level = !markdown::is_indented(line);
            if top_level && ((self.is_item_start)(line) || markdown::is_bullet(line)) {
                scan.flush();
                scan.pending.begin(line_no);
                scan.pending
                    .push(line_no, Cow::Owned((self.strip_prefix)(line)));
                idx = consume_continuation(lines, idx, &mut scan.pending);
                scan.flush();
                continue;
            }

            if !top_level && markdown::is_bullet(line) {
                scan.pending.begin(line_no);
                scan.pending.push(line_no, Cow::Borrowed(line.trim()));
                continue;
            }

            if markdown::is_decorator(line) {
                scan.flush();
                continue;
            }

            scan.pending.begin(line_no);
            scan.pending.push(line_no, Cow::Borrowed(line));
        }

        scan.flush();
        scan.items
    }
}

impl fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segmenter")
            .field("id_prefix", &self.id_prefix)
            .finish_non_exhaustive()
    }
}

/// Where the scan currently is relative to fenced blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState<'a> {
    Outside,
    /// Inside a fenced block opened by this marker run.
    InFence(&'a str),
}

/// Lines of the item being assembled. The buffer is reused across items.
struct Pending<'a> {
    open: bool,
    line_start: usize,
    line_end: usize,
    lines: Vec<Cow<'a, str>>,
}

impl<'a> Pending<'a> {
    fn new() -> Self {
        Self {
            open: false,
            line_start: 0,
            line_end: 0,
            lines: Vec::new(),
        }
    }

    /// Opens an item at `line_no` unless one is already open.
    fn begin(&mut self, line_no: usize) {
        if !self.open {
            self.open = true;
            self.line_start = line_no;
            self.line_end = line_no;
        }
    }

    fn push(&mut self, line_no: usize, text: Cow<'a, str>) {
        self.lines.push(text);
        self.line_end = self.line_end.max(line_no);
    }

    /// Closes the open item, returning its line span and trimmed text.
    fn take(&mut self) -> Option<(usize, usize, String)> {
        if !self.open {
            return None;
        }
        self.open = false;
        let text = self.lines.join("\n").trim().to_string();
        self.lines.clear();
        Some((self.line_start, self.line_end, text))
    }
}

struct Scan<'p, 'a> {
    id_prefix: &'p str,
    counter: usize,
    items: Vec<Item>,
    pending: Pending<'a>,
}

impl<'p, 'a> Scan<'p, 'a> {
    fn new(id_prefix: &'p str) -> Self {
        Self {
            id_prefix,
            counter: 0,
            items: Vec::new(),
            pending: Pending::new(),
        }
    }

    fn flush(&mut self) {
        let Some((line_start, line_end, text)) = self.pending.take() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        self.counter += 1;
        self.items.push(Item {
            id: format!("{}-{:03}", self.id_prefix, self.counter),
            line_start,
            line_end,
            text,
        });
    }
}

/// Consumes the indented continuation of a list item starting at `idx`.
///
/// Stops at the first blank or non-indented line outside a fence. A fence
/// is only recognized here when indented; once open, every line up to its
/// closer belongs to the item. Returns the index of the first unconsumed line.
fn consume_continuation<'a, S: AsRef<str>>(
    lines: &'a [S],
    mut idx: usize,
    pending: &mut Pending<'a>,
) -> usize {
    let mut state = ScanState::Outside;
    while idx < lines.len() {
        let line = lines[idx].as_ref();
        let line_no = idx + 1;

        match state {
            ScanState::InFence(marker) => {
                if markdown::is_closing_fence(line, marker) {
                    state = ScanState::Outside;
                }
                pending.push(line_no, Cow::Borrowed(line));
            }
            ScanState::Outside => {
                if !markdown::is_indented(line) || markdown::is_blank(line) {
                    break;
                }
                match markdown::fence_marker(line) {
                    Some(marker) => {
                        state = ScanState::InFence(marker);
                        pending.push(line_no, Cow::Borrowed(line));
                    }
                    None => pending.push(line_no, Cow::Borrowed(line.trim())),
                }
            }
        }
        idx += 1;
    }
    idx
}
