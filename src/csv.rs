//! Question-bank parser for comma-separated text.
//!
//! The bank is a delimited blob with a header row naming the columns
//! `question, optionA..optionD, answer, feedback`; column order in the file
//! is free because lookup goes by header name. Quoting follows the usual
//! RFC 4180 conventions: a double-quoted field may contain commas and
//! newlines, and an embedded quote is escaped by doubling it.
//!
//! Malformed rows are policy-dropped, never reported: loading a bank cannot
//! fail, it can only yield fewer records.

/// Correct-option letter of a question, validated at parse time so an
/// out-of-domain letter can never become an out-of-range option index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
}

impl AnswerLabel {
    /// Parse a raw answer field. Normalizes case ("b" and "B" agree);
    /// anything but a single letter A-D yields `None`.
    pub fn parse(field: &str) -> Option<Self> {
        match field.trim().to_uppercase().as_str() {
            "A" => Some(AnswerLabel::A),
            "B" => Some(AnswerLabel::B),
            "C" => Some(AnswerLabel::C),
            "D" => Some(AnswerLabel::D),
            _ => None,
        }
    }

    /// Index into the four-element options array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }
}

/// One parsed question. Immutable once built; the session clones the ones
/// it draws from the pool.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionRecord {
    pub prompt: String,
    pub options: [String; 4],
    pub answer: AnswerLabel,
    pub feedback: String,
}

/// Parse a question bank. Never fails: empty or whitespace-only input and
/// banks whose every row is malformed both come back as an empty vector.
///
/// Row rejection rules (dropped silently):
/// - empty `question` or `answer` after trimming,
/// - `answer` not a single letter A-D after uppercasing.
///
/// Missing columns resolve to the empty string, so a bank without a
/// `feedback` column still loads.
pub fn parse(text: &str) -> Vec<QuestionRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut rows = split_rows(text);
    if rows.is_empty() {
        return Vec::new();
    }

    let header: Vec<String> = rows.remove(0).iter().map(|h| h.trim().to_string()).collect();
    let col = |name: &str| header.iter().position(|h| h == name);
    let q_col = col("question");
    let a_col = col("optionA");
    let b_col = col("optionB");
    let c_col = col("optionC");
    let d_col = col("optionD");
    let ans_col = col("answer");
    let fb_col = col("feedback");

    let mut records = Vec::new();
    for row in &rows {
        if row.is_empty() {
            continue;
        }
        let prompt = field(row, q_col);
        let answer_raw = field(row, ans_col);
        if prompt.is_empty() || answer_raw.is_empty() {
            continue;
        }
        let Some(answer) = AnswerLabel::parse(answer_raw) else {
            continue;
        };
        records.push(QuestionRecord {
            prompt: prompt.to_string(),
            options: [
                field(row, a_col).to_string(),
                field(row, b_col).to_string(),
                field(row, c_col).to_string(),
                field(row, d_col).to_string(),
            ],
            answer,
            feedback: field(row, fb_col).to_string(),
        });
    }
    records
}

/// Safe, trimmed cell access; absent column or short row reads as "".
fn field<'a>(row: &'a [String], col: Option<usize>) -> &'a str {
    col.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// Split raw text into rows of cells, honoring quoting. Row terminators are
/// `\n`, `\r\n`, or a bare `\r`; a line made only of empty cells is blank
/// padding and is not emitted. (CRLF falls out of the blank-line rule: the
/// `\r` closes the row and the following `\n` produces an empty one that is
/// dropped.)
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            // Doubled quote inside a quoted cell is a literal quote.
            if in_quotes && chars.peek() == Some(&'"') {
                cell.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
            continue;
        }
        if ch == ',' && !in_quotes {
            row.push(std::mem::take(&mut cell));
            continue;
        }
        if (ch == '\n' || ch == '\r') && !in_quotes {
            row.push(std::mem::take(&mut cell));
            flush_row(&mut rows, &mut row);
            continue;
        }
        cell.push(ch);
    }
    // Trailing partial row without a final terminator still counts.
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        flush_row(&mut rows, &mut row);
    }
    rows
}

fn flush_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>) {
    if row.iter().all(|c| c.is_empty()) {
        row.clear();
    } else {
        rows.push(std::mem::take(row));
    }
}
