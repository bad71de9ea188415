// 🔤 Tuple Lexer - VALUES clause → rows of raw fields
// Character-level state machine, no SQL grammar involved.
//
// Input is the text between `VALUES` and the statement terminator:
//   (1, 'a,b', NULL), (2, 'it\'s', f(3))
//
// Output keeps field text verbatim (quotes, escapes, whitespace).
// Trimming and NULL/quote normalization belong to the row extractor.

// ============================================================================
// TYPES
// ============================================================================

/// One lexed tuple: raw field texts in column order
pub type Row = Vec<String>;

/// Scanner state for a single pass over a VALUES clause
#[derive(Debug, Default)]
struct LexerState {
    in_string: bool,
    escape_pending: bool,
    depth: usize,
    field: String,
    row: Row,
    rows: Vec<Row>,
}

impl LexerState {
    fn push_char(&mut self, c: char) {
        self.field.push(c);
    }

    /// Comma at depth 1: the field is kept even when blank
    fn finish_field(&mut self) {
        self.row.push(std::mem::take(&mut self.field));
    }

    /// Closing paren back to depth 0: blank trailing field is dropped,
    /// empty rows are dropped
    fn finish_row(&mut self) {
        let field = std::mem::take(&mut self.field);
        if !field.trim().is_empty() {
            self.row.push(field);
        }

        let row = std::mem::take(&mut self.row);
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    fn step(&mut self, c: char) {
        // Rule 1: escaped char is taken verbatim before anything else
        if self.escape_pending {
            self.push_char(c);
            self.escape_pending = false;
            return;
        }

        // Rule 2: the backslash itself stays in the field text
        if c == '\\' {
            self.escape_pending = true;
            self.push_char(c);
            return;
        }

        // Rule 3
        if c == '\'' {
            self.in_string = !self.in_string;
            self.push_char(c);
            return;
        }

        // Rule 4: no structure inside literals
        if self.in_string {
            self.push_char(c);
            return;
        }

        match c {
            '(' => {
                self.depth += 1;
                if self.depth > 1 {
                    self.push_char(c);
                }
            }
            ')' => {
                if self.depth == 0 {
                    // stray closer between tuples
                    return;
                }
                self.depth -= 1;
                if self.depth == 0 {
                    self.finish_row();
                } else {
                    self.push_char(c);
                }
            }
            ',' if self.depth == 1 => self.finish_field(),
            _ if self.depth > 0 => self.push_char(c),
            // Between tuples: separators and whitespace
            _ => {}
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Split a VALUES clause into rows of raw field strings
///
/// Never fails: unbalanced input returns only the rows that were closed
/// before the text ran out.
///
/// # Example
/// ```
/// use seed_audit::lexer::lex_values;
///
/// let rows = lex_values("(1, 'a,b'), (2, NULL)");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0][1].trim(), "'a,b'");
/// ```
pub fn lex_values(values: &str) -> Vec<Row> {
    let mut state = LexerState::default();

    for c in values.chars() {
        state.step(c);
    }

    if state.depth > 0 {
        tracing::debug!(
            depth = state.depth,
            "VALUES clause ended inside an open tuple; partial row dropped"
        );
    }

    state.rows
}

// ============================================================================
// TESTS
// ============================================================================
