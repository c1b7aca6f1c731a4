/// Columns a tab advances to: the next multiple of this.
pub const TAB_STOP: usize = 8;

/// Column reached after writing `text` starting at `column`.
pub fn advance(column: usize, text: &str) -> usize {
    text.chars().fold(column, |column, c| match c {
        '\t' => (column / TAB_STOP + 1) * TAB_STOP,
        _ => column + 1,
    })
}

/// Word-wraps a stream of tokens into lines of at most `max_width` columns.
///
/// Every line starts with `indent`. A token that does not fit on the current
/// line starts a new one, unless it would be the first token on the line, in
/// which case it is written anyway. Trailing spaces are dropped at every line
/// break.
pub struct LineWrapper<'a> {
    out: &'a mut String,
    max_width: usize,
    indent: &'a str,
    indent_width: usize,
    column: usize,
}

impl<'a> LineWrapper<'a> {
    pub fn new(out: &'a mut String, max_width: usize, indent: &'a str) -> Self {
        Self {
            out,
            max_width,
            indent,
            indent_width: advance(0, indent),
            column: 0,
        }
    }

    pub fn write(&mut self, token: &str) {
        if self.column > self.indent_width && advance(self.column, token) > self.max_width {
            self.end_line();
        }
        if self.column == 0 {
            self.out.push_str(self.indent);
            self.column = self.indent_width;
        }
        self.out.push_str(token);
        self.column = advance(self.column, token);
    }

    /// Terminate the open line, if any.
    pub fn flush(&mut self) {
        if self.column > 0 {
            self.end_line();
        }
    }

    fn end_line(&mut self) {
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
        self.out.push('\n');
        self.column = 0;
    }
}
