//! Errors reported while tokenizing and parsing, and where they point.

use std::fmt;

use line_index::LineIndex;
use line_index::TextSize;
use line_index::WideEncoding;

/// A byte range of the source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte.
    start: usize,
    /// Byte offset one past the last byte.
    end: usize,
}

impl Span {
    /// Creates a span of `len` bytes starting at `start`.
    pub const fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    /// Returns the smallest span containing both spans.
    pub fn cover(self, other: Self) -> Self {
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        Self { start, end }
    }

    /// Gets the offset of the first byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Gets the offset one past the last byte.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Determines if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<logos::Span> for Span {
    fn from(value: logos::Span) -> Self {
        Self::new(value.start, value.len())
    }
}

/// A one-based line and column position in a source string.
///
/// Columns count Unicode scalar values, not bytes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Location {
    /// The one-based line number.
    pub line: u32,
    /// The one-based column number.
    pub column: u32,
}

impl Location {
    /// Creates a new location from one-based line and column numbers.
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Computes the location of the given byte offset.
    ///
    /// Offsets past the end of the source are clamped to the end.
    pub fn from_offset(index: &LineIndex, offset: usize) -> Self {
        let offset = u32::try_from(offset)
            .unwrap_or(u32::MAX)
            .min(u32::from(index.len()));
        let line_col = index.line_col(TextSize::from(offset));
        let column = index
            .to_wide(WideEncoding::Utf32, line_col)
            .map(|wide| wide.col)
            .unwrap_or(line_col.col);

        Self {
            line: line_col.line + 1,
            column: column + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{line}:{column}", line = self.line, column = self.column)
    }
}

/// The stage of processing that produced a diagnostic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub enum DiagnosticKind {
    /// A token could not be formed from the source text.
    Lex,
    /// A `<` could not be classified as either a template list start or a
    /// less-than operator before the end of input.
    Disambiguation,
    /// The token stream does not match the grammar.
    Syntax,
    /// The token stream does not match the grammar, but the parser
    /// resynchronized and continued past the error.
    RecoveredSyntax,
}

impl DiagnosticKind {
    /// Gets a short name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lex => "lex",
            Self::Disambiguation => "disambiguation",
            Self::Syntax => "syntax",
            Self::RecoveredSyntax => "recovered-syntax",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error found in a source string.
///
/// Every diagnostic is an error; a source with any diagnostic is not valid.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Diagnostic {
    /// The stage that reported it.
    kind: DiagnosticKind,
    /// One line describing what is wrong.
    message: String,
    /// A hint on how to correct the source.
    fix: Option<String>,
    /// Annotated source ranges; the first is the primary one.
    labels: Vec<Label>,
    /// Line and column of the primary label, set by `parse` and `tokenize`.
    location: Option<Location>,
}

impl Diagnostic {
    /// Creates a new syntax error with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            message: message.into(),
            fix: None,
            labels: Default::default(),
            location: None,
        }
    }

    /// Creates a new lexical error with the given message.
    pub fn lex_error(message: impl Into<String>) -> Self {
        Self::error(message).with_kind(DiagnosticKind::Lex)
    }

    /// Creates a new template disambiguation error with the given message.
    pub fn disambiguation_error(message: impl Into<String>) -> Self {
        Self::error(message).with_kind(DiagnosticKind::Disambiguation)
    }

    fn with_kind(mut self, kind: DiagnosticKind) -> Self {
        self.kind = kind;
        self
    }

    /// Marks a syntax error as one the parser resynchronized after.
    ///
    /// Lexical and disambiguation errors keep their kind.
    pub fn recovered(mut self) -> Self {
        if self.kind == DiagnosticKind::Syntax {
            self.kind = DiagnosticKind::RecoveredSyntax;
        }

        self
    }

    /// Attaches a hint on how to correct the source.
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// Adds a label without a message.
    pub fn with_highlight(mut self, span: impl Into<Span>) -> Self {
        self.labels.push(Label::new(String::new(), span.into()));
        self
    }

    /// Adds a label; the first one added is the primary label.
    pub fn with_label(mut self, message: impl Into<String>, span: impl Into<Span>) -> Self {
        self.labels.push(Label::new(message, span.into()));
        self
    }

    /// Gets the stage that reported the diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Gets the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the hint on how to correct the source, if any.
    pub fn fix(&self) -> Option<&str> {
        self.fix.as_deref()
    }

    /// Gets the labels, primary first.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Gets the span of the primary label, if there is one.
    pub fn span(&self) -> Option<Span> {
        self.labels.first().map(Label::span)
    }

    /// Gets the line and column of the primary label.
    ///
    /// Returns `None` for diagnostics that were not produced by
    /// [`parse`](crate::parse) or [`tokenize`](crate::tokenize).
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Sets the location of the primary label.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the location from the start of the primary label, or from the
    /// end of the source when there is no label.
    pub(crate) fn locate(&mut self, index: &LineIndex) {
        let offset = self
            .span()
            .map(|s| s.start())
            .unwrap_or_else(|| usize::from(index.len()));
        self.location = Some(Location::from_offset(index, offset));
    }

    /// Converts to a `codespan` [Diagnostic] for the given file.
    ///
    /// The kind becomes the diagnostic code and the fix becomes a note.
    ///
    /// [Diagnostic]: codespan_reporting::diagnostic::Diagnostic
    #[cfg(feature = "codespan")]
    pub fn to_codespan<FileId: Copy>(
        &self,
        file_id: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic as codespan;

        let mut diagnostic = codespan::Diagnostic::error();

        diagnostic.code = Some(self.kind.as_str().to_string());
        diagnostic.message.clone_from(&self.message);

        if let Some(fix) = &self.fix {
            diagnostic.notes.push(format!("fix: {fix}"));
        }

        if self.labels.is_empty() {
            // Out of range labels are drawn at the end of the file
            diagnostic.labels.push(codespan::Label::new(
                codespan::LabelStyle::Primary,
                file_id,
                usize::MAX - 1..usize::MAX,
            ))
        } else {
            for (i, label) in self.labels.iter().enumerate() {
                diagnostic.labels.push(
                    codespan::Label::new(
                        if i == 0 {
                            codespan::LabelStyle::Primary
                        } else {
                            codespan::LabelStyle::Secondary
                        },
                        file_id,
                        label.span.start..label.span.end,
                    )
                    .with_message(&label.message),
                );
            }
        }

        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{location}: {message}", message = self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A message attached to a range of the source.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Label {
    /// Empty for a bare highlight.
    message: String,
    /// The annotated range.
    span: Span,
}

impl Label {
    /// Creates a label.
    pub fn new(message: impl Into<String>, span: impl Into<Span>) -> Self {
        Self {
            message: message.into(),
            span: span.into(),
        }
    }

    /// Gets the message of the label.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the span of the label.
    pub fn span(&self) -> Span {
        self.span
    }
}
