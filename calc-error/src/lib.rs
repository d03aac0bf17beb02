//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages, along with the owned [`Diagnostic`] form that survives past the source text.

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::{fmt, ops::Range, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
///
/// Implementations are usually derived with `calc_attrs::ErrorKind`.
pub trait ErrorKind: fmt::Debug + Send + Sync {
    /// The message displayed at the top of the error.
    fn message(&self) -> String;

    /// The label text for each span of the error, in order.
    fn labels(&self) -> Vec<String>;

    /// Optional help text, describing what the user can do to fix the error.
    fn help(&self) -> Option<String> {
        None
    }

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<'a, (&'a str, Range<usize>)> {
        Diagnostic::from_parts(self.message(), self.labels(), self.help(), spans)
            .build_report(src_id)
    }
}

/// An error associated with regions of source code that can be highlighted.
#[derive(Debug, Clone)]
pub struct Error {
    /// The regions of the source code that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Arc<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Arc::new(kind) }
    }

    /// Creates a new error that does not point at any source code.
    pub fn spanless(kind: impl ErrorKind + 'static) -> Self {
        Self::new(Vec::new(), kind)
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<'a, (&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Converts this error into an owned [`Diagnostic`].
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::from_parts(self.kind.message(), self.kind.labels(), self.kind.help(), &self.spans)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.message())
    }
}

impl std::error::Error for Error {}

/// A label pointing at a region of the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticLabel {
    /// The region of the source code the label points at.
    pub span: Range<usize>,

    /// The text of the label. May be empty.
    pub message: String,
}

/// An owned, plain-data rendition of an [`Error`].
///
/// Unlike [`Error`], a diagnostic can be compared, cloned cheaply into values, and serialized
/// alongside the expression it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// The message displayed at the top of the error.
    pub message: String,

    /// Labels pointing into the source code.
    pub labels: Vec<DiagnosticLabel>,

    /// Optional help text.
    pub help: Option<String>,
}

impl Diagnostic {
    /// Pairs each span with the label text at the same index. Spans without a matching label get
    /// an empty label.
    fn from_parts(
        message: String,
        labels: Vec<String>,
        help: Option<String>,
        spans: &[Range<usize>],
    ) -> Self {
        let mut labels = labels.into_iter();
        let labels = spans
            .iter()
            .map(|span| DiagnosticLabel {
                span: span.clone(),
                message: labels.next().unwrap_or_default(),
            })
            .collect();

        Self { message, labels, help }
    }

    /// Builds a report for this diagnostic.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<'a, (&'a str, Range<usize>)> {
        let offset = self.labels.first().map_or(0, |label| label.span.start);
        let mut builder = Report::build(ReportKind::Error, src_id, offset)
            .with_message(&self.message)
            .with_labels(self.labels.iter().map(|label| {
                let mut out = Label::new((src_id, label.span.clone())).with_color(EXPR);
                if !label.message.is_empty() {
                    out = out.with_message(&label.message);
                }
                out
            }));

        if let Some(help) = &self.help {
            builder.set_help(help);
        }

        builder.finish()
    }

    /// Prints the report for this diagnostic to stderr, using `input` as the source text.
    pub fn report_to_stderr(&self, src_id: &str, input: &str) {
        // a report that fails to print has nowhere else to go
        let _ = self.build_report(src_id).eprint((src_id, Source::from(input)));
    }
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        err.to_diagnostic()
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        err.to_diagnostic()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
