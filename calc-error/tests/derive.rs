use ariadne::Source;
use calc_attrs::ErrorKind;
use calc_error::{Error, ErrorKind};
use pretty_assertions::assert_eq;

/// A variable was used before it was given a value.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unknown variable `{}`", name),
    labels = ["this variable", format!("defined as `{}` here", name)],
    help = if *suggest { "did you mean to create it first?" } else { "" },
)]
struct UnknownVariable {
    name: String,
    suggest: bool,
}

#[derive(Debug, ErrorKind)]
#[error(message = "unexpected end of input", labels = [""])]
struct UnexpectedEnd;

fn render(err: &Error, input: &str) -> String {
    let mut out = Vec::new();
    err.build_report("input")
        .write(("input", Source::from(input)), &mut out)
        .unwrap();
    String::from_utf8(strip_ansi_escapes::strip(out)).unwrap()
}

#[test]
fn derived_parts() {
    let kind = UnknownVariable { name: "x".to_string(), suggest: true };
    assert_eq!(kind.message(), "unknown variable `x`");
    assert_eq!(kind.labels(), vec!["this variable".to_string(), "defined as `x` here".to_string()]);
    assert_eq!(kind.help(), Some("did you mean to create it first?".to_string()));
}

#[test]
fn empty_help_is_none() {
    let kind = UnknownVariable { name: "x".to_string(), suggest: false };
    assert_eq!(kind.help(), None);
    assert_eq!(UnexpectedEnd.help(), None);
}

#[test]
fn rendered_report_mentions_message_and_label() {
    let err = Error::new(vec![4..5], UnknownVariable { name: "y".to_string(), suggest: false });
    let rendered = render(&err, "2 + y");
    assert!(rendered.contains("unknown variable `y`"));
    assert!(rendered.contains("this variable"));
}

#[test]
fn diagnostic_round_trips_message() {
    let err = Error::new(vec![0..0], UnexpectedEnd);
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.message, "unexpected end of input");
    assert_eq!(diagnostic.labels[0].message, "");
}
