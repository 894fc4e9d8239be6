use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::hook::Record;

const MESSAGE_KEY: &str = "msg";

/// Render a record as a single `key=value` line for the event log.
///
/// The event log stamps each entry with its own time and type, so the
/// timestamp and level are left out. The message comes first, followed by the
/// fields sorted by name.
pub fn render(record: &Record) -> Result<String, fmt::Error> {
    let mut output = String::new();

    let message = record.message.strip_suffix('\n').unwrap_or(&record.message);
    if !message.is_empty() {
        append_pair(&mut output, MESSAGE_KEY, message)?;
    }

    let mut fields: Vec<(Cow<'_, str>, String)> = record
        .fields
        .iter()
        .map(|(key, value)| {
            // An existing `fields.msg` is kept as is, so both pairs are written.
            let key = if key == MESSAGE_KEY {
                Cow::Owned(format!("fields.{}", key))
            } else {
                Cow::Borrowed(key)
            };
            (key, value.to_string())
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, value) in &fields {
        append_pair(&mut output, key, value)?;
    }

    Ok(output)
}

fn append_pair(output: &mut String, key: &str, value: &str) -> fmt::Result {
    if !output.is_empty() {
        output.push(' ');
    }
    if needs_quoting(value) {
        write!(output, "{}={:?}", key, value)
    } else {
        write!(output, "{}={}", key, value)
    }
}

fn needs_quoting(text: &str) -> bool {
    !text
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;

    #[test]
    fn test_render_without_timestamp_or_level() {
        let record = Record::new(Severity::Error, "Errors happened!")
            .with_field("func", "DoSomething")
            .with_field("server", "localhost")
            .with_field("tag", "development");

        assert_eq!(
            render(&record).unwrap(),
            r#"msg="Errors happened!" func=DoSomething server=localhost tag=development"#
        );
    }

    #[test]
    fn test_render_quotes_values() {
        let record = Record::new(Severity::Info, "started")
            .with_field("path", "C:\\Program Files\\app")
            .with_field("port", 8080)
            .with_field("ratio", 0.5)
            .with_field("empty", "");

        assert_eq!(
            render(&record).unwrap(),
            r#"msg=started empty= path="C:\\Program Files\\app" port=8080 ratio=0.5"#
        );
    }

    #[test]
    fn test_render_message_clash_and_empty_message() {
        let record = Record::new(Severity::Warn, "")
            .with_field("msg", "shadowed")
            .with_field("a", "first");

        assert_eq!(render(&record).unwrap(), "a=first fields.msg=shadowed");
    }

    #[test]
    fn test_render_keeps_both_message_fields() {
        let record = Record::new(Severity::Info, "hi")
            .with_field("msg", "renamed")
            .with_field("fields.msg", "original");

        assert_eq!(
            render(&record).unwrap(),
            "msg=hi fields.msg=original fields.msg=renamed"
        );
    }

    #[test]
    fn test_render_trims_trailing_newline() {
        let record = Record::new(Severity::Info, "line\n");
        assert_eq!(render(&record).unwrap(), "msg=line");
    }

    #[test]
    fn test_needs_quoting() {
        assert!(!needs_quoting("DoSomething"));
        assert!(!needs_quoting("a-b.c_d/e@f^g+h"));
        assert!(!needs_quoting(""));
        assert!(needs_quoting("two words"));
        assert!(needs_quoting("key=value"));
        assert!(needs_quoting("\"quoted\""));
    }
}
