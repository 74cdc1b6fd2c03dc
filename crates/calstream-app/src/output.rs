use std::io::{self, Write};

use calstream_core::config::OutputFormat;
use calstream_rfc::rfc::ical::core::{Component, Property};

const INDENT: &str = "  ";

/// Writes one top-level component in the requested format.
///
/// JSON output is one document per line.
///
/// ## Errors
/// Returns an error if writing to `out` fails.
pub fn write_component<W: Write>(
    out: &mut W,
    component: &Component,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, component)?;
            writeln!(out)
        }
        OutputFormat::Outline => write_outline(out, component, 0),
    }
}

fn write_outline<W: Write>(out: &mut W, component: &Component, depth: usize) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    writeln!(out, "{indent}{}", component.name)?;
    for property in &component.properties {
        write_property(out, property, depth + 1)?;
    }
    for child in &component.children {
        write_outline(out, child, depth + 1)?;
    }
    Ok(())
}

fn write_property<W: Write>(out: &mut W, property: &Property, depth: usize) -> io::Result<()> {
    write!(out, "{}{}", INDENT.repeat(depth), property.name)?;
    for param in &property.params {
        write!(out, ";{param}")?;
    }

    // Decoded text reads better than escapes or quoted-printable
    let shown: &str = match property.values.as_slice() {
        [value] => value.as_text().unwrap_or(&property.raw_value),
        _ => &property.raw_value,
    };
    writeln!(out, " = {}", shown.replace('\r', "\\r").replace('\n', "\\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calstream_rfc::rfc::ical::parse::parse_str;

    fn render(input: &str, format: OutputFormat) -> String {
        let mut out = Vec::new();
        for component in parse_str(input).unwrap() {
            write_component(&mut out, &component, format).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    const INPUT: &str = "\
BEGIN:VEVENT\r\n\
SUMMARY:Review\\, then ship\r\n\
DTSTART;TZID=Europe/Oslo:20260301T090000\r\n\
BEGIN:VALARM\r\n\
DESCRIPTION;ENCODING=QUOTED-PRINTABLE:two=0Alines\r\n\
END:VALARM\r\n\
END:VEVENT\r\n";

    #[test]
    fn outline_nests_children() {
        assert_eq!(
            render(INPUT, OutputFormat::Outline),
            "VEVENT\n\
             \x20 SUMMARY = Review, then ship\n\
             \x20 DTSTART;TZID=Europe/Oslo = 20260301T090000\n\
             \x20 VALARM\n\
             \x20   DESCRIPTION;ENCODING=QUOTED-PRINTABLE = two\\nlines\n"
        );
    }

    #[test]
    fn json_is_one_document_per_component() {
        let text = render(INPUT, OutputFormat::Json);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1);

        let json: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(json["name"], "VEVENT");
        assert_eq!(json["kind"], "event");
        assert_eq!(json["properties"][0]["values"][0]["type"], "text");
        assert_eq!(json["children"][0]["name"], "VALARM");
    }
}
