mod cli;
mod error;
mod output;

use std::fs::File;
use std::io::{self, BufWriter, Write};

use calstream_core::config::{OutputFormat, Settings, load_config};
use calstream_rfc::rfc::ical::parse::{CalendarDeserializer, CharSource, DeserializerBuilder};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use crate::cli::{Args, Input};
use crate::error::{AppError, AppResult};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let mut config = load_config()?;
    args.apply(&mut config);

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let mut out = BufWriter::new(io::stdout().lock());
    let result = run(&args.inputs(), &config, &mut out);
    out.flush()?;

    let count = result?;
    tracing::info!(components = count, "Finished");
    Ok(())
}

/// Streams every input to `out`, stopping at the first error.
fn run<W: Write>(inputs: &[Input], settings: &Settings, out: &mut W) -> AppResult<usize> {
    let mut count = 0;

    for input in inputs {
        let _span = tracing::info_span!("input", %input).entered();
        let builder = DeserializerBuilder::from_config(&settings.parser);

        count += match input {
            Input::Stdin => stream(
                builder.build_reader(io::stdin().lock()),
                input,
                settings.output.format,
                out,
            )?,
            Input::File(path) => {
                let file = File::open(path).map_err(|source| AppError::Open {
                    path: path.display().to_string(),
                    source,
                })?;
                stream(builder.build_read(file), input, settings.output.format, out)?
            }
        };
    }

    Ok(count)
}

fn stream<S: CharSource, W: Write>(
    components: CalendarDeserializer<S>,
    input: &Input,
    format: OutputFormat,
    out: &mut W,
) -> AppResult<usize> {
    let mut count = 0;

    for component in components {
        let component = component.map_err(|e| AppError::Calendar {
            input: input.to_string(),
            source: e.into(),
        })?;
        output::write_component(out, &component, format)?;
        count += 1;
    }

    tracing::debug!(components = count, "Input complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn stream_writes_each_component() {
        let input = "BEGIN:VTODO\r\nSUMMARY:a\r\nEND:VTODO\r\nBEGIN:VTODO\r\nSUMMARY:b\r\nEND:VTODO\r\n";
        let mut out = Vec::new();

        let count = stream(
            CalendarDeserializer::from_text(input),
            &Input::Stdin,
            OutputFormat::Outline,
            &mut out,
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "VTODO\n  SUMMARY = a\nVTODO\n  SUMMARY = b\n"
        );
    }

    #[test_log::test]
    fn stream_stops_at_first_error_and_names_the_input() {
        let input = "BEGIN:VTODO\r\nEND:VTODO\r\nBEGIN:VTODO\r\nEND:VEVENT\r\n";
        let mut out = Vec::new();

        let err = stream(
            CalendarDeserializer::from_text(input),
            &Input::File("tasks.ics".into()),
            OutputFormat::Outline,
            &mut out,
        )
        .unwrap_err();

        assert_eq!(String::from_utf8(out).unwrap(), "VTODO\n");
        let message = err.to_string();
        assert!(message.starts_with("tasks.ics: "), "{message}");
        assert!(message.contains("line 4"), "{message}");
    }

    #[test_log::test]
    fn missing_file_is_reported() {
        let settings = Settings::from_toml("").unwrap();
        let err = run(
            &[Input::File("/nonexistent/calendar.ics".into())],
            &settings,
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Open { .. }));
    }
}
