//! Output writers for redacted documents.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::Context;
use serde::Serialize;
use shroud_core::prelude::*;
use shroud_core::span::{DisplayMode, RedactedSpan, SpanSource};

use crate::{OutputFormat, ScanArgs};

/// One span in the JSON report. Carries the mask, never the original text.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSpan<'a> {
    id: SpanId,
    source: &'a SpanSource,
    length: usize,
    masked: String,
    display_mode: DisplayMode,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    report: &'a ScanReport,
    spans: Vec<JsonSpan<'a>>,
    export: String,
}

fn to_json_span(span: &RedactedSpan) -> JsonSpan<'_> {
    JsonSpan {
        id: span.id,
        source: &span.source,
        length: span.original_text.chars().count(),
        masked: span.masked(),
        display_mode: span.display_mode,
    }
}

/// Writes the redacted document in the requested format to `--output` or stdout.
pub fn write_output(redactor: &Redactor, report: &ScanReport, args: &ScanArgs) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match args.format {
        OutputFormat::Text => write!(writer, "{}", redactor.export_redacted_content())?,
        OutputFormat::Markup => writeln!(writer, "{}", redactor.render_markup())?,
        OutputFormat::Json => write_json(redactor, report, &mut *writer)?,
    }

    writer.flush()?;
    Ok(())
}

fn write_json(redactor: &Redactor, report: &ScanReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = JsonReport {
        report,
        spans: redactor.spans().iter().map(to_json_span).collect(),
        export: redactor.export_redacted_content(),
    };
    serde_json::to_writer_pretty(&mut *writer, &json)?;
    writeln!(writer)?;
    Ok(())
}
