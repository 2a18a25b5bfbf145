use crate::calendar::{summarize, CalendarRow, Cell, HEADERS};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use xthreads_core::{CoreError, ExportError};

const MAX_COLUMN_WIDTH: usize = 50;

fn spreadsheet_error(e: XlsxError) -> CoreError {
    ExportError::Spreadsheet {
        details: e.to_string(),
    }
    .into()
}

fn write_failed(path: &Path, e: impl std::fmt::Display) -> CoreError {
    ExportError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}

/// Column widths of `min(longest + 2, 50)` over header and cells.
pub fn column_widths(rows: &[CalendarRow]) -> [usize; 13] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.to_string().chars().count());
        }
    }
    widths.map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell<'_>) -> Result<(), XlsxError> {
    match cell {
        Cell::Text(text) => sheet.write_string(row, col, *text).map(|_| ()),
        Cell::Number(n) => sheet.write_number(row, col, *n).map(|_| ()),
    }
}

/// Two sheets: the calendar itself and a metric/value summary.
pub fn write_xlsx(rows: &[CalendarRow], path: &Path) -> Result<(), CoreError> {
    let mut workbook = Workbook::new();

    let calendar = workbook.add_worksheet();
    calendar
        .set_name("Content Calendar")
        .map_err(spreadsheet_error)?;
    for (col, header) in HEADERS.iter().enumerate() {
        calendar
            .write_string(0, col as u16, *header)
            .map_err(spreadsheet_error)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.cells().iter().enumerate() {
            write_cell(calendar, i as u32 + 1, col as u16, cell).map_err(spreadsheet_error)?;
        }
    }
    for (col, width) in column_widths(rows).iter().enumerate() {
        calendar
            .set_column_width(col as u16, *width as f64)
            .map_err(spreadsheet_error)?;
    }

    let summary = workbook.add_worksheet();
    summary.set_name("Summary").map_err(spreadsheet_error)?;
    summary.write_string(0, 0, "Metric").map_err(spreadsheet_error)?;
    summary.write_string(0, 1, "Value").map_err(spreadsheet_error)?;
    for (i, metric) in summarize(rows).iter().enumerate() {
        let row = i as u32 + 1;
        summary
            .write_string(row, 0, metric.metric.as_str())
            .map_err(spreadsheet_error)?;
        summary
            .write_string(row, 1, metric.value.as_str())
            .map_err(spreadsheet_error)?;
    }

    workbook.save(path).map_err(spreadsheet_error)
}

pub fn write_csv(rows: &[CalendarRow], path: &Path) -> Result<(), CoreError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| CoreError::from(ExportError::Csv(e.to_string())))?;
    if rows.is_empty() {
        writer
            .write_record(HEADERS)
            .map_err(|e| CoreError::from(ExportError::Csv(e.to_string())))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| CoreError::from(ExportError::Csv(e.to_string())))?;
    }
    writer.flush().map_err(|e| write_failed(path, e))
}

/// Calendar grouped by platform, in row order.
pub fn render_markdown(rows: &[CalendarRow], date: &str) -> String {
    let mut out = String::new();
    let _ = write!(out, "# Content Calendar - {}\n\n", date);
    out.push_str("Generated by xthreads-agent 🤖\n\n");

    let mut current: Option<&str> = None;
    for row in rows {
        if current != Some(row.platform.as_str()) {
            let _ = write!(out, "## {}\n\n", row.platform);
            current = Some(row.platform.as_str());
        }
        let _ = write!(out, "### {} - {}\n\n", row.time, row.content_type);
        let _ = write!(out, "**Topic:** {}\n\n", row.topic);
        let _ = write!(out, "**Content:**\n```\n{}\n```\n\n", row.content);
        let _ = write!(out, "**Keywords:** {}\n\n", row.target_keywords);
        let _ = write!(
            out,
            "**Status:** {} | **Characters:** {}\n\n",
            row.status, row.character_count
        );
        out.push_str("---\n\n");
    }
    out
}

pub fn write_markdown(rows: &[CalendarRow], date: &str, path: &Path) -> Result<(), CoreError> {
    fs::write(path, render_markdown(rows, date)).map_err(|e| write_failed(path, e))
}

pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| write_failed(path, e))
}
