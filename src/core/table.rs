use crate::domain::model::{Page, Preferences, Record};
use crate::domain::resources::ResourceSpec;
use crate::utils::error::Result;
use chrono::DateTime;
use std::fmt::Write as _;
use std::str::FromStr;

const MAX_CELL_WIDTH: usize = 40;
const TIMESTAMP_FIELDS: [(&str, &str); 2] = [("Created", "createdAt"), ("Updated", "updatedAt")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown format '{}', expected table, csv or json",
                other
            )),
        }
    }
}

/// Border characters; the dark theme draws with box-drawing glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyle {
    horizontal: char,
    vertical: char,
    cross: char,
}

impl TableStyle {
    pub const LIGHT: TableStyle = TableStyle {
        horizontal: '-',
        vertical: '|',
        cross: '+',
    };
    pub const DARK: TableStyle = TableStyle {
        horizontal: '─',
        vertical: '│',
        cross: '┼',
    };

    pub fn from_preferences(preferences: &Preferences) -> Self {
        if preferences.dark_mode {
            Self::DARK
        } else {
            Self::LIGHT
        }
    }
}

/// Header and cell text for every row, `№` first and `ID` last.
fn rows(spec: &ResourceSpec, page: &Page<Record>) -> (Vec<String>, Vec<Vec<String>>) {
    let timestamps: Vec<(&str, &str)> = TIMESTAMP_FIELDS
        .iter()
        .copied()
        .filter(|(_, field)| page.items.iter().any(|r| r.data.contains_key(*field)))
        .collect();

    let mut headers = vec!["№".to_string()];
    headers.extend(spec.columns.iter().map(|c| c.header.to_string()));
    headers.extend(timestamps.iter().map(|(header, _)| header.to_string()));
    headers.push("ID".to_string());

    let body = page
        .items
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut row = vec![page.row_number(index).to_string()];
            row.extend(spec.columns.iter().map(|c| record.display(c.field)));
            row.extend(
                timestamps
                    .iter()
                    .map(|(_, field)| format_timestamp(&record.display(field))),
            );
            row.push(record.id().unwrap_or_default());
            row
        })
        .collect();

    (headers, body)
}

/// RFC 3339 timestamps become `YYYY-MM-DD HH:MM`; anything else is kept.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn truncate(text: &str) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        single_line
    } else {
        let mut cut: String = single_line.chars().take(MAX_CELL_WIDTH - 1).collect();
        cut.push('…');
        cut
    }
}

pub fn render_table(spec: &ResourceSpec, page: &Page<Record>, style: TableStyle) -> String {
    let (headers, body) = rows(spec, page);
    let body: Vec<Vec<String>> = body
        .into_iter()
        .map(|row| row.iter().map(|cell| truncate(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!(" {}{} ", cell, " ".repeat(pad))
            })
            .collect();
        padded.join(style.vertical.to_string().as_str()).trim_end().to_string()
    };
    let separator = widths
        .iter()
        .map(|w| style.horizontal.to_string().repeat(w + 2))
        .collect::<Vec<_>>()
        .join(style.cross.to_string().as_str());

    let mut out = String::new();
    let _ = writeln!(out, "{}", spec.title);
    let _ = writeln!(out, "{}", line(&headers));
    let _ = writeln!(out, "{}", separator);
    if body.is_empty() {
        let _ = writeln!(out, " (no records)");
    }
    for row in &body {
        let _ = writeln!(out, "{}", line(row));
    }
    let _ = writeln!(
        out,
        "Page {}/{}, total {}",
        page.page,
        page.total_pages().max(1),
        page.total
    );
    out
}

pub fn render_csv(spec: &ResourceSpec, page: &Page<Record>) -> Result<String> {
    let (headers, body) = rows(spec, page);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in &body {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_json(page: &Page<Record>) -> Result<String> {
    Ok(serde_json::to_string_pretty(page)?)
}

pub fn render(
    spec: &ResourceSpec,
    page: &Page<Record>,
    format: OutputFormat,
    style: TableStyle,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(spec, page, style)),
        OutputFormat::Csv => render_csv(spec, page),
        OutputFormat::Json => render_json(page),
    }
}
