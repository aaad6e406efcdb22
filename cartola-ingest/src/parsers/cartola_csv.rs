//! Bank account cartola parser (CSV export).
//!
//! Chilean bank exports prepend several preamble rows (account holder,
//! period, totals) before the real header:
//!   Fecha;Movimientos;Documentos;Cargos;Abonos;Saldo
//!   02/11/2023;COMPRA NETFLIX.COM;;9.500;;1.240.500
//!   05/11/2023;TRANSFERENCIA RECIBIDA;;;350.000;1.590.500
//!
//! The header row is found by scanning for a "Fecha" cell; rows that fail
//! to parse are dropped, not imported.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use crate::types::StatementRecord;

#[derive(Debug, Clone, Copy, Default)]
struct Columns {
    fecha: usize,
    movimientos: usize,
    cargos: Option<usize>,
    abonos: Option<usize>,
    saldo: Option<usize>,
}

/// Parse a cartola CSV file, returning all valid movements.
pub fn parse_cartola_csv(path: impl AsRef<Path>) -> Result<Vec<StatementRecord>> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    parse_cartola_text(&text)
}

/// Parse cartola CSV content. Accepts `;` or `,` delimited exports.
pub fn parse_cartola_text(text: &str) -> Result<Vec<StatementRecord>> {
    let delimiter = sniff_delimiter(text);
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut columns: Option<Columns> = None;
    let mut out = Vec::new();

    for result in rdr.records() {
        let record = result.context("reading cartola row")?;

        // Skip preamble until the header row
        let Some(cols) = columns else {
            columns = detect_header(&record);
            continue;
        };

        let Some(date) = record
            .get(cols.fecha)
            .and_then(|s| parse_statement_date(s.trim()))
        else {
            continue; // totals row, blank row, or second header copy
        };

        let description = record
            .get(cols.movimientos)
            .unwrap_or("")
            .trim()
            .to_string();
        if description.is_empty() {
            continue;
        }

        let cargo = cols.cargos.and_then(|i| record.get(i)).and_then(parse_peso_amount);
        let abono = cols.abonos.and_then(|i| record.get(i)).and_then(parse_peso_amount);
        let balance = cols.saldo.and_then(|i| record.get(i)).and_then(parse_peso_amount);

        // A movement is either a cargo or an abono; rows with neither
        // carry no amount and are dropped.
        let (amount, is_income) = match (cargo, abono) {
            (Some(c), _) if c > 0 => (c, false),
            (_, Some(a)) if a > 0 => (a, true),
            _ => continue,
        };

        out.push(StatementRecord {
            date,
            description,
            amount,
            balance,
            is_income,
            installment: None,
        });
    }

    Ok(out)
}

/// The header row must contain a Fecha cell and a movement column.
fn detect_header(record: &csv::StringRecord) -> Option<Columns> {
    let mut cols = Columns::default();
    let mut saw_fecha = false;
    let mut saw_movimientos = false;

    for (i, cell) in record.iter().enumerate() {
        let cell = cell.trim().to_lowercase();
        match cell.as_str() {
            "fecha" => {
                cols.fecha = i;
                saw_fecha = true;
            }
            "movimientos" | "descripcion" | "descripción" | "detalle" => {
                cols.movimientos = i;
                saw_movimientos = true;
            }
            "cargos" | "cargo" => cols.cargos = Some(i),
            "abonos" | "abono" => cols.abonos = Some(i),
            "saldo" => cols.saldo = Some(i),
            _ => {}
        }
    }

    (saw_fecha && saw_movimientos).then_some(cols)
}

fn sniff_delimiter(text: &str) -> u8 {
    for line in text.lines() {
        if line.to_lowercase().contains("fecha") {
            if line.matches(';').count() >= line.matches(',').count() {
                return b';';
            }
            return b',';
        }
    }
    b';'
}

fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Strip currency decoration ("$1.234.567", " 9.500 ") down to whole pesos.
/// Returns None for empty or non-numeric cells.
pub(crate) fn parse_peso_amount(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
