//! Credit card statement parser (PDF-extracted text).
//!
//! Best-effort regex matching over text rows such as:
//!   05/11/2023  FALABELLA PLAZA VESPUCIO    CUOTA 03/12      $100.000
//!   20/11/2023  CREDITO CONSUMO SANTANDER   12/48            $155.000
//!   02/11/2023  NETFLIX.COM                                    $9.500
//!   10/11/2023  PAGO RECIBIDO GRACIAS                       - $120.000
//!
//! Lines that match no pattern are skipped; this is a heuristic adapter,
//! not a format contract.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use super::cartola_csv::parse_peso_amount;
use crate::types::StatementRecord;

/// Parse extracted statement text into movements.
pub fn parse_card_statement_text(text: &str) -> Result<Vec<StatementRecord>> {
    let with_cuota = Regex::new(concat!(
        r"^\s*(?P<date>\d{1,2}[/-]\d{1,2}[/-]\d{4})\s+",
        r"(?P<desc>.+?)\s+",
        r"(?:CUOTA\s+)?(?P<cur>\d{1,2})/(?P<tot>\d{1,2})\s+",
        r"(?P<neg>-)?\s*\$\s*(?P<amt>\d{1,3}(?:\.\d{3})*)\s*$"
    ))?;
    let plain = Regex::new(concat!(
        r"^\s*(?P<date>\d{1,2}[/-]\d{1,2}[/-]\d{4})\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<neg>-)?\s*\$\s*(?P<amt>\d{1,3}(?:\.\d{3})*)\s*$"
    ))?;

    let mut out = Vec::new();

    for line in text.lines() {
        // The cuota pattern is a superset of the plain one; try it first.
        let (caps, installment) = if let Some(caps) = with_cuota.captures(line) {
            let cur: u32 = caps["cur"].parse()?;
            let tot: u32 = caps["tot"].parse()?;
            (caps, Some((cur, tot)))
        } else if let Some(caps) = plain.captures(line) {
            (caps, None)
        } else {
            continue;
        };

        let Some(date) = parse_card_date(&caps["date"]) else {
            continue;
        };
        let Some(amount) = parse_peso_amount(&caps["amt"]) else {
            continue;
        };
        let description = caps["desc"].trim().to_string();

        // Negative rows are payments/refunds credited to the card.
        let is_income = caps.name("neg").is_some() || description.starts_with("PAGO");

        out.push(StatementRecord {
            date,
            description,
            amount,
            balance: None,
            is_income,
            installment,
        });
    }

    Ok(out)
}

fn parse_card_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
ESTADO DE CUENTA TARJETA DE CREDITO
Periodo: Noviembre 2023

05/11/2023  FALABELLA PLAZA VESPUCIO    CUOTA 03/12   $100.000
20/11/2023  CREDITO CONSUMO SANTANDER   12/48         $155.000
02/11/2023  NETFLIX.COM   $9.500
10/11/2023  PAGO RECIBIDO GRACIAS   - $120.000

Monto facturado del periodo: $384.500
"#;

    #[test]
    fn test_parses_movement_rows_only() {
        let records = parse_card_statement_text(SAMPLE).unwrap();
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_cuota_marker_with_keyword() {
        let records = parse_card_statement_text(SAMPLE).unwrap();
        let falabella = &records[0];
        assert_eq!(falabella.description, "FALABELLA PLAZA VESPUCIO");
        assert_eq!(falabella.installment, Some((3, 12)));
        assert_eq!(falabella.amount, 100_000);
    }

    #[test]
    fn test_bare_cuota_marker() {
        let records = parse_card_statement_text(SAMPLE).unwrap();
        let credito = &records[1];
        assert_eq!(credito.installment, Some((12, 48)));
        assert_eq!(credito.amount, 155_000);
    }

    #[test]
    fn test_plain_charge() {
        let records = parse_card_statement_text(SAMPLE).unwrap();
        let netflix = &records[2];
        assert_eq!(netflix.description, "NETFLIX.COM");
        assert_eq!(netflix.installment, None);
        assert_eq!(netflix.amount, 9_500);
        assert!(!netflix.is_income);
    }

    #[test]
    fn test_payment_row_is_income() {
        let records = parse_card_statement_text(SAMPLE).unwrap();
        let pago = &records[3];
        assert!(pago.is_income);
        assert_eq!(pago.amount, 120_000);
    }

    #[test]
    fn test_garbage_lines_skipped() {
        let records = parse_card_statement_text("nothing to see\n12345\n").unwrap();
        assert!(records.is_empty());
    }
}
