// Report writers and console table previews.
use crate::reports::{category_totals, grand_total, yearly_totals};
use crate::types::CanonicalRecord;
use crate::util::format_brl;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// The plain-text report: totals by category, then totals by year.
pub fn write_text_report(path: &Path, records: &[&CanonicalRecord]) -> Result<(), Box<dyn Error>> {
    let mut body = String::new();
    body.push_str("=== RELATÓRIO DE ANÁLISE DE VENDAS ===\n\n");

    body.push_str("1. TOTAIS GERAIS POR CATEGORIA\n");
    if records.is_empty() {
        body.push_str("(sem dados)\n");
    }
    for (cat, total) in category_totals(records) {
        body.push_str(&format!("{:<8} {}\n", cat.label(), format_brl(total)));
    }
    body.push('\n');

    body.push_str("2. TOTAIS POR ANO\n");
    if records.is_empty() {
        body.push_str("(sem dados)\n");
    }
    for (year, total) in yearly_totals(records) {
        body.push_str(&format!("{:<8} {}\n", year, format_brl(total)));
    }
    body.push('\n');

    body.push_str(&format!("TOTAL GERAL: {}\n", format_brl(grand_total(records))));

    std::fs::write(path, body)?;
    info!("relatório salvo: {}", path.display());
    Ok(())
}

/// Print the first `max_rows` rows of a report as a markdown table.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(sem linhas)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
