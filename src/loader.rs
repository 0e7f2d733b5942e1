// Source discovery and sheet extraction.
//
// Each configured pattern is globbed under the base directory, the first
// match is opened with calamine (which detects the container format, so
// .xlsx and .xlsb go through the same path), and every month-named sheet is
// extracted into `RawRecord`s. Nothing here is fatal: a missing file, an
// unreadable sheet or an unmappable header produces a log line and the run
// carries on with the remaining sources.
use crate::config::{Config, SourcePattern};
use crate::header::{dedup_columns, detect_header_row, month_from_sheet, resolve_columns};
use crate::types::{Field, RawRecord};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{info, warn};

/// Counters and the per-sheet diagnostic log for one load pass. The log
/// lines back the dashboard's debug panel.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub files_found: usize,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub rows_extracted: usize,
    pub logs: Vec<String>,
}

impl LoadReport {
    fn log(&mut self, msg: String) {
        warn!("{}", msg);
        self.logs.push(msg);
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn materialize(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}

/// Extract one sheet's rows into `RawRecord`s.
///
/// Detects the header row (falling back to the source's configured index),
/// dedups and uppercases the labels, resolves the canonical fields and, if
/// all four resolve, emits one record per non-empty data row. A partial
/// resolution contributes zero records and logs the missing fields together
/// with the columns actually present.
pub fn extract_sheet(
    cfg: &Config,
    rows: &[Vec<String>],
    src: &SourcePattern,
    month: u32,
    sheet: &str,
    origin: &str,
    report: &mut LoadReport,
) -> Vec<RawRecord> {
    let header_idx = detect_header_row(
        rows,
        &cfg.header_keywords,
        cfg.header_match_threshold,
        cfg.header_scan_rows,
    )
    .unwrap_or(src.fallback_header_row);

    if header_idx >= rows.len() {
        report.log(format!("PLANILHA VAZIA: {} [{}]", origin, sheet));
        return Vec::new();
    }

    let raw_headers: Vec<String> = rows[header_idx]
        .iter()
        .map(|c| c.trim().to_uppercase())
        .collect();
    let headers = dedup_columns(&raw_headers);
    let data = &rows[header_idx + 1..];

    let res = resolve_columns(
        &headers,
        data,
        &cfg.field_specs,
        &cfg.status_tokens,
        cfg.status_ratio,
    );
    if !res.is_complete() {
        let missing: Vec<&str> = res.missing.iter().map(|f| f.label()).collect();
        report.log(format!(
            "MAPEAMENTO INCOMPLETO em {} [{}]: faltando [{}], colunas: [{}]",
            origin,
            sheet,
            missing.join(", "),
            headers.join(", ")
        ));
        return Vec::new();
    }

    // is_complete() guarantees every field resolved.
    let col_company = res.column(Field::Company).unwrap_or_default();
    let col_brand = res.column(Field::Brand).unwrap_or_default();
    let col_price = res.column(Field::UnitPrice).unwrap_or_default();
    let col_volume = res.column(Field::Volume).unwrap_or_default();

    let cell = |row: &Vec<String>, idx: usize| -> String {
        row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    let mut out = Vec::new();
    for row in data {
        let company = cell(row, col_company);
        let brand = cell(row, col_brand);
        let unit_price_raw = cell(row, col_price);
        let volume_raw = cell(row, col_volume);
        if company.is_empty() && brand.is_empty() && unit_price_raw.is_empty() && volume_raw.is_empty()
        {
            continue;
        }
        out.push(RawRecord {
            company,
            brand,
            unit_price_raw,
            volume_raw,
            year: src.year,
            month,
            origin: origin.to_string(),
        });
    }
    out
}

/// Load every configured source, returning the union of all per-sheet
/// extracts and the diagnostic report.
pub fn load_data(cfg: &Config) -> (Vec<RawRecord>, LoadReport) {
    let mut all = Vec::new();
    let mut report = LoadReport::default();

    for src in &cfg.sources {
        let search = cfg.base_dir.join(&src.pattern);
        let found: Vec<_> = match glob::glob(&search.to_string_lossy()) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(e) => {
                report.log(format!("PADRÃO INVÁLIDO {}: {}", src.pattern, e));
                continue;
            }
        };
        if found.is_empty() {
            report.log(format!("ARQUIVO NÃO ENCONTRADO: {}", src.pattern));
            continue;
        }
        report.files_found += 1;

        let path = &found[0];
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        info!(
            "carregando {} ({}º semestre {})",
            filename, src.semester, src.year
        );

        let mut workbook = match open_workbook_auto(path) {
            Ok(wb) => wb,
            Err(e) => {
                report.log(format!("ERRO ao abrir {}: {}", filename, e));
                continue;
            }
        };

        for sheet in workbook.sheet_names().to_owned() {
            let Some(month) = month_from_sheet(&cfg.months, &sheet) else {
                report.sheets_skipped += 1;
                continue;
            };
            let range = match workbook.worksheet_range(&sheet) {
                Ok(r) => r,
                Err(e) => {
                    report.log(format!("ERRO ao ler {} [{}]: {}", filename, sheet, e));
                    continue;
                }
            };
            let rows = materialize(&range);
            let extracted = extract_sheet(cfg, &rows, src, month, &sheet, &filename, &mut report);
            if !extracted.is_empty() {
                report.sheets_processed += 1;
                report.rows_extracted += extracted.len();
            }
            all.extend(extracted);
        }
    }

    info!(
        "{} arquivos, {} planilhas, {} linhas extraídas",
        report.files_found, report.sheets_processed, report.rows_extracted
    );
    (all, report)
}

/// List the base directory's entries, used by the dashboard's empty-state
/// diagnosis when no source yields records.
pub fn list_base_dir(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean_records;
    use crate::reports::{category_totals, monthly_totals};
    use crate::types::Category;
    use std::path::PathBuf;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn sheet_rows() -> Vec<Vec<String>> {
        vec![
            s(&["VENCEDOR", "MARCA", "R$ FINAL", "VOLUME (RESMAS)"]),
            s(&["RDF PAPELARIA", "X", "10,50", "2"]),
            s(&["ACME", "Y", "5,00", ""]),
        ]
    }

    fn src() -> SourcePattern {
        SourcePattern {
            pattern: "*.xlsx".to_string(),
            year: 2024,
            semester: 1,
            fallback_header_row: 0,
        }
    }

    #[test]
    fn two_synthetic_sheets_end_to_end() {
        let cfg = Config::default();
        let mut report = LoadReport::default();
        let mut raw = Vec::new();
        for (sheet, month) in [("JANEIRO", 1u32), ("FEVEREIRO", 2u32)] {
            raw.extend(extract_sheet(
                &cfg,
                &sheet_rows(),
                &src(),
                month,
                sheet,
                "teste.xlsx",
                &mut report,
            ));
        }
        assert_eq!(raw.len(), 4);
        assert!(report.logs.is_empty());

        let (records, _clean) = clean_records(&cfg, raw);
        assert_eq!(records.len(), 4);

        let jan_rdf = records
            .iter()
            .find(|r| r.month == 1 && r.category == Category::Rdf)
            .unwrap();
        assert_eq!(jan_rdf.total_value, 21.0);
        assert_eq!(jan_rdf.volume, 2.0);

        // Empty volume defaults to 0.0 and is then replaced with 1.0.
        let jan_acme = records
            .iter()
            .find(|r| r.month == 1 && r.category == Category::Outros)
            .unwrap();
        assert_eq!(jan_acme.volume, 1.0);
        assert_eq!(jan_acme.total_value, 5.0);

        // Two groups per sheet, summing to the per-row totals.
        let monthly = monthly_totals(&records.iter().collect::<Vec<_>>());
        assert_eq!(monthly.len(), 4);
        assert_eq!(monthly[&(2024, 1, Category::Rdf)].0, 21.0);
        assert_eq!(monthly[&(2024, 2, Category::Outros)].0, 5.0);

        let by_cat = category_totals(&records.iter().collect::<Vec<_>>());
        assert_eq!(by_cat[&Category::Rdf], 42.0);
        assert_eq!(by_cat[&Category::Outros], 10.0);
    }

    #[test]
    fn unresolved_sheet_contributes_nothing_and_logs() {
        let cfg = Config::default();
        let rows = vec![
            s(&["FORNECEDOR ANTERIOR", "MARCA", "R$ FINAL", "VOLUME"]),
            s(&["ACME", "Y", "5,00", "1"]),
        ];
        let mut report = LoadReport::default();
        let out = extract_sheet(&cfg, &rows, &src(), 1, "JANEIRO", "teste.xlsx", &mut report);
        assert!(out.is_empty());
        assert_eq!(report.logs.len(), 1);
        assert!(report.logs[0].contains("Empresa"));
        assert!(report.logs[0].contains("MARCA"));
    }

    #[test]
    fn header_detection_skips_title_rows() {
        let cfg = Config::default();
        let mut rows = vec![s(&["COBERTURA DE PREÇOS 2024", "", "", ""]), s(&[])];
        rows.extend(sheet_rows());
        let mut report = LoadReport::default();
        let out = extract_sheet(&cfg, &rows, &src(), 1, "JANEIRO", "teste.xlsx", &mut report);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].company, "RDF PAPELARIA");
    }

    #[test]
    fn missing_pattern_logs_once_and_yields_nothing() {
        let mut cfg = Config::default();
        cfg.base_dir = PathBuf::from("no_such_dir_for_tests");
        cfg.sources = vec![SourcePattern {
            pattern: "*inexistente*.xlsx".to_string(),
            year: 2024,
            semester: 1,
            fallback_header_row: 0,
        }];
        let (records, report) = load_data(&cfg);
        assert!(records.is_empty());
        assert_eq!(report.logs.len(), 1);
        assert!(report.logs[0].contains("*inexistente*.xlsx"));
    }
}
