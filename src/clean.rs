// Cleaning and vendor categorization.
//
// Turns extracted `RawRecord`s into the normalized dataset: locale numbers
// parsed, defaults applied, totals derived and every row bucketed into
// RDF / ATUAL / OUTROS. Rows that cannot identify a vendor (empty company,
// or an outcome token that leaked through header resolution) are dropped
// and counted, never errored.
use crate::config::Config;
use crate::types::{CanonicalRecord, Category, RawRecord};
use crate::util::parse_numeric;
use tracing::info;

/// Drop counters for one cleaning pass, surfaced in the debug panel.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub input_rows: usize,
    pub dropped_empty_company: usize,
    pub dropped_status_token: usize,
    pub dropped_zero_price: usize,
    pub kept: usize,
}

/// Classify a cleaned, uppercased company string.
///
/// Ordered substring containment: the RDF spelling variants first, then
/// ATUAL, else OUTROS. Exactly one bucket holds for every input.
pub fn categorize(cfg: &Config, company_upper: &str) -> Category {
    if cfg.target_rdf.iter().any(|t| company_upper.contains(t.as_str())) {
        Category::Rdf
    } else if cfg
        .target_atual
        .iter()
        .any(|t| company_upper.contains(t.as_str()))
    {
        Category::Atual
    } else {
        Category::Outros
    }
}

pub fn clean_records(cfg: &Config, raw: Vec<RawRecord>) -> (Vec<CanonicalRecord>, CleanReport) {
    let mut report = CleanReport {
        input_rows: raw.len(),
        ..CleanReport::default()
    };
    let mut out = Vec::with_capacity(raw.len());

    for r in raw {
        let company = r.company.trim().to_uppercase();
        if company.is_empty() {
            report.dropped_empty_company += 1;
            continue;
        }
        if cfg.company_reject_tokens.iter().any(|t| *t == company) {
            report.dropped_status_token += 1;
            continue;
        }

        let unit_price = parse_numeric(&r.unit_price_raw).or_zero();
        if unit_price <= 0.0 {
            report.dropped_zero_price += 1;
            continue;
        }

        // Missing or non-positive volume counts as a single unit so the row
        // still carries its unit price into the totals.
        let mut volume = parse_numeric(&r.volume_raw).or_zero();
        if volume <= 0.0 {
            volume = 1.0;
        }

        let category = categorize(cfg, &company);
        out.push(CanonicalRecord {
            total_value: unit_price * volume,
            company,
            brand: r.brand.trim().to_string(),
            unit_price,
            volume,
            year: r.year,
            month: r.month,
            origin: r.origin,
            category,
        });
    }

    report.kept = out.len();
    info!(
        "limpeza: {} de {} linhas mantidas",
        report.kept, report.input_rows
    );
    (out, report)
}
