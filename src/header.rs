// Header heuristics: deduplication, header-row detection and the mapping of
// free-text column labels onto the canonical fields.
//
// The source workbooks were filled in by hand over two years, so labels
// drift ("VENCEDOR", "VENCEDOR ANTERIOR", "PARCEIRO DE NEGOCIOS", ...) and
// some sheets repeat a label outright. Everything here is best-effort
// string matching; a sheet that cannot be mapped contributes nothing.
use crate::config::FieldSpec;
use crate::types::Field;
use std::collections::{HashMap, HashSet};

/// Make an ordered list of header labels pairwise unique by suffixing the
/// k-th repeat of `L` as `L.k`. The first occurrence is left untouched and
/// order is preserved. Must run before candidate matching, since matching
/// is substring-based.
pub fn dedup_columns(cols: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(cols.len());
    for col in cols {
        match seen.get_mut(col) {
            Some(n) => {
                *n += 1;
                out.push(format!("{}.{}", col, n));
            }
            None => {
                seen.insert(col.clone(), 0);
                out.push(col.clone());
            }
        }
    }
    out
}

/// Scan the first `scan_rows` raw rows for one that looks like a header:
/// at least `threshold` of the domain keywords appear as a substring of
/// some cell. Returns the row index, or `None` when nothing qualifies.
pub fn detect_header_row(
    rows: &[Vec<String>],
    keywords: &[String],
    threshold: usize,
    scan_rows: usize,
) -> Option<usize> {
    for (i, row) in rows.iter().take(scan_rows).enumerate() {
        let cells: Vec<String> = row.iter().map(|c| c.to_uppercase()).collect();
        let hits = keywords
            .iter()
            .filter(|k| cells.iter().any(|c| c.contains(k.as_str())))
            .count();
        if hits >= threshold {
            return Some(i);
        }
    }
    None
}

/// True when more than `ratio` of the column's non-empty values look like
/// bid-outcome tokens. Such a column records won/lost/cancelled, not a
/// company identity, and must not be mapped as the company field even if
/// its label says "VENCEDOR".
fn is_status_column(
    data: &[Vec<String>],
    col: usize,
    status_tokens: &[String],
    ratio: f64,
) -> bool {
    let mut total = 0usize;
    let mut matches = 0usize;
    for row in data {
        let val = match row.get(col) {
            Some(v) => v.trim().to_uppercase(),
            None => continue,
        };
        if val.is_empty() {
            continue;
        }
        total += 1;
        if status_tokens.iter().any(|t| val.contains(t.as_str())) {
            matches += 1;
        }
    }
    if total == 0 {
        return false;
    }
    (matches as f64 / total as f64) > ratio
}

/// Result of mapping a sheet's columns onto the canonical fields.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub mapping: Vec<(Field, usize)>,
    pub missing: Vec<Field>,
}

impl Resolution {
    pub fn column(&self, field: Field) -> Option<usize> {
        self.mapping.iter().find(|(f, _)| *f == field).map(|(_, i)| *i)
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Map deduped header labels onto canonical fields.
///
/// Per field, in the order given by `specs`: walk the candidate keywords in
/// priority order, collect columns containing the keyword, drop blacklisted
/// labels, and for the company field drop columns whose sampled content is
/// mostly outcome tokens. The first keyword with survivors wins; among
/// survivors the shortest label is the most specific match. A column
/// claimed by an earlier field is off the table for later ones.
pub fn resolve_columns(
    headers: &[String],
    data: &[Vec<String>],
    specs: &[FieldSpec],
    status_tokens: &[String],
    status_ratio: f64,
) -> Resolution {
    let mut res = Resolution::default();
    let mut claimed: HashSet<usize> = HashSet::new();

    for spec in specs {
        let mut chosen: Option<usize> = None;
        for cand in &spec.candidates {
            let cand = cand.to_uppercase();
            let mut survivors: Vec<usize> = headers
                .iter()
                .enumerate()
                .filter(|(i, h)| !claimed.contains(i) && h.contains(cand.as_str()))
                .filter(|(_, h)| {
                    !spec
                        .blacklist
                        .iter()
                        .any(|bad| h.contains(bad.to_uppercase().as_str()))
                })
                .map(|(i, _)| i)
                .collect();
            if spec.field == Field::Company {
                survivors.retain(|&i| !is_status_column(data, i, status_tokens, status_ratio));
            }
            if !survivors.is_empty() {
                survivors.sort_by_key(|&i| (headers[i].len(), i));
                chosen = Some(survivors[0]);
                break;
            }
        }
        match chosen {
            Some(i) => {
                claimed.insert(i);
                res.mapping.push((spec.field, i));
            }
            None => res.missing.push(spec.field),
        }
    }
    res
}

/// Map a sheet name to a calendar month via the fixed vocabulary.
/// Non-month sheets ("RESUMO", "BASE", ...) return `None` and are skipped.
pub fn month_from_sheet(months: &[(String, u32)], name: &str) -> Option<u32> {
    let upper = name.trim().to_uppercase();
    months
        .iter()
        .find(|(label, _)| *label == upper)
        .map(|(_, m)| *m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn dedup_suffixes_repeats() {
        assert_eq!(dedup_columns(&s(&["X", "Y", "X"])), s(&["X", "Y", "X.1"]));
        assert_eq!(
            dedup_columns(&s(&["A", "B", "A", "A"])),
            s(&["A", "B", "A.1", "A.2"])
        );
    }

    #[test]
    fn dedup_preserves_order_length_and_uniqueness() {
        let input = s(&["VOLUME", "MARCA", "VOLUME", "MARCA", "VOLUME"]);
        let out = dedup_columns(&input);
        assert_eq!(out.len(), input.len());
        let unique: HashSet<&String> = out.iter().collect();
        assert_eq!(unique.len(), out.len());
        assert_eq!(out[0], "VOLUME");
        assert_eq!(out[2], "VOLUME.1");
        assert_eq!(out[4], "VOLUME.2");
    }

    #[test]
    fn header_detection_needs_three_hits() {
        let cfg = Config::default();
        let rows = vec![
            s(&["COBERTURA DE PREÇOS", "", ""]),
            s(&["", "2024", ""]),
            s(&["DATA DO EVENTO", "VENCEDOR", "R$ FINAL", "VOLUME (RESMAS)"]),
        ];
        assert_eq!(
            detect_header_row(&rows, &cfg.header_keywords, 3, 10),
            Some(2)
        );
    }

    #[test]
    fn header_detection_falls_through_when_nothing_matches() {
        let cfg = Config::default();
        let rows = vec![s(&["a", "b"]), s(&["c", "d"])];
        assert_eq!(detect_header_row(&rows, &cfg.header_keywords, 3, 10), None);
    }

    #[test]
    fn resolution_honors_candidate_priority() {
        let cfg = Config::default();
        let headers = s(&["R$ TOTAL", "R$ FINAL"]);
        let res = resolve_columns(&headers, &[], &cfg.field_specs, &cfg.status_tokens, 0.3);
        // "R$ FINAL" is the first candidate in priority order, so it wins
        // even though "R$ TOTAL" appears first in the sheet.
        assert_eq!(res.column(Field::UnitPrice), Some(1));
    }

    #[test]
    fn blacklist_excludes_previous_winner_column() {
        let cfg = Config::default();
        let headers = s(&["VENCEDOR ANTERIOR", "MARCA", "R$ FINAL", "VOLUME"]);
        let res = resolve_columns(&headers, &[], &cfg.field_specs, &cfg.status_tokens, 0.3);
        assert_eq!(res.column(Field::Company), None);
        assert!(res.missing.contains(&Field::Company));
    }

    #[test]
    fn shortest_label_wins_among_survivors() {
        let cfg = Config::default();
        let headers = s(&["VENCEDOR DO LOTE", "VENCEDOR", "MARCA"]);
        let res = resolve_columns(&headers, &[], &cfg.field_specs, &cfg.status_tokens, 0.3);
        assert_eq!(res.column(Field::Company), Some(1));
    }

    #[test]
    fn status_column_is_rejected_for_company() {
        let cfg = Config::default();
        let headers = s(&["VENCEDOR", "MARCA", "R$ FINAL", "VOLUME"]);
        // Over 30% of the sampled values are outcome tokens.
        let data = vec![
            s(&["GANHAMOS", "X", "1,00", "1"]),
            s(&["PERDEMOS", "Y", "2,00", "1"]),
            s(&["ACME LTDA", "Z", "3,00", "1"]),
        ];
        let res = resolve_columns(&headers, &data, &cfg.field_specs, &cfg.status_tokens, 0.3);
        assert_eq!(res.column(Field::Company), None);
    }

    #[test]
    fn company_column_with_real_names_survives_sampling() {
        let cfg = Config::default();
        let headers = s(&["VENCEDOR", "MARCA", "R$ FINAL", "VOLUME"]);
        let data = vec![
            s(&["ACME LTDA", "X", "1,00", "1"]),
            s(&["RDF PAPELARIA", "Y", "2,00", "1"]),
            s(&["PAPEL SUL", "Z", "3,00", "1"]),
            s(&["GANHAMOS", "W", "4,00", "1"]),
        ];
        let res = resolve_columns(&headers, &data, &cfg.field_specs, &cfg.status_tokens, 0.3);
        assert_eq!(res.column(Field::Company), Some(0));
        assert!(res.is_complete());
    }

    #[test]
    fn claimed_column_is_not_reused() {
        let cfg = Config::default();
        // "QUANTIDADE VENCEDOR" matches the company field first (company
        // resolves before volume), so the volume field cannot reuse it.
        let headers = s(&["R$ FINAL", "QUANTIDADE VENCEDOR", "MARCA"]);
        let res = resolve_columns(&headers, &[], &cfg.field_specs, &cfg.status_tokens, 0.3);
        assert_eq!(res.column(Field::Company), Some(1));
        assert_eq!(res.column(Field::Volume), None);
    }

    #[test]
    fn month_lookup_handles_accent_variants() {
        let cfg = Config::default();
        assert_eq!(month_from_sheet(&cfg.months, "JANEIRO"), Some(1));
        assert_eq!(month_from_sheet(&cfg.months, " março "), Some(3));
        assert_eq!(month_from_sheet(&cfg.months, "MARCO"), Some(3));
        assert_eq!(month_from_sheet(&cfg.months, "Resumo"), None);
    }
}
