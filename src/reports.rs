// Aggregation and insight generation over the normalized dataset.
//
// The grouping style follows one rule throughout: accumulate into a map
// keyed by the group, then render sorted rows with pre-formatted strings.
// Nothing here mutates the record table.
use crate::types::{
    CanonicalRecord, Category, CategoryTotalRow, MonthlyCategoryRow, OtherCompanyRow, RecordRow,
    SummaryStats, YearTotalRow,
};
use crate::util::{format_brl, format_number, month_name};
use std::collections::{BTreeMap, BTreeSet};

/// Year/month selection. Empty sets select everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
}

impl Filter {
    pub fn all() -> Self {
        Filter::default()
    }

    pub fn matches(&self, r: &CanonicalRecord) -> bool {
        (self.years.is_empty() || self.years.contains(&r.year))
            && (self.months.is_empty() || self.months.contains(&r.month))
    }
}

pub fn filter_records<'a>(data: &'a [CanonicalRecord], f: &Filter) -> Vec<&'a CanonicalRecord> {
    data.iter().filter(|r| f.matches(r)).collect()
}

/// Grouped sums of (total value, volume) by (year, month, category).
pub fn monthly_totals(
    records: &[&CanonicalRecord],
) -> BTreeMap<(i32, u32, Category), (f64, f64)> {
    let mut map = BTreeMap::new();
    for r in records {
        let e = map.entry((r.year, r.month, r.category)).or_insert((0.0, 0.0));
        e.0 += r.total_value;
        e.1 += r.volume;
    }
    map
}

pub fn category_totals(records: &[&CanonicalRecord]) -> BTreeMap<Category, f64> {
    let mut map = BTreeMap::new();
    for r in records {
        *map.entry(r.category).or_insert(0.0) += r.total_value;
    }
    map
}

/// Volume sums by (year, category), for the annual volume chart.
pub fn yearly_volume(records: &[&CanonicalRecord]) -> BTreeMap<(i32, Category), f64> {
    let mut map = BTreeMap::new();
    for r in records {
        *map.entry((r.year, r.category)).or_insert(0.0) += r.volume;
    }
    map
}

pub fn yearly_totals(records: &[&CanonicalRecord]) -> BTreeMap<i32, f64> {
    let mut map = BTreeMap::new();
    for r in records {
        *map.entry(r.year).or_insert(0.0) += r.total_value;
    }
    map
}

/// Yearly totals restricted to the two tracked companies.
pub fn yearly_target_totals(records: &[&CanonicalRecord]) -> BTreeMap<i32, f64> {
    let mut map = BTreeMap::new();
    for r in records {
        if r.category.is_target() {
            *map.entry(r.year).or_insert(0.0) += r.total_value;
        }
    }
    map
}

pub fn grand_total(records: &[&CanonicalRecord]) -> f64 {
    records.iter().map(|r| r.total_value).sum()
}

/// (market total, target total, target share %). Share is `None` on an
/// empty market rather than a division by zero.
pub fn target_share(records: &[&CanonicalRecord]) -> (f64, f64, Option<f64>) {
    let total = grand_total(records);
    let target: f64 = records
        .iter()
        .filter(|r| r.category.is_target())
        .map(|r| r.total_value)
        .sum();
    let pct = if total > 0.0 {
        Some(target / total * 100.0)
    } else {
        None
    };
    (total, target, pct)
}

/// Year-over-year growth between the earliest and latest year present.
/// Omitted (not an error) when fewer than two years exist or the base
/// year's sum is zero.
pub fn yoy_growth(by_year: &BTreeMap<i32, f64>) -> Option<(i32, i32, f64)> {
    let base_year = *by_year.keys().next()?;
    let cur_year = *by_year.keys().last()?;
    if base_year == cur_year {
        return None;
    }
    let base = by_year[&base_year];
    if base <= 0.0 {
        return None;
    }
    let cur = by_year[&cur_year];
    Some((base_year, cur_year, (cur - base) / base * 100.0))
}

/// Best month for the tracked companies, by summed total value.
pub fn best_target_month(records: &[&CanonicalRecord]) -> Option<(i32, u32, f64)> {
    let mut map: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for r in records {
        if r.category.is_target() {
            *map.entry((r.year, r.month)).or_insert(0.0) += r.total_value;
        }
    }
    map.into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|((y, m), v)| (y, m, v))
}

/// Top-N OUTROS companies by total value: (company, total, volume).
pub fn top_other_companies(records: &[&CanonicalRecord], n: usize) -> Vec<(String, f64, f64)> {
    let mut map: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for r in records {
        if r.category == Category::Outros {
            let e = map.entry(r.company.clone()).or_insert((0.0, 0.0));
            e.0 += r.total_value;
            e.1 += r.volume;
        }
    }
    let mut ranked: Vec<(String, f64, f64)> =
        map.into_iter().map(|(k, (t, v))| (k, t, v)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// The narrative panel: market share, annual comparison and best month, in
/// the original report's phrasing.
pub fn generate_insights(records: &[&CanonicalRecord]) -> Vec<String> {
    let mut insights = Vec::new();

    let (total, target, pct) = target_share(records);
    if let Some(pct) = pct {
        insights.push(format!(
            "Market Share: RDF e ATUAL representam {}% do faturamento total analisado ({}).",
            format_number(pct, 2),
            format_brl(total)
        ));
    }

    let by_year = yearly_target_totals(records);
    if let Some((base_year, cur_year, growth)) = yoy_growth(&by_year) {
        let trend = if growth > 0.0 { "CRESCIMENTO" } else { "QUEDA" };
        insights.push(format!(
            "Comparativo Anual (RDF+ATUAL): {} de {}% em {} comparado a {}.",
            trend,
            format_number(growth.abs(), 1),
            cur_year,
            base_year
        ));
    }

    if target > 0.0 {
        if let Some((y, m, v)) = best_target_month(records) {
            insights.push(format!(
                "Melhor mês (RDF+ATUAL): {}/{} com {}.",
                month_name(m),
                y,
                format_brl(v)
            ));
        }
    }

    insights
}

pub fn generate_summary(records: &[&CanonicalRecord]) -> SummaryStats {
    let (total, target, pct) = target_share(records);
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    SummaryStats {
        total_records: records.len(),
        years: years.into_iter().collect(),
        total_market: total,
        target_value: target,
        other_value: total - target,
        target_share_pct: pct,
    }
}

pub fn monthly_rows(records: &[&CanonicalRecord]) -> Vec<MonthlyCategoryRow> {
    monthly_totals(records)
        .into_iter()
        .map(|((year, month, cat), (total, volume))| MonthlyCategoryRow {
            year,
            month: month_name(month),
            category: cat.label().to_string(),
            total_value: format_number(total, 2),
            volume: format_number(volume, 0),
        })
        .collect()
}

pub fn category_rows(records: &[&CanonicalRecord]) -> Vec<CategoryTotalRow> {
    let total = grand_total(records);
    category_totals(records)
        .into_iter()
        .map(|(cat, value)| CategoryTotalRow {
            category: cat.label().to_string(),
            total_value: format_number(value, 2),
            share: if total > 0.0 {
                format!("{}%", format_number(value / total * 100.0, 2))
            } else {
                "-".to_string()
            },
        })
        .collect()
}

pub fn year_rows(records: &[&CanonicalRecord]) -> Vec<YearTotalRow> {
    let totals = yearly_totals(records);
    let targets = yearly_target_totals(records);
    totals
        .into_iter()
        .map(|(year, total)| {
            let target = targets.get(&year).copied().unwrap_or(0.0);
            YearTotalRow {
                year,
                total_value: format_number(total, 2),
                target_value: format_number(target, 2),
                share: if total > 0.0 {
                    format!("{}%", format_number(target / total * 100.0, 2))
                } else {
                    "-".to_string()
                },
            }
        })
        .collect()
}

pub fn other_rows(records: &[&CanonicalRecord], n: usize) -> Vec<OtherCompanyRow> {
    top_other_companies(records, n)
        .into_iter()
        .enumerate()
        .map(|(idx, (company, total, volume))| OtherCompanyRow {
            rank: idx + 1,
            company,
            total_value: format_number(total, 2),
            volume: format_number(volume, 0),
        })
        .collect()
}

pub fn record_rows(records: &[&CanonicalRecord], max: usize) -> Vec<RecordRow> {
    records
        .iter()
        .take(max)
        .map(|r| RecordRow {
            year: r.year,
            month: month_name(r.month),
            company: r.company.clone(),
            brand: r.brand.clone(),
            unit_price: format_number(r.unit_price, 2),
            volume: format_number(r.volume, 0),
            total_value: format_number(r.total_value, 2),
            category: r.category.label().to_string(),
            origin: r.origin.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, month: u32, company: &str, cat: Category, total: f64) -> CanonicalRecord {
        CanonicalRecord {
            company: company.to_string(),
            brand: String::new(),
            unit_price: total,
            volume: 1.0,
            total_value: total,
            year,
            month,
            origin: "teste.xlsx".to_string(),
            category: cat,
        }
    }

    fn sample() -> Vec<CanonicalRecord> {
        vec![
            rec(2024, 1, "RDF PAPELARIA", Category::Rdf, 100.0),
            rec(2024, 1, "ATUAL PAPELARIA", Category::Atual, 50.0),
            rec(2024, 2, "PAPEL SUL", Category::Outros, 30.0),
            rec(2025, 1, "RDF PAPELARIA", Category::Rdf, 200.0),
            rec(2025, 1, "DISTRIBUIDORA XYZ", Category::Outros, 20.0),
        ]
    }

    #[test]
    fn category_totals_conserve_the_grand_total() {
        let data = sample();
        let refs: Vec<&CanonicalRecord> = data.iter().collect();
        let by_cat = category_totals(&refs);
        let sum: f64 = by_cat.values().sum();
        assert_eq!(sum, grand_total(&refs));
        assert_eq!(sum, 400.0);
    }

    #[test]
    fn monthly_totals_conserve_too() {
        let data = sample();
        let refs: Vec<&CanonicalRecord> = data.iter().collect();
        let monthly = monthly_totals(&refs);
        let sum: f64 = monthly.values().map(|(t, _)| t).sum();
        assert_eq!(sum, grand_total(&refs));
    }

    #[test]
    fn share_and_growth() {
        let data = sample();
        let refs: Vec<&CanonicalRecord> = data.iter().collect();
        let (total, target, pct) = target_share(&refs);
        assert_eq!(total, 400.0);
        assert_eq!(target, 350.0);
        assert_eq!(pct, Some(87.5));

        let by_year = yearly_target_totals(&refs);
        let (base, cur, growth) = yoy_growth(&by_year).unwrap();
        assert_eq!((base, cur), (2024, 2025));
        // 150 -> 200
        assert!((growth - 33.333).abs() < 0.01);
    }

    #[test]
    fn growth_is_omitted_without_a_usable_base() {
        // Single year: nothing to compare.
        let one = vec![rec(2024, 1, "RDF", Category::Rdf, 10.0)];
        let refs: Vec<&CanonicalRecord> = one.iter().collect();
        assert!(yoy_growth(&yearly_target_totals(&refs)).is_none());

        // Base year present but with zero target sales.
        let mut by_year = BTreeMap::new();
        by_year.insert(2024, 0.0);
        by_year.insert(2025, 10.0);
        assert!(yoy_growth(&by_year).is_none());
    }

    #[test]
    fn share_is_omitted_on_empty_market() {
        let refs: Vec<&CanonicalRecord> = Vec::new();
        let (total, _, pct) = target_share(&refs);
        assert_eq!(total, 0.0);
        assert!(pct.is_none());
        assert!(generate_insights(&refs).is_empty());
    }

    #[test]
    fn filter_selects_years_and_months() {
        let data = sample();
        let mut f = Filter::all();
        assert_eq!(filter_records(&data, &f).len(), 5);
        f.years.insert(2025);
        assert_eq!(filter_records(&data, &f).len(), 2);
        f.months.insert(2);
        assert_eq!(filter_records(&data, &f).len(), 0);
    }

    #[test]
    fn ranks_other_companies_by_value() {
        let data = sample();
        let refs: Vec<&CanonicalRecord> = data.iter().collect();
        let top = top_other_companies(&refs, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "PAPEL SUL");
        assert_eq!(top[0].1, 30.0);
        assert_eq!(top_other_companies(&refs, 1).len(), 1);
    }

    #[test]
    fn best_month_tracks_targets_only() {
        let data = sample();
        let refs: Vec<&CanonicalRecord> = data.iter().collect();
        let (y, m, v) = best_target_month(&refs).unwrap();
        assert_eq!((y, m), (2025, 1));
        assert_eq!(v, 200.0);
    }
}
