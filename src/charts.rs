// Chart rendering with plotters.
//
// Chart colors follow the original dashboard palette. Every function is a
// no-op on empty input: no file is written and no error is raised, the
// caller's "no data" state covers it.
use crate::reports::{category_totals, monthly_totals, top_other_companies, yearly_totals,
    yearly_volume};
use crate::types::{CanonicalRecord, Category};
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use std::collections::BTreeSet;
use std::error::Error;
use std::path::Path;
use tracing::info;

fn category_color(cat: Category) -> RGBColor {
    match cat {
        Category::Rdf => RGBColor(31, 119, 180),
        Category::Atual => RGBColor(255, 127, 14),
        Category::Outros => RGBColor(214, 39, 40),
    }
}

/// Stacked monthly bars of total value, one color per category.
pub fn monthly_sales_chart(
    path: &Path,
    records: &[&CanonicalRecord],
) -> Result<(), Box<dyn Error>> {
    let monthly = monthly_totals(records);
    let months: Vec<NaiveDate> = monthly
        .keys()
        .filter_map(|(y, m, _)| NaiveDate::from_ymd_opt(*y, *m, 1))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if months.is_empty() {
        return Ok(());
    }

    let mut ymax = 0f64;
    for d in &months {
        let stacked: f64 = Category::ALL
            .iter()
            .filter_map(|c| monthly.get(&(d.year(), d.month(), *c)))
            .map(|(t, _)| *t)
            .sum();
        ymax = ymax.max(stacked);
    }
    if ymax <= 0.0 {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Vendas Mensais por Categoria", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0..months.len() as i32, 0f64..ymax * 1.05)?;
    let month_labels = months.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|x| {
            month_labels
                .get(*x as usize)
                .map(|d| d.format("%Y-%m").to_string())
                .unwrap_or_default()
        })
        .y_desc("Valor Total (R$)")
        .x_desc("Mês")
        .draw()?;

    let mut baseline = vec![0f64; months.len()];
    for cat in Category::ALL {
        let color = category_color(cat);
        let mut bars = Vec::new();
        for (i, d) in months.iter().enumerate() {
            let v = monthly
                .get(&(d.year(), d.month(), cat))
                .map(|(t, _)| *t)
                .unwrap_or(0.0);
            if v > 0.0 {
                bars.push(Rectangle::new(
                    [(i as i32, baseline[i]), (i as i32 + 1, baseline[i] + v)],
                    color.filled(),
                ));
            }
            baseline[i] += v;
        }
        chart
            .draw_series(bars)?
            .label(cat.label())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    info!("gráfico salvo: {}", path.display());
    Ok(())
}

/// Grouped bars: one group per label, one bar per series. Shared by the
/// annual volume and target year-over-year charts.
fn grouped_bar_chart(
    path: &Path,
    caption: &str,
    y_desc: &str,
    group_labels: &[String],
    series: &[(String, RGBColor, Vec<f64>)],
) -> Result<(), Box<dyn Error>> {
    if group_labels.is_empty() || series.is_empty() {
        return Ok(());
    }
    let ymax = series
        .iter()
        .flat_map(|(_, _, vals)| vals.iter().copied())
        .fold(0f64, f64::max);
    if ymax <= 0.0 {
        return Ok(());
    }

    // Each group occupies `series.len() + 1` slots, the last one a gap.
    let slot = series.len() + 1;
    let width = (group_labels.len() * slot) as i32;

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0..width, 0f64..ymax * 1.05)?;
    let labels = group_labels.to_vec();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(group_labels.len() * slot)
        .x_label_formatter(&|x| {
            let idx = *x as usize / slot;
            if *x as usize % slot == slot / 2 {
                labels.get(idx).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc(y_desc)
        .draw()?;

    for (k, (name, color, vals)) in series.iter().enumerate() {
        let color = *color;
        let mut bars = Vec::new();
        for (g, v) in vals.iter().enumerate() {
            if *v > 0.0 {
                let x0 = (g * slot + k) as i32;
                bars.push(Rectangle::new([(x0, 0.0), (x0 + 1, *v)], color.filled()));
            }
        }
        chart
            .draw_series(bars)?
            .label(name.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    info!("gráfico salvo: {}", path.display());
    Ok(())
}

/// Annual volume totals, grouped per year with one bar per category.
pub fn annual_volume_chart(
    path: &Path,
    records: &[&CanonicalRecord],
) -> Result<(), Box<dyn Error>> {
    let by_year_cat = yearly_volume(records);
    let years: Vec<i32> = by_year_cat
        .keys()
        .map(|(y, _)| *y)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if years.is_empty() {
        return Ok(());
    }
    let group_labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let series: Vec<(String, RGBColor, Vec<f64>)> = Category::ALL
        .iter()
        .map(|cat| {
            let vals = years
                .iter()
                .map(|y| by_year_cat.get(&(*y, *cat)).copied().unwrap_or(0.0))
                .collect();
            (cat.label().to_string(), category_color(*cat), vals)
        })
        .collect();
    grouped_bar_chart(
        path,
        "Volume Total de Vendas por Ano e Categoria",
        "Volume (Resmas)",
        &group_labels,
        &series,
    )
}

/// Year-over-year totals for the two tracked companies only.
pub fn target_yoy_chart(path: &Path, records: &[&CanonicalRecord]) -> Result<(), Box<dyn Error>> {
    let targets: Vec<&CanonicalRecord> = records
        .iter()
        .copied()
        .filter(|r| r.category.is_target())
        .collect();
    let monthly = monthly_totals(&targets);
    let years: Vec<i32> = yearly_totals(&targets).keys().copied().collect();
    if years.is_empty() {
        return Ok(());
    }
    let group_labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let series: Vec<(String, RGBColor, Vec<f64>)> = [Category::Rdf, Category::Atual]
        .iter()
        .map(|cat| {
            let vals = years
                .iter()
                .map(|y| {
                    monthly
                        .iter()
                        .filter(|((yy, _, cc), _)| yy == y && cc == cat)
                        .map(|(_, (t, _))| *t)
                        .sum()
                })
                .collect();
            (cat.label().to_string(), category_color(*cat), vals)
        })
        .collect();
    grouped_bar_chart(
        path,
        "Comparativo Anual RDF vs ATUAL",
        "Valor Total (R$)",
        &group_labels,
        &series,
    )
}

/// Donut of category share of total value.
pub fn share_donut_chart(path: &Path, records: &[&CanonicalRecord]) -> Result<(), Box<dyn Error>> {
    let by_cat = category_totals(records);
    let mut sizes = Vec::new();
    let mut colors = Vec::new();
    let mut labels = Vec::new();
    for cat in Category::ALL {
        let v = by_cat.get(&cat).copied().unwrap_or(0.0);
        if v > 0.0 {
            sizes.push(v);
            colors.push(category_color(cat));
            labels.push(cat.label().to_string());
        }
    }
    if sizes.is_empty() {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Participação por Categoria", ("sans-serif", 30))?;
    let center = (400, 290);
    let radius = 200.0;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 20).into_font());
    pie.percentages(("sans-serif", 16).into_font());
    pie.donut_hole(80.0);
    root.draw(&pie)?;
    root.present()?;
    info!("gráfico salvo: {}", path.display());
    Ok(())
}

/// Horizontal bars of the top-N OUTROS companies by total value.
pub fn top_others_chart(
    path: &Path,
    records: &[&CanonicalRecord],
    n: usize,
) -> Result<(), Box<dyn Error>> {
    let ranked = top_other_companies(records, n);
    if ranked.is_empty() {
        return Ok(());
    }
    let xmax = ranked.iter().map(|(_, t, _)| *t).fold(0f64, f64::max);
    if xmax <= 0.0 {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Top Outras Empresas por Valor", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d(0f64..xmax * 1.05, 0..ranked.len() as i32)?;
    let names: Vec<String> = ranked
        .iter()
        .map(|(name, _, _)| {
            if name.chars().count() > 30 {
                let short: String = name.chars().take(29).collect();
                format!("{}…", short)
            } else {
                name.clone()
            }
        })
        .collect();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(ranked.len())
        .y_label_formatter(&|y| names.get(*y as usize).cloned().unwrap_or_default())
        .x_desc("Valor Total (R$)")
        .draw()?;

    let color = category_color(Category::Outros);
    chart.draw_series(ranked.iter().enumerate().map(|(i, (_, total, _))| {
        Rectangle::new([(0.0, i as i32), (*total, i as i32 + 1)], color.filled())
    }))?;
    root.present()?;
    info!("gráfico salvo: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_writes_no_file() {
        let path = std::env::temp_dir().join("cobertura_report_empty_chart_test.png");
        let _ = std::fs::remove_file(&path);
        let records: Vec<&CanonicalRecord> = Vec::new();
        monthly_sales_chart(&path, &records).unwrap();
        annual_volume_chart(&path, &records).unwrap();
        target_yoy_chart(&path, &records).unwrap();
        share_donut_chart(&path, &records).unwrap();
        top_others_chart(&path, &records, 10).unwrap();
        assert!(!path.exists());
    }
}
