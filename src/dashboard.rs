// Interactive dashboard over the loaded dataset.
//
// A terminal rendition of the original single-page dashboard: the same
// year/month filters, KPI metrics, insight sentences, tables and debug
// panel, driven by a prompt loop. Chart exports re-render the plotters
// PNGs against the current filter.
use crate::charts;
use crate::clean::CleanReport;
use crate::config::Config;
use crate::loader::{list_base_dir, LoadReport};
use crate::output::preview_table_rows;
use crate::reports::{
    category_rows, filter_records, generate_insights, monthly_rows, other_rows, record_rows,
    target_share, Filter,
};
use crate::types::{CanonicalRecord, Category};
use crate::util::{format_brl, format_int, format_number, month_name};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::str::FromStr;

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Parse a comma-separated selection; anything unparsable is ignored.
/// An empty input clears the filter (select everything).
fn parse_selection<T: FromStr + Ord>(input: &str) -> BTreeSet<T> {
    input
        .split(',')
        .filter_map(|p| p.trim().parse::<T>().ok())
        .collect()
}

fn print_kpis(filtered: &[&CanonicalRecord]) {
    let (total, target, pct) = target_share(filtered);
    println!("Vendas Totais:          {}", format_brl(total));
    match pct {
        Some(pct) => println!(
            "Vendas RDF + ATUAL:     {} ({}% share)",
            format_brl(target),
            format_number(pct, 1)
        ),
        None => println!("Vendas RDF + ATUAL:     {}", format_brl(target)),
    }
    println!("Vendas Outras Empresas: {}", format_brl(total - target));
}

fn print_debug_panel(
    records: &[CanonicalRecord],
    load_report: &LoadReport,
    clean_report: &CleanReport,
) {
    println!("--- Debug ---");
    if load_report.logs.is_empty() {
        println!("Nenhuma falha de carga/mapeamento registrada.");
    } else {
        for log in &load_report.logs {
            println!("  {}", log);
        }
    }
    println!(
        "Carga: {} arquivos, {} planilhas processadas, {} ignoradas, {} linhas.",
        load_report.files_found,
        load_report.sheets_processed,
        load_report.sheets_skipped,
        format_int(load_report.rows_extracted as i64)
    );
    println!(
        "Limpeza: {} de {} linhas mantidas ({} empresa vazia, {} status, {} valor zerado).",
        format_int(clean_report.kept as i64),
        format_int(clean_report.input_rows as i64),
        clean_report.dropped_empty_company,
        clean_report.dropped_status_token,
        clean_report.dropped_zero_price
    );
    println!("Amostra de Categorias:");
    for cat in Category::ALL {
        let count = records.iter().filter(|r| r.category == cat).count();
        println!("  {:<8} {}", cat.label(), format_int(count as i64));
    }
    println!();
}

fn export_charts(cfg: &Config, filtered: &[&CanonicalRecord]) {
    if let Err(e) = std::fs::create_dir_all(&cfg.output_dir) {
        eprintln!("Erro ao criar {}: {}", cfg.output_dir.display(), e);
        return;
    }
    let finish = |name: &str, path: &std::path::Path, res: Result<(), Box<dyn std::error::Error>>| {
        match res {
            Ok(()) if path.exists() => println!("Gráfico salvo: {}", path.display()),
            Ok(()) => println!("Sem dados para {}", name),
            Err(e) => eprintln!("Erro ao gerar {}: {}", name, e),
        }
    };
    let p = cfg.output_dir.join("dash_vendas_mensais.png");
    finish("dash_vendas_mensais.png", &p, charts::monthly_sales_chart(&p, filtered));
    let p = cfg.output_dir.join("dash_comparativo_anual.png");
    finish("dash_comparativo_anual.png", &p, charts::target_yoy_chart(&p, filtered));
    let p = cfg.output_dir.join("dash_participacao.png");
    finish("dash_participacao.png", &p, charts::share_donut_chart(&p, filtered));
    let p = cfg.output_dir.join("dash_top_outros.png");
    finish(
        "dash_top_outros.png",
        &p,
        charts::top_others_chart(&p, filtered, cfg.top_n_others),
    );
    println!();
}

pub fn run(
    cfg: &Config,
    records: &[CanonicalRecord],
    load_report: &LoadReport,
    clean_report: &CleanReport,
) {
    if records.is_empty() {
        println!("Nenhum dado encontrado após filtros.");
        println!("Arquivos em {}:", cfg.base_dir.display());
        for f in list_base_dir(&cfg.base_dir) {
            println!("  {}", f);
        }
        print_debug_panel(records, load_report, clean_report);
        return;
    }

    let all_years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    let all_months: BTreeSet<u32> = records.iter().map(|r| r.month).collect();
    let mut filter = Filter::all();

    loop {
        let filtered = filter_records(records, &filter);

        println!("=== Dashboard de Vendas: RDF & ATUAL vs Mercado ===");
        let years_desc = if filter.years.is_empty() {
            "todos".to_string()
        } else {
            filter
                .years
                .iter()
                .map(|y| y.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let months_desc = if filter.months.is_empty() {
            "todos".to_string()
        } else {
            filter
                .months
                .iter()
                .map(|m| month_name(*m))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("Filtro: anos [{}], meses [{}]\n", years_desc, months_desc);

        if filtered.is_empty() {
            println!("Nenhum dado encontrado após filtros.\n");
        } else {
            print_kpis(&filtered);
            println!();
            for insight in generate_insights(&filtered) {
                println!("- {}", insight);
            }
            println!();
        }

        println!("[1] Filtrar anos        [2] Filtrar meses");
        println!("[3] Evolução mensal     [4] Participação");
        println!("[5] Top {} outras empresas", cfg.top_n_others);
        println!("[6] Dados brutos        [7] Debug");
        println!("[8] Exportar gráficos   [0] Voltar\n");

        match read_line("Enter choice: ").as_str() {
            "1" => {
                let opts: Vec<String> = all_years.iter().map(|y| y.to_string()).collect();
                println!("Anos disponíveis: {}", opts.join(", "));
                let input = read_line("Anos (separados por vírgula, vazio = todos): ");
                filter.years = parse_selection(&input);
            }
            "2" => {
                let opts: Vec<String> = all_months
                    .iter()
                    .map(|m| format!("{} ({})", m, month_name(*m)))
                    .collect();
                println!("Meses disponíveis: {}", opts.join(", "));
                let input = read_line("Meses (separados por vírgula, vazio = todos): ");
                filter.months = parse_selection(&input);
            }
            "3" => preview_table_rows(&monthly_rows(&filtered), usize::MAX),
            "4" => preview_table_rows(&category_rows(&filtered), usize::MAX),
            "5" => preview_table_rows(&other_rows(&filtered, cfg.top_n_others), usize::MAX),
            "6" => preview_table_rows(&record_rows(&filtered, 20), 20),
            "7" => print_debug_panel(records, load_report, clean_report),
            "8" => export_charts(cfg, &filtered),
            "0" => break,
            _ => println!("Opção inválida.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parsing_ignores_garbage() {
        let years: BTreeSet<i32> = parse_selection("2024, 2025, abc");
        assert_eq!(years.len(), 2);
        assert!(years.contains(&2024));
        assert!(years.contains(&2025));
        let empty: BTreeSet<u32> = parse_selection("");
        assert!(empty.is_empty());
    }
}
