// Entry point and high-level CLI flow.
//
// - Option [1] discovers and loads the half-year spreadsheets, printing
//   a short summary of what was extracted and cleaned.
// - Option [2] generates the batch outputs: text report, chart PNGs,
//   CSV table exports and a JSON summary.
// - Option [3] opens the interactive dashboard over the loaded data.
mod charts;
mod clean;
mod config;
mod dashboard;
mod header;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use clean::CleanReport;
use config::Config;
use loader::LoadReport;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use types::CanonicalRecord;

// In-memory app state so the spreadsheets are read and cleaned once per
// run while reports and the dashboard can be opened repeatedly.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<LoadedData>,
}

#[derive(Clone)]
struct LoadedData {
    records: Vec<CanonicalRecord>,
    load_report: LoadReport,
    clean_report: CleanReport,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: discover, load and clean the spreadsheets.
fn handle_load(cfg: &Config) {
    let (raw, load_report) = loader::load_data(cfg);
    let (records, clean_report) = clean::clean_records(cfg, raw);
    println!(
        "Processando planilhas... ({} linhas extraídas, {} mantidas após limpeza)",
        util::format_int(load_report.rows_extracted as i64),
        util::format_int(clean_report.kept as i64)
    );
    if !load_report.logs.is_empty() {
        println!(
            "Aviso: {} falhas de carga/mapeamento (detalhes no painel Debug do dashboard).",
            load_report.logs.len()
        );
    }
    println!();
    let mut state = APP_STATE.lock().unwrap();
    state.data = Some(LoadedData {
        records,
        load_report,
        clean_report,
    });
}

fn loaded_data() -> Option<LoadedData> {
    let state = APP_STATE.lock().unwrap();
    state.data.clone()
}

/// Handle option [2]: generate every batch artifact.
///
/// Side-effectful on purpose: writes the text report, two chart PNGs, the
/// CSV exports of the aggregate tables and a JSON summary, and prints
/// markdown previews of each table to the console.
fn handle_generate_reports(cfg: &Config) {
    let Some(data) = loaded_data() else {
        println!("Erro: nenhum dado carregado. Use a opção 1 primeiro.\n");
        return;
    };
    let records: Vec<&CanonicalRecord> = data.records.iter().collect();
    if records.is_empty() {
        println!("Nenhum dado para agregar; nada foi gerado.\n");
        return;
    }

    if let Err(e) = std::fs::create_dir_all(&cfg.output_dir) {
        eprintln!("Erro ao criar {}: {}", cfg.output_dir.display(), e);
        return;
    }
    println!("Gerando relatórios em {}...\n", cfg.output_dir.display());

    let report_path = cfg.output_dir.join(&cfg.report_file);
    if let Err(e) = output::write_text_report(&report_path, &records) {
        eprintln!("Erro de escrita: {}", e);
    }
    println!("Relatório salvo: {}", report_path.display());

    let monthly = reports::monthly_rows(&records);
    let monthly_csv = cfg.output_dir.join("vendas_mensais.csv");
    if let Err(e) = output::write_csv(&monthly_csv, &monthly) {
        eprintln!("Erro de escrita: {}", e);
    }
    println!("\nVendas Mensais por Categoria\n");
    output::preview_table_rows(&monthly, 6);

    let by_year = reports::year_rows(&records);
    let year_csv = cfg.output_dir.join("vendas_anuais.csv");
    if let Err(e) = output::write_csv(&year_csv, &by_year) {
        eprintln!("Erro de escrita: {}", e);
    }
    println!("Vendas por Ano\n");
    output::preview_table_rows(&by_year, 6);

    let others = reports::other_rows(&records, cfg.top_n_others);
    let others_csv = cfg.output_dir.join("top_outras_empresas.csv");
    if let Err(e) = output::write_csv(&others_csv, &others) {
        eprintln!("Erro de escrita: {}", e);
    }
    println!("Top Outras Empresas\n");
    output::preview_table_rows(&others, 5);

    let summary = reports::generate_summary(&records);
    if let Err(e) = output::write_json(&cfg.output_dir.join("summary.json"), &summary) {
        eprintln!("Erro de escrita: {}", e);
    }

    let chart1 = cfg.output_dir.join("vendas_mensais.png");
    if let Err(e) = charts::monthly_sales_chart(&chart1, &records) {
        eprintln!("Erro de gráfico: {}", e);
    }
    let chart2 = cfg.output_dir.join("volume_anual.png");
    if let Err(e) = charts::annual_volume_chart(&chart2, &records) {
        eprintln!("Erro de gráfico: {}", e);
    }

    println!("Insights:");
    for insight in reports::generate_insights(&records) {
        println!("- {}", insight);
    }
    println!();
}

/// Handle option [3]: the interactive dashboard.
fn handle_dashboard(cfg: &Config) {
    let Some(data) = loaded_data() else {
        println!("Erro: nenhum dado carregado. Use a opção 1 primeiro.\n");
        return;
    };
    dashboard::run(cfg, &data.records, &data.load_report, &data.clean_report);
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env).init();

    let cfg = Config::default();
    loop {
        println!("Análise de Cobertura de Preços");
        println!("[1] Carregar planilhas");
        println!("[2] Gerar relatórios");
        println!("[3] Dashboard interativo");
        println!("[0] Sair\n");
        match read_choice().as_str() {
            "1" => handle_load(&cfg),
            "2" => {
                println!();
                handle_generate_reports(&cfg);
            }
            "3" => handle_dashboard(&cfg),
            "0" => {
                println!("Encerrando.");
                break;
            }
            _ => println!("Opção inválida.\n"),
        }
    }
}
