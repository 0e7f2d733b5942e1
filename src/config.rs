// Pipeline configuration.
//
// Everything the pipeline needs to know about the source spreadsheets lives
// in one immutable `Config` value handed to the entry points, so tests can
// run the same code against synthetic vocabularies and directories.
use crate::types::Field;
use std::path::PathBuf;

/// One logical source: a filename glob plus the year/semester it covers and
/// the header-row index to fall back to when detection finds nothing.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    pub pattern: String,
    pub year: i32,
    pub semester: u8,
    pub fallback_header_row: usize,
}

/// Candidate keywords and label blacklist for one canonical field.
/// `candidates` is a priority list: the first keyword with a surviving
/// column match wins.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field: Field,
    pub candidates: Vec<String>,
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub output_dir: PathBuf,
    pub report_file: String,
    pub sources: Vec<SourcePattern>,
    /// Resolution order matters: price, company, brand, volume.
    pub field_specs: Vec<FieldSpec>,
    /// Bid-outcome vocabulary used to spot status columns posing as
    /// company columns.
    pub status_tokens: Vec<String>,
    /// Company strings exactly equal to one of these are dropped during
    /// cleaning (an outcome value that leaked through resolution).
    pub company_reject_tokens: Vec<String>,
    pub header_keywords: Vec<String>,
    pub header_scan_rows: usize,
    pub header_match_threshold: usize,
    /// A company-candidate column is rejected when more than this share of
    /// its non-empty values look like outcome tokens.
    pub status_ratio: f64,
    pub months: Vec<(String, u32)>,
    pub target_rdf: Vec<String>,
    pub target_atual: Vec<String>,
    pub top_n_others: usize,
}

fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_dir: PathBuf::from("."),
            output_dir: PathBuf::from("analysis_output"),
            report_file: "sales_analysis_report.txt".to_string(),
            sources: vec![
                SourcePattern {
                    pattern: "*1º SEMESTRE 2024*.xlsx".to_string(),
                    year: 2024,
                    semester: 1,
                    fallback_header_row: 0,
                },
                SourcePattern {
                    pattern: "*2º SEMESTRE 2024*.xlsb".to_string(),
                    year: 2024,
                    semester: 2,
                    fallback_header_row: 0,
                },
                SourcePattern {
                    pattern: "*1º SEMESTRE 2025*.xlsb".to_string(),
                    year: 2025,
                    semester: 1,
                    fallback_header_row: 0,
                },
                SourcePattern {
                    pattern: "*2º SEMESTRE 2025*.xlsb".to_string(),
                    year: 2025,
                    semester: 2,
                    fallback_header_row: 0,
                },
            ],
            field_specs: vec![
                FieldSpec {
                    field: Field::UnitPrice,
                    candidates: strs(&["R$ FINAL", "R$ RESMA", "R$ TOTAL", "VALOR"]),
                    blacklist: strs(&["ANTERIOR", "ESTIMADO", "DIFERENÇA"]),
                },
                FieldSpec {
                    field: Field::Company,
                    candidates: strs(&["VENCEDOR", "RAZÃO SOCIAL", "PARCEIRO", "FORNECEDOR"]),
                    blacklist: strs(&[
                        "ANTERIOR",
                        "STATUS",
                        "SITUAÇÃO",
                        "RESULTADO",
                        "COLOCAÇÃO",
                        "ULTIMO",
                    ]),
                },
                FieldSpec {
                    field: Field::Brand,
                    candidates: strs(&["MARCA"]),
                    blacklist: vec![],
                },
                FieldSpec {
                    field: Field::Volume,
                    candidates: strs(&["VOLUME (RESMAS)", "VOLUME", "QUANTIDADE", "QTD"]),
                    blacklist: vec![],
                },
            ],
            status_tokens: strs(&[
                "GANHAMOS",
                "PERDEMOS",
                "SUSPENSA",
                "SUSPENSO",
                "ADIADO",
                "ADIOU",
                "CANCELADO",
                "FRACASSADO",
                "DESCLASSIFICADO",
                "NÃO PARTICIPAMOS",
            ]),
            company_reject_tokens: strs(&[
                "GANHAMOS",
                "PERDEMOS",
                "DESCLASSIFICADO",
                "FRACASSADO",
            ]),
            header_keywords: strs(&[
                "DATA DO EVENTO",
                "NRO DO PREGÃO",
                "VOLUME",
                "VENCEDOR",
                "VALOR",
                "EMPRESA",
                "PARCEIRO",
                "R$ FINAL",
            ]),
            header_scan_rows: 10,
            header_match_threshold: 3,
            status_ratio: 0.3,
            months: vec![
                ("JANEIRO".to_string(), 1),
                ("FEVEREIRO".to_string(), 2),
                ("MARÇO".to_string(), 3),
                ("MARCO".to_string(), 3),
                ("ABRIL".to_string(), 4),
                ("MAIO".to_string(), 5),
                ("JUNHO".to_string(), 6),
                ("JULHO".to_string(), 7),
                ("AGOSTO".to_string(), 8),
                ("SETEMBRO".to_string(), 9),
                ("OUTUBRO".to_string(), 10),
                ("NOVEMBRO".to_string(), 11),
                ("DEZEMBRO".to_string(), 12),
            ],
            target_rdf: strs(&["RDF", "RD F", "R.D.F"]),
            target_atual: strs(&["ATUAL"]),
            top_n_others: 10,
        }
    }
}
