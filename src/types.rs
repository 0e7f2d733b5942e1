use serde::Serialize;
use tabled::Tabled;

/// Canonical fields every source sheet is mapped onto. The resolver works
/// through these in priority order: price first, volume last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    UnitPrice,
    Company,
    Brand,
    Volume,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::UnitPrice => "Valor_Unitario",
            Field::Company => "Empresa",
            Field::Brand => "Marca",
            Field::Volume => "Volume",
        }
    }
}

/// Vendor bucket: the two tracked companies plus everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Rdf,
    Atual,
    Outros,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Rdf, Category::Atual, Category::Outros];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Rdf => "RDF",
            Category::Atual => "ATUAL",
            Category::Outros => "OUTROS",
        }
    }

    pub fn is_target(&self) -> bool {
        !matches!(self, Category::Outros)
    }
}

/// One sheet row as extracted: resolved cells still in their raw string
/// form, plus provenance from the source file and sheet.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub company: String,
    pub brand: String,
    pub unit_price_raw: String,
    pub volume_raw: String,
    pub year: i32,
    pub month: u32,
    pub origin: String,
}

/// The unit of the normalized dataset, produced by the cleaning stage.
/// `total_value` and `category` are derived once and never recomputed.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub company: String,
    pub brand: String,
    pub unit_price: f64,
    pub volume: f64,
    pub total_value: f64,
    pub year: i32,
    pub month: u32,
    pub origin: String,
    pub category: Category,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyCategoryRow {
    #[serde(rename = "Ano")]
    #[tabled(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Mes")]
    #[tabled(rename = "Mes")]
    pub month: String,
    #[serde(rename = "Categoria")]
    #[tabled(rename = "Categoria")]
    pub category: String,
    #[serde(rename = "TotalVenda")]
    #[tabled(rename = "TotalVenda")]
    pub total_value: String,
    #[serde(rename = "Volume")]
    #[tabled(rename = "Volume")]
    pub volume: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryTotalRow {
    #[serde(rename = "Categoria")]
    #[tabled(rename = "Categoria")]
    pub category: String,
    #[serde(rename = "TotalVenda")]
    #[tabled(rename = "TotalVenda")]
    pub total_value: String,
    #[serde(rename = "Participacao")]
    #[tabled(rename = "Participacao")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearTotalRow {
    #[serde(rename = "Ano")]
    #[tabled(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "TotalVenda")]
    #[tabled(rename = "TotalVenda")]
    pub total_value: String,
    #[serde(rename = "VendaAlvo")]
    #[tabled(rename = "VendaAlvo")]
    pub target_value: String,
    #[serde(rename = "Participacao")]
    #[tabled(rename = "Participacao")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OtherCompanyRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Empresa")]
    #[tabled(rename = "Empresa")]
    pub company: String,
    #[serde(rename = "TotalVenda")]
    #[tabled(rename = "TotalVenda")]
    pub total_value: String,
    #[serde(rename = "Volume")]
    #[tabled(rename = "Volume")]
    pub volume: String,
}

/// Raw-table preview row for the dashboard's "Dados Brutos" view.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RecordRow {
    #[serde(rename = "Ano")]
    #[tabled(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Mes")]
    #[tabled(rename = "Mes")]
    pub month: String,
    #[serde(rename = "Empresa")]
    #[tabled(rename = "Empresa")]
    pub company: String,
    #[serde(rename = "Marca")]
    #[tabled(rename = "Marca")]
    pub brand: String,
    #[serde(rename = "ValorUnitario")]
    #[tabled(rename = "ValorUnitario")]
    pub unit_price: String,
    #[serde(rename = "Volume")]
    #[tabled(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "TotalVenda")]
    #[tabled(rename = "TotalVenda")]
    pub total_value: String,
    #[serde(rename = "Categoria")]
    #[tabled(rename = "Categoria")]
    pub category: String,
    #[serde(rename = "Origem")]
    #[tabled(rename = "Origem")]
    pub origin: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub years: Vec<i32>,
    pub total_market: f64,
    pub target_value: f64,
    pub other_value: f64,
    pub target_share_pct: Option<f64>,
}
