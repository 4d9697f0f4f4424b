use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Debtor document classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "CPF")]
    Cpf,
    #[serde(rename = "CNPJ")]
    Cnpj,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Cpf => "CPF",
            DocType::Cnpj => "CNPJ",
            DocType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CPF" => Ok(DocType::Cpf),
            "CNPJ" => Ok(DocType::Cnpj),
            "UNKNOWN" => Ok(DocType::Unknown),
            other => Err(format!("Unknown document type: {other}")),
        }
    }
}

/// One uploaded XML document and the label it was uploaded under.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Scalar fields pulled from a title node. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFields {
    pub protocolo: Option<String>,
    pub numero_titulo: Option<String>,
    pub credor: Option<String>,
    pub valor_protestado: Option<String>,
    pub data_protesto: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtorFields {
    pub nome: Option<String>,
    pub documento_raw: Option<String>,
    pub telefone_raw: Option<String>,
}

/// A title together with the debtors found for it. `debtors` is never empty:
/// a title without debtor elements carries one implicit debtor read from the
/// title node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTitle {
    pub fields: TitleFields,
    pub debtors: Vec<DebtorFields>,
}

/// One flattened title x debtor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub source_file: String,
    pub protocolo: Option<String>,
    pub numero_titulo: Option<String>,
    pub credor: Option<String>,
    pub valor_protestado: Option<String>,
    pub data_protesto: Option<String>,
    pub devedor_nome: Option<String>,
    pub devedor_documento_raw: Option<String>,
    pub devedor_documento: Option<String>,
    pub devedor_tipo: DocType,
    pub telefone_raw: Option<String>,
    pub telefone: Option<String>,
    pub title_key: String,
}

impl Record {
    pub fn has_phone(&self) -> bool {
        self.telefone
            .as_deref()
            .is_some_and(|phone| !phone.trim().is_empty())
    }
}

/// `TotalTitulos` value a file declares about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredTotal {
    pub source_file: String,
    pub total: u64,
}

pub const EMPTY_BATCH_MESSAGE: &str = "no records extracted";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub records: Vec<Record>,
    /// `"<filename>: <message>"` per file that could not be parsed.
    pub errors: Vec<String>,
    pub declared_totals: Vec<DeclaredTotal>,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn message(&self) -> Option<&'static str> {
        if self.is_empty() {
            Some(EMPTY_BATCH_MESSAGE)
        } else {
            None
        }
    }
}
