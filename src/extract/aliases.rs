use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TITLE_TAG: &str = "titulo";
pub const DEBTORS_TAG: &str = "devedores";
pub const DEBTOR_TAG: &str = "devedor";
pub const DECLARED_TOTAL_TAG: &str = "totaltitulos";

/// Logical fields looked up by local name anywhere below a title or debtor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Protocolo,
    NumeroTitulo,
    Credor,
    ValorProtestado,
    DataProtesto,
    DevedorNome,
    DevedorDocumento,
    Telefone,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Protocolo,
        Field::NumeroTitulo,
        Field::Credor,
        Field::ValorProtestado,
        Field::DataProtesto,
        Field::DevedorNome,
        Field::DevedorDocumento,
        Field::Telefone,
    ];

    pub fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Field::Protocolo => &["protocolo"],
            Field::NumeroTitulo => &["numerotitulo", "numero", "numero_titulo"],
            Field::Credor => &["credor", "reclamante", "exequente"],
            Field::ValorProtestado => &["valorprotestado", "valor"],
            Field::DataProtesto => &["dataprotesto", "data_protesto", "data"],
            Field::DevedorNome => &["nome", "nome_devedor", "nome_parte", "razao_social"],
            Field::DevedorDocumento => &["documento", "cpf", "cnpj", "doc", "documento_devedor"],
            Field::Telefone => &["telefone"],
        }
    }
}

/// Accepted local names per field, stored lower-cased in lookup priority
/// order (defaults first, configured extras after).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<Field, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let aliases = Field::ALL
            .iter()
            .map(|&field| {
                let names = field
                    .default_aliases()
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
                (field, names)
            })
            .collect();
        Self { aliases }
    }
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus every extra alias in `extra`.
    pub fn with_extra(extra: &BTreeMap<Field, Vec<String>>) -> Self {
        let mut table = Self::default();
        for (&field, names) in extra {
            for name in names {
                table.add(field, name);
            }
        }
        table
    }

    pub fn add(&mut self, field: Field, name: &str) -> &mut Self {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return self;
        }
        let names = self.aliases.entry(field).or_default();
        if !names.contains(&key) {
            names.push(key);
        }
        self
    }

    pub fn names(&self, field: Field) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn matches(&self, field: Field, local_name: &str) -> bool {
        let key = local_name.to_lowercase();
        self.names(field).iter().any(|name| *name == key)
    }
}
