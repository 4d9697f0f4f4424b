use crate::types::{DocType, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One row per `title_key` for the per-title export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleSummary {
    pub titulo_chave: String,
    pub numero_titulo: Option<String>,
    pub protocolo: Option<String>,
    pub credor: Option<String>,
    pub data_protesto: Option<String>,
    pub valor_protestado: Option<String>,
    pub devedores_docs: String,
    pub tipos_devedores: String,
    pub tem_telefone: bool,
    pub arquivos: String,
}

/// Groups rows by title key (ascending). Scalar columns take the first
/// non-null value in row order; list columns are sorted distinct values.
pub fn summarize_titles(records: &[Record]) -> Vec<TitleSummary> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        groups.entry(record.title_key.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(key, rows)| {
            TitleSummary {
                titulo_chave: key.to_string(),
                numero_titulo: first_value(&rows, |r| r.numero_titulo.clone()),
                protocolo: first_value(&rows, |r| r.protocolo.clone()),
                credor: first_value(&rows, |r| r.credor.clone()),
                data_protesto: first_value(&rows, |r| r.data_protesto.clone()),
                valor_protestado: first_value(&rows, |r| r.valor_protestado.clone()),
                devedores_docs: join_distinct(
                    rows.iter().filter_map(|r| r.devedor_documento.as_deref()),
                ),
                tipos_devedores: join_distinct(rows.iter().map(|r| r.devedor_tipo.as_str())),
                tem_telefone: rows.iter().any(|r| r.has_phone()),
                arquivos: join_distinct(rows.iter().map(|r| r.source_file.as_str())),
            }
        })
        .collect()
}

fn first_value(rows: &[&Record], get: impl Fn(&Record) -> Option<String>) -> Option<String> {
    rows.iter().find_map(|row| get(row))
}

fn join_distinct<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Row selection for the analytic table. Unset criteria select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub files: Option<BTreeSet<String>>,
    #[serde(default)]
    pub types: Option<BTreeSet<DocType>>,
    #[serde(default)]
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(files) = &self.files {
            if !files.contains(&record.source_file) {
                return false;
            }
        }
        if let Some(types) = self.types.as_ref().filter(|t| !t.is_empty()) {
            if !types.contains(&record.devedor_tipo) {
                return false;
            }
        }
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(needle) => matches_search(record, needle),
            None => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

// Name and raw document match case-insensitively; the normalized document is
// digits (or trimmed raw text) and is compared as typed.
fn matches_search(record: &Record, needle: &str) -> bool {
    let lowered = needle.to_lowercase();
    let contains_lowered = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&lowered))
    };
    contains_lowered(&record.devedor_nome)
        || contains_lowered(&record.devedor_documento_raw)
        || record
            .devedor_documento
            .as_deref()
            .is_some_and(|doc| doc.contains(&lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(file: &str, key: &str, documento: Option<&str>, tipo: DocType) -> Record {
        Record {
            source_file: file.to_string(),
            protocolo: Some(format!("P-{key}")),
            numero_titulo: Some(key.to_string()),
            credor: None,
            valor_protestado: None,
            data_protesto: None,
            devedor_nome: Some("Maria Souza".to_string()),
            devedor_documento_raw: documento.map(str::to_string),
            devedor_documento: documento.map(str::to_string),
            devedor_tipo: tipo,
            telefone_raw: None,
            telefone: None,
            title_key: key.to_string(),
        }
    }

    #[test]
    fn test_summary_groups_by_title_key() {
        let mut second = row("b.xml", "T1", Some("12345678000195"), DocType::Cnpj);
        second.credor = Some("Banco".to_string());
        second.telefone = Some("1133334444".to_string());
        let records = vec![
            row("a.xml", "T2", None, DocType::Unknown),
            row("a.xml", "T1", Some("12345678909"), DocType::Cpf),
            second,
        ];

        let summary = summarize_titles(&records);
        assert_eq!(summary.len(), 2);
        let t1 = &summary[0];
        assert_eq!(t1.titulo_chave, "T1");
        assert_eq!(t1.credor.as_deref(), Some("Banco"));
        assert_eq!(t1.devedores_docs, "12345678000195, 12345678909");
        assert_eq!(t1.tipos_devedores, "CNPJ, CPF");
        assert!(t1.tem_telefone);
        assert_eq!(t1.arquivos, "a.xml, b.xml");

        let t2 = &summary[1];
        assert_eq!(t2.devedores_docs, "");
        assert_eq!(t2.tipos_devedores, "UNKNOWN");
        assert!(!t2.tem_telefone);
    }

    #[test]
    fn test_filter_by_file_and_type() {
        let records = vec![
            row("a.xml", "T1", Some("12345678909"), DocType::Cpf),
            row("b.xml", "T2", Some("12345678000195"), DocType::Cnpj),
        ];
        let filter = RecordFilter {
            files: Some(BTreeSet::from(["a.xml".to_string()])),
            ..RecordFilter::default()
        };
        assert_eq!(filter.apply(&records).len(), 1);

        let filter = RecordFilter {
            types: Some(BTreeSet::from([DocType::Cnpj])),
            ..RecordFilter::default()
        };
        assert_eq!(filter.apply(&records)[0].source_file, "b.xml");
    }

    #[test]
    fn test_filter_text_search() {
        let records = vec![row("a.xml", "T1", Some("12345678909"), DocType::Cpf)];
        let search = |needle: &str| RecordFilter {
            search: Some(needle.to_string()),
            ..RecordFilter::default()
        };
        assert_eq!(search("MARIA").apply(&records).len(), 1);
        assert_eq!(search("456789").apply(&records).len(), 1);
        assert_eq!(search("joao").apply(&records).len(), 0);
        assert_eq!(RecordFilter::default().apply(&records).len(), 1);
    }
}
