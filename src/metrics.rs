use crate::types::{DocType, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One document seen under more than one distinct protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiProtocolRow {
    pub devedor_documento: String,
    pub qtd_protocolos_unicos: usize,
    /// Sorted distinct protocols joined by `", "`.
    pub protocolos_unicos: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_titulos: usize,
    pub titles_with_phone: usize,
    pub titles_with_cpf: usize,
    pub titles_with_cnpj: usize,
    pub titles_with_both: usize,
    pub qtd_cpfs_unicos: usize,
    pub qtd_cnpjs_unicos: usize,
    pub unique_devedores_total: usize,
    pub cpf_multi: Vec<MultiProtocolRow>,
    pub cnpj_multi: Vec<MultiProtocolRow>,
    pub cpf_multi_count: usize,
    pub cnpj_multi_count: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct TitleFlags {
    phone: bool,
    cpf: bool,
    cnpj: bool,
}

pub fn compute_metrics(records: &[Record]) -> Metrics {
    let mut titles: BTreeMap<&str, TitleFlags> = BTreeMap::new();
    for record in records {
        let flags = titles.entry(record.title_key.as_str()).or_default();
        flags.phone |= record.has_phone();
        flags.cpf |= record.devedor_tipo == DocType::Cpf;
        flags.cnpj |= record.devedor_tipo == DocType::Cnpj;
    }

    let cpf_multi = protocols_multi_by_type(records, DocType::Cpf);
    let cnpj_multi = protocols_multi_by_type(records, DocType::Cnpj);

    Metrics {
        total_titulos: titles.len(),
        titles_with_phone: count_titles(&titles, |f| f.phone),
        titles_with_cpf: count_titles(&titles, |f| f.cpf),
        titles_with_cnpj: count_titles(&titles, |f| f.cnpj),
        titles_with_both: count_titles(&titles, |f| f.cpf && f.cnpj),
        qtd_cpfs_unicos: unique_documents(records, Some(DocType::Cpf)).len(),
        qtd_cnpjs_unicos: unique_documents(records, Some(DocType::Cnpj)).len(),
        unique_devedores_total: unique_documents(records, None).len(),
        cpf_multi_count: cpf_multi.len(),
        cnpj_multi_count: cnpj_multi.len(),
        cpf_multi,
        cnpj_multi,
    }
}

fn count_titles(titles: &BTreeMap<&str, TitleFlags>, pred: impl Fn(&TitleFlags) -> bool) -> usize {
    titles.values().filter(|flags| pred(flags)).count()
}

/// Distinct normalized documents, optionally restricted to one type.
fn unique_documents(records: &[Record], doc_type: Option<DocType>) -> BTreeSet<&str> {
    records
        .iter()
        .filter(|r| doc_type.map_or(true, |t| r.devedor_tipo == t))
        .filter_map(|r| r.devedor_documento.as_deref())
        .collect()
}

#[derive(Default)]
struct DocumentProtocols {
    protocols: BTreeSet<String>,
    types: BTreeSet<DocType>,
}

/// Documents that appear under more than one distinct protocol and were
/// classified as `doc_type` on at least one of their rows. A document typed
/// CPF once and UNKNOWN elsewhere still counts as CPF.
pub fn protocols_multi_by_type(records: &[Record], doc_type: DocType) -> Vec<MultiProtocolRow> {
    let mut by_document: BTreeMap<&str, DocumentProtocols> = BTreeMap::new();
    for record in records {
        let Some(documento) = record.devedor_documento.as_deref() else {
            continue;
        };
        let entry = by_document.entry(documento).or_default();
        entry.types.insert(record.devedor_tipo);
        if let Some(protocolo) = record.protocolo.as_deref().map(str::trim) {
            if !protocolo.is_empty() {
                entry.protocols.insert(protocolo.to_string());
            }
        }
    }

    by_document
        .into_iter()
        .filter(|(_, seen)| seen.protocols.len() > 1 && seen.types.contains(&doc_type))
        .map(|(documento, seen)| MultiProtocolRow {
            devedor_documento: documento.to_string(),
            qtd_protocolos_unicos: seen.protocols.len(),
            protocolos_unicos: seen.protocols.into_iter().collect::<Vec<_>>().join(", "),
        })
        .collect()
}

/// Sorted distinct CPF and CNPJ documents.
pub fn document_lists(records: &[Record]) -> (Vec<String>, Vec<String>) {
    let collect = |doc_type: DocType| -> Vec<String> {
        unique_documents(records, Some(doc_type))
            .into_iter()
            .map(str::to_string)
            .collect()
    };
    (collect(DocType::Cpf), collect(DocType::Cnpj))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, protocolo: Option<&str>, documento: Option<&str>, tipo: DocType) -> Record {
        Record {
            source_file: "a.xml".to_string(),
            protocolo: protocolo.map(str::to_string),
            numero_titulo: None,
            credor: None,
            valor_protestado: None,
            data_protesto: None,
            devedor_nome: None,
            devedor_documento_raw: documento.map(str::to_string),
            devedor_documento: documento.map(str::to_string),
            devedor_tipo: tipo,
            telefone_raw: None,
            telefone: None,
            title_key: key.to_string(),
        }
    }

    #[test]
    fn test_title_coverage_counts() {
        let mut with_phone = row("T1", Some("A1"), Some("12345678909"), DocType::Cpf);
        with_phone.telefone = Some("11999990000".to_string());
        let records = vec![
            with_phone,
            row("T1", Some("A1"), Some("12345678000195"), DocType::Cnpj),
            row("T2", Some("A2"), Some("12345678000195"), DocType::Cnpj),
            row("T3", None, None, DocType::Unknown),
        ];
        let metrics = compute_metrics(&records);
        assert_eq!(metrics.total_titulos, 3);
        assert_eq!(metrics.titles_with_phone, 1);
        assert_eq!(metrics.titles_with_cpf, 1);
        assert_eq!(metrics.titles_with_cnpj, 2);
        assert_eq!(metrics.titles_with_both, 1);
        assert_eq!(metrics.qtd_cpfs_unicos, 1);
        assert_eq!(metrics.qtd_cnpjs_unicos, 1);
        assert_eq!(metrics.unique_devedores_total, 2);
    }

    #[test]
    fn test_blank_phone_does_not_count() {
        let mut blank = row("T1", None, None, DocType::Unknown);
        blank.telefone = Some("  ".to_string());
        assert_eq!(compute_metrics(&[blank]).titles_with_phone, 0);
    }

    #[test]
    fn test_multi_protocol_trims_and_dedupes() {
        let records = vec![
            row("T1", Some(" A2 "), Some("12345678909"), DocType::Cpf),
            row("T2", Some("A1"), Some("12345678909"), DocType::Unknown),
            row("T3", Some("A2"), Some("12345678909"), DocType::Cpf),
            row("T4", Some(""), Some("12345678909"), DocType::Cpf),
        ];
        let table = protocols_multi_by_type(&records, DocType::Cpf);
        assert_eq!(
            table,
            vec![MultiProtocolRow {
                devedor_documento: "12345678909".to_string(),
                qtd_protocolos_unicos: 2,
                protocolos_unicos: "A1, A2".to_string(),
            }]
        );
        assert!(protocols_multi_by_type(&records, DocType::Cnpj).is_empty());
    }

    #[test]
    fn test_any_positive_classification_qualifies() {
        let records = vec![
            row("T1", Some("A1"), Some("12345678909"), DocType::Unknown),
            row("T2", Some("A2"), Some("12345678909"), DocType::Cpf),
        ];
        assert_eq!(protocols_multi_by_type(&records, DocType::Cpf).len(), 1);
    }

    #[test]
    fn test_single_protocol_documents_are_excluded() {
        let records = vec![
            row("T1", Some("A1"), Some("12345678909"), DocType::Cpf),
            row("T2", Some("A1"), Some("12345678909"), DocType::Cpf),
            row("T3", None, Some("12345678909"), DocType::Cpf),
        ];
        assert!(protocols_multi_by_type(&records, DocType::Cpf).is_empty());
    }

    #[test]
    fn test_document_lists_are_sorted() {
        let records = vec![
            row("T1", None, Some("98765432100"), DocType::Cpf),
            row("T2", None, Some("12345678909"), DocType::Cpf),
            row("T3", None, Some("12345678000195"), DocType::Cnpj),
            row("T4", None, Some("12345678909"), DocType::Cpf),
        ];
        let (cpfs, cnpjs) = document_lists(&records);
        assert_eq!(cpfs, vec!["12345678909", "98765432100"]);
        assert_eq!(cnpjs, vec!["12345678000195"]);
    }
}
