//! Tolerant extraction of titles and debtors from a parsed document.
//!
//! Providers disagree on nesting depth and tag casing, so nothing here
//! follows a schema: titles, debtors and fields are located by local name
//! anywhere below the node being read, and the first element with
//! non-blank text wins.

pub mod aliases;

use crate::normalize::clean_digits;
use crate::types::{DebtorFields, ExtractedTitle, TitleFields};
use crate::xml_tree::{find_all, first_text, XmlNode, XmlTree};
use aliases::{AliasTable, Field, DEBTORS_TAG, DEBTOR_TAG, DECLARED_TOTAL_TAG, TITLE_TAG};

pub struct Extractor<'a> {
    aliases: &'a AliasTable,
}

impl<'a> Extractor<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    /// Titles in document order, each paired with its debtors.
    pub fn extract(&self, tree: &XmlTree) -> Vec<ExtractedTitle> {
        title_nodes(tree)
            .into_iter()
            .map(|title| ExtractedTitle {
                fields: self.title_fields(title),
                debtors: debtor_nodes(title)
                    .into_iter()
                    .map(|debtor| self.debtor_fields(debtor))
                    .collect(),
            })
            .collect()
    }

    pub fn field(&self, node: XmlNode<'_>, field: Field) -> Option<String> {
        first_text(node, self.aliases.names(field))
    }

    fn title_fields(&self, title: XmlNode<'_>) -> TitleFields {
        TitleFields {
            protocolo: self.field(title, Field::Protocolo),
            numero_titulo: self.field(title, Field::NumeroTitulo),
            credor: self.field(title, Field::Credor),
            valor_protestado: self.field(title, Field::ValorProtestado),
            data_protesto: self.field(title, Field::DataProtesto),
        }
    }

    fn debtor_fields(&self, debtor: XmlNode<'_>) -> DebtorFields {
        DebtorFields {
            nome: self.field(debtor, Field::DevedorNome),
            documento_raw: self.field(debtor, Field::DevedorDocumento),
            telefone_raw: self.field(debtor, Field::Telefone),
        }
    }
}

/// Every `titulo` element anywhere in the document; the root itself when
/// there is none.
pub fn title_nodes(tree: &XmlTree) -> Vec<XmlNode<'_>> {
    let titles: Vec<_> = find_all(tree.root(), TITLE_TAG).collect();
    if titles.is_empty() {
        vec![tree.root()]
    } else {
        titles
    }
}

/// Debtors of a title, in order of preference:
/// `devedor` children of the first direct `devedores` child, then any
/// `devedor` below the title, then the title itself as an implicit debtor.
pub fn debtor_nodes(title: XmlNode<'_>) -> Vec<XmlNode<'_>> {
    let from_container: Vec<_> = title
        .children()
        .find(|child| child.value().is(DEBTORS_TAG))
        .map(|container| {
            container
                .children()
                .filter(|child| child.value().is(DEBTOR_TAG))
                .collect()
        })
        .unwrap_or_default();
    if !from_container.is_empty() {
        return from_container;
    }

    let anywhere: Vec<_> = find_all(title, DEBTOR_TAG).collect();
    if !anywhere.is_empty() {
        return anywhere;
    }

    vec![title]
}

/// The `TotalTitulos` count a document declares: the first such element
/// with non-blank text, if that text carries digits.
pub fn declared_total(tree: &XmlTree) -> Option<u64> {
    let text = find_all(tree.root(), DECLARED_TOTAL_TAG)
        .find_map(|node| node.value().trimmed_text())?;
    clean_digits(Some(text))?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_tree::parse_document;

    fn extract(xml: &str) -> Vec<ExtractedTitle> {
        let tree = parse_document(xml.as_bytes()).unwrap();
        let aliases = AliasTable::default();
        Extractor::new(&aliases).extract(&tree)
    }

    #[test]
    fn test_root_is_sole_title_without_titulo_elements() {
        let titles = extract("<registro><protocolo>P9</protocolo><nome>Ana</nome></registro>");
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].fields.protocolo.as_deref(), Some("P9"));
        assert_eq!(titles[0].debtors.len(), 1);
        assert_eq!(titles[0].debtors[0].nome.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_titles_found_at_any_depth_and_case() {
        let titles = extract(
            "<carta><lote><TITULO><NumeroTitulo>1</NumeroTitulo></TITULO></lote>\
             <titulos><Titulo><numero>2</numero></Titulo></titulos></carta>",
        );
        let numbers: Vec<_> = titles
            .iter()
            .map(|t| t.fields.numero_titulo.clone().unwrap())
            .collect();
        assert_eq!(numbers, vec!["1", "2"]);
    }

    #[test]
    fn test_prefers_devedores_container_over_stray_devedor() {
        let xml = "<titulo>\
            <devedores><devedor><nome>A</nome></devedor><devedor><nome>B</nome></devedor></devedores>\
            <anexo><devedor><nome>C</nome></devedor></anexo>\
        </titulo>";
        let titles = extract(xml);
        let names: Vec<_> = titles[0]
            .debtors
            .iter()
            .map(|d| d.nome.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_falls_back_to_nested_devedor_elements() {
        let xml = "<titulo><partes><devedor><nome>A</nome></devedor></partes>\
                   <outros><devedor><nome>B</nome></devedor></outros></titulo>";
        let titles = extract(xml);
        assert_eq!(titles[0].debtors.len(), 2);
    }

    #[test]
    fn test_title_without_debtors_yields_implicit_debtor() {
        let titles = extract("<titulo><protocolo>A1</protocolo></titulo>");
        assert_eq!(titles[0].debtors, vec![DebtorFields::default()]);
    }

    #[test]
    fn test_first_non_empty_phone_wins() {
        let xml = "<titulo><devedor><telefones><telefone/><telefone> (11) 4002-8922 </telefone>\
                   <telefone>999</telefone></telefones></devedor></titulo>";
        let titles = extract(xml);
        assert_eq!(
            titles[0].debtors[0].telefone_raw.as_deref(),
            Some("(11) 4002-8922")
        );
    }

    #[test]
    fn test_declared_total() {
        let tree = parse_document(b"<carta><TotalTitulos> 12 </TotalTitulos></carta>").unwrap();
        assert_eq!(declared_total(&tree), Some(12));
        let tree = parse_document(b"<carta><totaltitulos>n/a</totaltitulos></carta>").unwrap();
        assert_eq!(declared_total(&tree), None);
        let tree = parse_document(b"<carta/>").unwrap();
        assert_eq!(declared_total(&tree), None);
    }

    #[test]
    fn test_declared_total_skips_blank_elements() {
        let tree = parse_document(
            b"<carta><lote><TotalTitulos> </TotalTitulos></lote><TotalTitulos>7</TotalTitulos></carta>",
        )
        .unwrap();
        assert_eq!(declared_total(&tree), Some(7));
    }
}
