use crate::normalize::{clean_digits, detect_doc_type, normalize_document};
use crate::types::{ExtractedTitle, Record};

pub const PROTOCOL_KEY_PREFIX: &str = "P:";
pub const ROW_KEY_PREFIX: &str = "ROWIDX:";

/// Flattens titles into one record per title x debtor pair. Title fields are
/// copied into every debtor row. `title_key` is left empty until
/// [`assign_title_keys`] runs over the assembled table.
pub fn build_records(source_file: &str, titles: &[ExtractedTitle]) -> Vec<Record> {
    let mut records = Vec::new();
    for title in titles {
        for debtor in &title.debtors {
            let documento_raw = debtor.documento_raw.as_deref();
            records.push(Record {
                source_file: source_file.to_string(),
                protocolo: title.fields.protocolo.clone(),
                numero_titulo: title.fields.numero_titulo.clone(),
                credor: title.fields.credor.clone(),
                valor_protestado: title.fields.valor_protestado.clone(),
                data_protesto: title.fields.data_protesto.clone(),
                devedor_nome: debtor.nome.clone(),
                devedor_documento_raw: debtor.documento_raw.clone(),
                devedor_documento: normalize_document(documento_raw),
                devedor_tipo: detect_doc_type(documento_raw),
                telefone_raw: debtor.telefone_raw.clone(),
                telefone: clean_digits(debtor.telefone_raw.as_deref()),
                title_key: String::new(),
            });
        }
    }
    records
}

/// Grouping identity for a row: declared title number, else `P:<protocolo>`,
/// else a key unique to the row position.
pub fn derive_title_key(record: &Record, row_index: usize) -> String {
    if let Some(numero) = non_blank(record.numero_titulo.as_deref()) {
        return numero.to_string();
    }
    if let Some(protocolo) = non_blank(record.protocolo.as_deref()) {
        return format!("{PROTOCOL_KEY_PREFIX}{protocolo}");
    }
    format!("{ROW_KEY_PREFIX}{row_index}")
}

/// Keys every row of an assembled table. Row positions are table-wide, so
/// run this once over the concatenated batch.
pub fn assign_title_keys(records: &mut [Record]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.title_key = derive_title_key(record, index);
    }
}

// Values are kept verbatim; blankness only decides whether a rule applies.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
