use thiserror::Error;

/// Failure to read one document as well-formed XML. Scoped to a single file:
/// the batch records the message and moves on.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error at position {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Failed to decode document text: {0}")]
    Encoding(String),

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Extra content at the end of the document: <{0}>")]
    MultipleRoots(String),

    #[error("Text outside the root element at position {0}")]
    TextOutsideRoot(u64),

    #[error("Unexpected end tag </{0}>")]
    UnexpectedEndTag(String),

    #[error("Premature end of data: element <{0}> is not closed")]
    UnclosedElement(String),
}
