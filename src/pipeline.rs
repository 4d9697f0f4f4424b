use crate::config::AnalyzerConfig;
use crate::error::ParseError;
use crate::extract::aliases::AliasTable;
use crate::extract::{declared_total, Extractor};
use crate::metrics::{compute_metrics, Metrics};
use crate::records::{assign_title_keys, build_records};
use crate::runtime::inputs::InputEntry;
use crate::runtime::logging::{log_event, LogLevel};
use crate::summary::{summarize_titles, RecordFilter, TitleSummary};
use crate::types::{BatchResult, DeclaredTotal, Record, SourceFile};
use crate::xml_tree::parse_document;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Records read from one file, not yet keyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    pub records: Vec<Record>,
    pub declared_total: Option<u64>,
}

/// Outcome of one file, labeled with the name it was uploaded under.
pub type FileOutcome = (String, Result<FileExtraction, String>);

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    aliases: AliasTable,
}

impl Pipeline {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.alias_table())
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Parses and extracts one document.
    pub fn parse_file(&self, file: &SourceFile) -> Result<FileExtraction, ParseError> {
        let tree = parse_document(&file.content)?;
        let titles = Extractor::new(&self.aliases).extract(&tree);
        Ok(FileExtraction {
            records: build_records(&file.name, &titles),
            declared_total: declared_total(&tree),
        })
    }

    /// Runs a whole batch in input order. A file that fails to parse adds
    /// one error string and no records.
    pub fn analyze(&self, files: &[SourceFile]) -> BatchResult {
        assemble(files.iter().map(|file| self.outcome(file)).collect())
    }

    /// [`Pipeline::analyze`] over inputs read from disk. An input that could
    /// not be read reports its error in its own position.
    pub fn analyze_inputs(&self, inputs: &[InputEntry]) -> BatchResult {
        let outcomes = inputs
            .iter()
            .map(|input| match input {
                InputEntry::File(file) => self.outcome(file),
                InputEntry::Failed { label, message } => (label.clone(), Err(message.clone())),
            })
            .collect();
        assemble(outcomes)
    }

    fn outcome(&self, file: &SourceFile) -> FileOutcome {
        let result = self.parse_file(file).map_err(|e| e.to_string());
        (file.name.clone(), result)
    }

    /// Same result as [`Pipeline::analyze`], with each file parsed on a
    /// blocking worker. Outcomes are merged in input order.
    pub async fn analyze_concurrent(self: Arc<Self>, files: Vec<SourceFile>) -> BatchResult {
        let handles: Vec<_> = files
            .into_iter()
            .map(|file| {
                let pipeline = self.clone();
                let name = file.name.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline.parse_file(&file).map_err(|e| e.to_string())
                });
                (name, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(format!("parse task failed: {err}")),
            };
            outcomes.push((name, result));
        }
        assemble(outcomes)
    }
}

/// Concatenates per-file outcomes in order and keys the resulting table.
pub fn assemble(outcomes: Vec<FileOutcome>) -> BatchResult {
    let file_count = outcomes.len();
    let mut batch = BatchResult::default();

    for (name, outcome) in outcomes {
        match outcome {
            Ok(extraction) => {
                log_event(
                    LogLevel::Debug,
                    "file_parsed",
                    Some(json!({ "file": name, "records": extraction.records.len() })),
                );
                if let Some(total) = extraction.declared_total {
                    batch.declared_totals.push(DeclaredTotal {
                        source_file: name.clone(),
                        total,
                    });
                }
                batch.records.extend(extraction.records);
            }
            Err(message) => {
                log_event(
                    LogLevel::Warn,
                    "file_parse_failed",
                    Some(json!({ "file": name, "error": message })),
                );
                batch.errors.push(format!("{name}: {message}"));
            }
        }
    }

    assign_title_keys(&mut batch.records);

    log_event(
        LogLevel::Info,
        "batch_complete",
        Some(json!({
            "files": file_count,
            "records": batch.records.len(),
            "errors": batch.errors.len(),
        })),
    );
    if let Some(message) = batch.message() {
        log_event(LogLevel::Info, message, None);
    }
    batch
}

/// Everything a front end renders for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub records: Vec<Record>,
    pub errors: Vec<String>,
    pub declared_totals: Vec<DeclaredTotal>,
    pub metrics: Metrics,
    pub titles: Vec<TitleSummary>,
    pub message: Option<String>,
}

impl AnalysisReport {
    /// Metrics and title summaries always cover the full table; `filter`
    /// only narrows the returned rows.
    pub fn build(batch: BatchResult, filter: Option<&RecordFilter>) -> Self {
        let metrics = compute_metrics(&batch.records);
        let titles = summarize_titles(&batch.records);
        let message = batch.message().map(str::to_string);
        let records = match filter {
            Some(filter) => filter.apply(&batch.records).into_iter().cloned().collect(),
            None => batch.records,
        };
        Self {
            records,
            errors: batch.errors,
            declared_totals: batch.declared_totals,
            metrics,
            titles,
            message,
        }
    }
}
