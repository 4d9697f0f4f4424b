use cancelamento::config::AnalyzerConfig;
use cancelamento::pipeline::{AnalysisReport, Pipeline};
use cancelamento::runtime::inputs::load_inputs;
use cancelamento::runtime::logging::init_tracing;
use cancelamento::summary::RecordFilter;
use cancelamento::types::DocType;
use std::collections::BTreeSet;

type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

const USAGE: &str = "Usage: analyze [--config <path>] [--tipo <CPF|CNPJ|UNKNOWN>]... \
                     [--search <text>] <file.xml|bundle.zip>...";

struct CliArgs {
    config_path: Option<String>,
    types: BTreeSet<DocType>,
    search: Option<String>,
    inputs: Vec<String>,
}

fn parse_args(args: Vec<String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        config_path: None,
        types: BTreeSet::new(),
        search: None,
        inputs: Vec::new(),
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config_path = Some(args.next().ok_or("--config needs a path")?);
            }
            "--tipo" => {
                let value = args.next().ok_or("--tipo needs a value")?;
                parsed.types.insert(value.parse()?);
            }
            "--search" => {
                parsed.search = Some(args.next().ok_or("--search needs a value")?);
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option {flag}")),
            _ => parsed.inputs.push(arg),
        }
    }

    if parsed.inputs.is_empty() {
        return Err("No input files given".to_string());
    }
    Ok(parsed)
}

fn main() -> Result<(), DynError> {
    init_tracing();

    let args = match parse_args(std::env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = match &args.config_path {
        Some(path) => AnalyzerConfig::load_from_file(path)?,
        None => AnalyzerConfig::load_default()?,
    };
    let pipeline = Pipeline::from_config(&config);

    let inputs = load_inputs(&args.inputs);
    let batch = pipeline.analyze_inputs(&inputs);

    let filter = RecordFilter {
        files: None,
        types: (!args.types.is_empty()).then_some(args.types),
        search: args.search,
    };
    let report = AnalysisReport::build(batch, Some(&filter));

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
