use cancelamento::extract::aliases::AliasTable;
use cancelamento::extract::Extractor;
use cancelamento::xml_tree::parse_document;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::{Duration, Instant};

fn count_xml_events(xml: &[u8]) -> usize {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(_) => count += 1,
            Err(e) => panic!("XML error at position {}: {:?}", reader.error_position(), e),
        }
        buf.clear();
    }
    count
}

fn report(label: &str, durations: &[Duration]) -> f64 {
    let avg = durations.iter().map(|d| d.as_secs_f64()).sum::<f64>() / durations.len() as f64;
    let min = durations
        .iter()
        .map(|d| d.as_secs_f64())
        .fold(f64::INFINITY, f64::min);
    println!("{label} avg: {:.3}s, min: {:.3}s\n", avg, min);
    avg
}

fn main() {
    let path = std::env::args().nth(1).expect("Usage: bench_parser <xml_file>");
    let xml = std::fs::read(&path).expect("Failed to read XML file");
    let aliases = AliasTable::default();
    let extractor = Extractor::new(&aliases);

    let iterations = 5;

    // Baseline: just iterate XML events
    let _ = count_xml_events(&xml);
    let mut baseline = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let events = count_xml_events(&xml);
        let elapsed = start.elapsed();
        baseline.push(elapsed);
        println!("Baseline {}: {:.3}s ({} XML events)", i + 1, elapsed.as_secs_f64(), events);
    }
    let baseline_avg = report("Baseline", &baseline);

    let mut tree_durations = Vec::new();
    let mut extract_durations = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        let tree = parse_document(&xml).expect("document should be well-formed");
        let parsed = start.elapsed();
        let titles = extractor.extract(&tree);
        let total = start.elapsed();
        tree_durations.push(parsed);
        extract_durations.push(total);
        let debtors: usize = titles.iter().map(|t| t.debtors.len()).sum();
        println!(
            "Iteration {}: tree {:.3}s, tree+extract {:.3}s ({} titles, {} debtors)",
            i + 1,
            parsed.as_secs_f64(),
            total.as_secs_f64(),
            titles.len(),
            debtors,
        );
    }

    report("Tree", &tree_durations);
    let avg = report("Tree+extract", &extract_durations);
    println!("Overhead vs baseline: {:.1}x", avg / baseline_avg);
}
