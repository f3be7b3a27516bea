use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use url_taxonomy::UrlClassifier;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <url> | --batch <file>", args[0]);
        return Err(anyhow!("Missing URL argument"));
    }

    let classifier = UrlClassifier::new();

    if args[1] == "--batch" {
        let file_path = args
            .get(2)
            .ok_or_else(|| anyhow!("Missing file path for batch processing"))?;
        let contents = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path))?;
        let urls: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();

        let start = std::time::Instant::now();
        let records = classifier.classify_parallel(&urls);
        let duration = start.elapsed();

        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        eprintln!("Classified {} URLs in {:?}", records.len(), duration);
    } else {
        let record = classifier.classify(&args[1]);
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    Ok(())
}
