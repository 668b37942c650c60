use std::io::{self, BufRead, Write};

use review_pipelines::error::Result;
use review_pipelines::sentiment::{Prediction, SentimentCategory, SentimentPipelineBuilder};

struct HistoryEntry {
    review: String,
    prediction: Prediction,
}

fn category_tag(category: SentimentCategory) -> &'static str {
    match category {
        SentimentCategory::Positive => "[+]",
        SentimentCategory::Negative => "[-]",
        SentimentCategory::NeutralOrOther => "[~]",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_chars - 3).collect();
        format!("{prefix}...")
    }
}

fn print_history(history: &[HistoryEntry]) {
    println!("\n--- Prediction History ---");
    println!("{:<44} {:<12} Confidence", "Review", "Prediction");
    for entry in history {
        println!(
            "{:<44} {:<12} {}",
            truncate(&entry.review, 44),
            entry.prediction.label,
            entry.prediction
        );
    }
    println!();
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "artifacts".to_string());

    println!("Loading artifacts from '{dir}'...");
    let pipeline = SentimentPipelineBuilder::from_dir(&dir).build()?;
    println!("Pipeline built successfully.");
    println!("Enter one review per line (Ctrl-D to exit).\n");

    // Session history lives here, outside the pipeline.
    let mut history: Vec<HistoryEntry> = Vec::new();

    let stdin = io::stdin();
    loop {
        print!("review> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let review = line.trim_end_matches('\n');

        match pipeline.run(review) {
            Ok(output) => {
                let prediction = output.prediction;
                println!(
                    "{} Predicted sentiment: {}",
                    category_tag(prediction.category()),
                    prediction
                );
                println!(
                    "Completed in {:.2}ms",
                    output.stats.total_time.as_secs_f64() * 1000.0
                );

                history.push(HistoryEntry {
                    review: review.to_string(),
                    prediction,
                });
                print_history(&history);
            }
            Err(e) => println!("warning: {e}"),
        }
    }

    Ok(())
}
