use anyhow::{Context, Result};
use chunkflow_config::Config;
use chunkflow_engine::{
    AnalysisFailure, AnalysisProvider, AnalysisScope, ContextualMetrics, Engine, LocalMetrics,
    MetricsUpdate, SegmentFilter, SortDirection, SortField,
};
use std::time::Instant;
use std::{env, fs, process, thread};

/// Readability heuristics computed in-process, so the binary runs without
/// an external analysis service.
struct HeuristicProvider;

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .collect()
}

fn sentence_count(text: &str) -> usize {
    text.matches(['.', '!', '?']).count().max(1)
}

fn syllables(word: &str) -> usize {
    let mut count = 0;
    let mut previous_vowel = false;
    for ch in word.chars().flat_map(char::to_lowercase) {
        let vowel = "aeiouy".contains(ch);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }
    count.max(1)
}

fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl AnalysisProvider for HeuristicProvider {
    fn compute_metrics(
        &self,
        segment_text: &str,
        topic: &str,
        scope: AnalysisScope,
        full_text: Option<&str>,
    ) -> Result<MetricsUpdate, AnalysisFailure> {
        let tokens = words(segment_text);
        if tokens.is_empty() {
            return Err(AnalysisFailure::Rejected("segment has no words".to_string()));
        }
        let word_count = tokens.len() as f64;
        let sentences = sentence_count(segment_text) as f64;

        match scope {
            AnalysisScope::Local => {
                let long_words = tokens.iter().filter(|word| word.chars().count() > 6).count();
                let polysyllables = tokens.iter().filter(|word| syllables(word) >= 3).count();
                let lix = word_count / sentences + 100.0 * long_words as f64 / word_count;
                let smog = 1.043 * (polysyllables as f64 * 30.0 / sentences).sqrt() + 3.1291;
                let topic_words = words(topic);
                let hits = tokens
                    .iter()
                    .filter(|word| {
                        topic_words
                            .iter()
                            .any(|topic_word| topic_word.eq_ignore_ascii_case(word))
                    })
                    .count();

                Ok(MetricsUpdate::Local(LocalMetrics {
                    lix: Some(round(lix)),
                    smog: Some(round(smog)),
                    complexity: Some(round((lix / 60.0).min(1.0))),
                    signal_strength: Some(round((hits as f64 / word_count * 5.0).min(1.0))),
                }))
            }
            AnalysisScope::Contextual => {
                let full_text = full_text.ok_or(AnalysisFailure::Unavailable)?;
                let position = full_text.find(segment_text).unwrap_or_default();
                let function = if position == 0 {
                    "introduction"
                } else if position + segment_text.len() >= full_text.trim_end().len() {
                    "conclusion"
                } else {
                    "body"
                };
                let method = if segment_text.trim_end().ends_with('?') {
                    "question"
                } else if sentences > 1.0 {
                    "argument"
                } else {
                    "statement"
                };

                Ok(MetricsUpdate::Contextual(ContextualMetrics {
                    semantic_function: Some(function.to_string()),
                    semantic_method: Some(method.to_string()),
                    semantic_error: None,
                }))
            }
        }
    }
}

/// Drive the queue until every debounced batch has been analysed
fn settle(engine: &mut Engine, provider: &HeuristicProvider) -> Result<()> {
    while let Some(deadline) = engine.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        let applied = engine.run_due(provider)?;
        log::debug!("Applied {applied} analysis results");
    }
    Ok(())
}

fn print_segments(engine: &Engine) {
    let doc = engine.document();
    println!(
        "{:>4}  {:>10}  {:>6}  {:>6}  {:<13}  text",
        "#", "range", "lix", "cplx", "function"
    );
    let segments = doc.filtered_sorted_segments(
        SortField::Position,
        SortDirection::Ascending,
        None,
        &SegmentFilter::All,
    );
    for (index, segment) in segments.into_iter().enumerate() {
        let metrics = &segment.metrics;
        let preview: String = segment
            .text(doc.text())
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(40)
            .collect();
        println!(
            "{:>4}  {:>10}  {:>6}  {:>6}  {:<13}  {}",
            index,
            format!("{}..{}", segment.start, segment.end),
            metrics.local.lix.map_or("-".to_string(), |v| format!("{v:.1}")),
            metrics.local.complexity.map_or("-".to_string(), |v| format!("{v:.2}")),
            metrics.contextual.semantic_function.as_deref().unwrap_or("-"),
            preview
        );
    }

    let summary = doc.summary();
    println!();
    println!("segments:        {}", summary.segment_count);
    if let Some(avg) = summary.avg_complexity {
        println!("avg complexity:  {avg:.3}");
    }
    if let Some(avg) = summary.avg_signal_strength {
        println!("avg signal:      {avg:.3}");
    }
    println!("status:          {:?}", summary.status);
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <text-file> [topic]", args[0]);
        process::exit(1);
    }

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Config path: {}", Config::config_path().display());
            process::exit(1);
        }
    };

    let path = &args[1];
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let topic = args
        .get(2)
        .cloned()
        .or(config.default_topic)
        .unwrap_or_default();

    log::info!("Segmenting {path} with topic {topic:?}");
    let mut engine = Engine::new(text, topic, config.engine);
    settle(&mut engine, &HeuristicProvider)?;

    print_segments(&engine);
    Ok(())
}
