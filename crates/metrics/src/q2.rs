//! Q² factual consistency via question generation and answering
//!
//! Questions are generated from the generated text, then answered twice: once
//! from the generated text and once from the ground truth. Matching answers
//! count as consistent; differing answers are compared with NLI.

use crate::tokenizer::{clipped_overlap, f1, ngram_counts, tokenize};
use ragas_core::error::Result;
use ragas_core::TextPair;
use ragas_models::{InferenceClient, NliPair};
use serde_json::Value;
use tracing::{debug, warn};

const UNANSWERABLE: &str = "UNANSWERABLE";

fn question_generation_prompt(text: &str, max_questions: usize) -> String {
    format!(
        r#"Write at most {max_questions} short factual questions that can be answered using only the given text. Each question must target a single fact (a name, number, date, place or short phrase) stated in the text.

text: Albert Einstein was a German-born theoretical physicist who developed the theory of relativity.
questions in json:
{{"questions": ["Where was Albert Einstein born?", "What theory did Albert Einstein develop?"]}}

text: I don't know.
questions in json:
{{"questions": []}}

text: {text}
questions in json:"#
    )
}

fn answer_prompt(question: &str, text: &str) -> String {
    format!(
        "Answer the question using only the given text. Reply with the shortest span of the text \
         that answers it. If the text does not contain the answer, reply exactly {UNANSWERABLE}.\n\n\
         text: {text}\nquestion: {question}\nanswer:"
    )
}

/// Extract the question list from a model reply
///
/// Accepts `{"questions": [...]}` or a bare JSON array, optionally wrapped in
/// prose or code fences. Anything unparseable yields no questions.
pub(crate) fn parse_questions(response: &str) -> Vec<String> {
    let candidates = [
        Some(response.trim()),
        slice_between(response, '{', '}'),
        slice_between(response, '[', ']'),
    ];

    for candidate in candidates.into_iter().flatten() {
        let Ok(value) = serde_json::from_str::<Value>(candidate) else {
            continue;
        };
        let list = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("questions") {
                Some(Value::Array(items)) => items,
                _ => continue,
            },
            _ => continue,
        };
        return list
            .into_iter()
            .filter_map(|item| match item {
                Value::String(question) => Some(question.trim().to_string()),
                _ => None,
            })
            .filter(|question| !question.is_empty())
            .collect();
    }

    Vec::new()
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}

/// Normalize a model answer; `None` when the text does not answer the question
pub(crate) fn parse_answer(response: &str) -> Option<String> {
    let answer = response
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim_end_matches('.')
        .trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case(UNANSWERABLE) {
        None
    } else {
        Some(answer.to_string())
    }
}

/// Token-level F1 between two answers
pub(crate) fn token_f1(a: &str, b: &str) -> f64 {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }
    let overlap = clipped_overlap(&ngram_counts(&a_tokens, 1), &ngram_counts(&b_tokens, 1));
    f1(
        overlap as f64 / b_tokens.len() as f64,
        overlap as f64 / a_tokens.len() as f64,
    )
}

/// Q² score of one pair
///
/// Returns NaN (with a warning) when no answerable question could be
/// generated from the generated text.
pub async fn q2(pair: &TextPair, client: &InferenceClient) -> Result<f64> {
    let max_questions = client.q2_max_questions();
    let response = client
        .complete(&question_generation_prompt(pair.generated(), max_questions))
        .await?;
    let questions: Vec<String> = parse_questions(&response)
        .into_iter()
        .take(max_questions)
        .collect();
    debug!("Generated {} questions", questions.len());

    let mut scores: Vec<f64> = Vec::with_capacity(questions.len());
    let mut needs_nli: Vec<(usize, NliPair)> = Vec::new();

    for question in &questions {
        let generated_answer = client
            .complete(&answer_prompt(question, pair.generated()))
            .await?;
        let Some(generated_answer) = parse_answer(&generated_answer) else {
            debug!("Skipping question not answerable from its own source: {question}");
            continue;
        };

        let reference_answer = client
            .complete(&answer_prompt(question, pair.ground_truth()))
            .await?;
        let Some(reference_answer) = parse_answer(&reference_answer) else {
            scores.push(0.0);
            continue;
        };

        if token_f1(&reference_answer, &generated_answer) >= 1.0 {
            scores.push(1.0);
        } else {
            needs_nli.push((
                scores.len(),
                NliPair::new(
                    format!("{question} {reference_answer}"),
                    format!("{question} {generated_answer}"),
                ),
            ));
            scores.push(f64::NAN);
        }
    }

    if scores.is_empty() {
        warn!("No answerable questions generated; Q² score is NaN");
        return Ok(f64::NAN);
    }

    if !needs_nli.is_empty() {
        let (slots, nli_pairs): (Vec<usize>, Vec<NliPair>) = needs_nli.into_iter().unzip();
        let entailment = client.entailment(&nli_pairs).await?;
        for (slot, score) in slots.into_iter().zip(entailment) {
            scores[slot] = f64::from(score).clamp(0.0, 1.0);
        }
    }

    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragas_models::{MockGenerationProvider, MockNliProvider};
    use std::sync::Arc;
    use std::time::Duration;

    fn client(generation: MockGenerationProvider) -> InferenceClient {
        InferenceClient::new(Duration::from_secs(5))
            .with_generation(Arc::new(generation))
            .with_nli(Arc::new(MockNliProvider::new()))
    }

    #[test]
    fn test_parse_questions_variants() {
        assert_eq!(
            parse_questions(r#"{"questions": ["Who?", "When?"]}"#),
            vec!["Who?", "When?"]
        );
        assert_eq!(
            parse_questions("Sure!\n```json\n[\"Where?\"]\n```"),
            vec!["Where?"]
        );
        assert!(parse_questions("no json here").is_empty());
        assert!(parse_questions(r#"{"questions": []}"#).is_empty());
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer(" \"Paris.\" "), Some("Paris".to_string()));
        assert_eq!(parse_answer("UNANSWERABLE"), None);
        assert_eq!(parse_answer("unanswerable."), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn test_token_f1() {
        assert_eq!(token_f1("the Eiffel Tower", "the eiffel tower"), 1.0);
        assert_eq!(token_f1("Paris", "London"), 0.0);
        assert!((token_f1("in Paris France", "Paris") - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_consistent_answers_score_one() {
        let generation = MockGenerationProvider::scripted([
            r#"{"questions": ["Where is the tower?"]}"#,
            "Paris",
            "Paris",
        ]);
        let pair = TextPair::new("The tower is in Paris.", "The tower stands in Paris.");
        let score = q2(&pair, &client(generation)).await.unwrap();
        assert_eq!(score, 1.0);
    }

    #[tokio::test]
    async fn test_unanswerable_from_ground_truth_scores_zero() {
        let generation = MockGenerationProvider::scripted([
            r#"["Where is the tower?", "How tall is it?"]"#,
            "Paris",
            "Paris",
            "300 metres",
            UNANSWERABLE,
        ]);
        let pair = TextPair::new("The tower is in Paris.", "The 300 metre tower is in Paris.");
        let score = q2(&pair, &client(generation)).await.unwrap();
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_differing_answers_use_nli() {
        // NLI mock: share of hypothesis words found in the premise
        let generation = MockGenerationProvider::scripted([
            r#"["Where is the tower?"]"#,
            "Lyon",
            "Paris",
        ]);
        let pair = TextPair::new("The tower is in Paris.", "The tower is in Lyon.");
        let score = q2(&pair, &client(generation)).await.unwrap();
        // hypothesis "where is the tower lyon" shares 4 of 5 words with the premise
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_no_questions_is_nan() {
        let pair = TextPair::new("The tower is in Paris.", "I don't know.");
        let score = q2(&pair, &client(MockGenerationProvider::new()))
            .await
            .unwrap();
        assert!(score.is_nan());
    }
}
