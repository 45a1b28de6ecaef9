//! Trivia quiz feed (JSON pass-through with reshaping)

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::seq::SliceRandom;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::registry::{handler_fn, ParamSpec, RouteDescriptor};
use crate::response::FeatureReply;

pub fn routes(client: Arc<UpstreamClient>, upstreams: &UpstreamConfig) -> Vec<RouteDescriptor> {
    let base = upstreams.quiz.trim_end_matches('/').to_string();

    let trivia = RouteDescriptor::new(
        "/api/quiz/trivia",
        "Trivia Questions",
        "quiz",
        "Random multiple-choice trivia questions",
        handler_fn(move |input| {
            let client = client.clone();
            let base = base.clone();
            async move {
                let amount = input.int_or("amount", 5)?;
                let questions = fetch_trivia(&client, &base, amount).await?;
                Ok(FeatureReply::Json(Value::Array(questions)))
            }
        }),
    )
    .tags(&["quiz", "trivia"])
    .example("amount=5")
    .params(vec![ParamSpec::integer("amount", "Number of questions")
        .optional()
        .range(1, 20)
        .example("5")]);

    vec![trivia]
}

/// The upstream is asked for base64 transport encoding so entity-encoded
/// question text survives intact.
async fn fetch_trivia(client: &UpstreamClient, base: &str, amount: i64) -> Result<Vec<Value>> {
    let url = format!(
        "{}/api.php?amount={}&type=multiple&encode=base64",
        base, amount
    );
    let body: Value = client.get_json(&url).await?;

    let code = body
        .get("response_code")
        .and_then(|v| v.as_u64())
        .unwrap_or(1);
    if code != 0 {
        return Err(AppError::EmptyResult(
            "No quiz questions available".to_string(),
        ));
    }

    let results = body
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Upstream("Failed to parse upstream response".to_string()))?;

    let mut questions = Vec::new();
    for entry in results {
        if let Some(question) = reshape_question(entry) {
            questions.push(question);
        }
    }

    if questions.is_empty() {
        return Err(AppError::EmptyResult(
            "No quiz questions available".to_string(),
        ));
    }
    Ok(questions)
}

fn reshape_question(entry: &Value) -> Option<Value> {
    let question = decode_field(entry.get("question")?)?;
    let answer = decode_field(entry.get("correct_answer")?)?;
    let category = entry.get("category").and_then(decode_opt);
    let difficulty = entry.get("difficulty").and_then(decode_opt);

    let mut options: Vec<String> = entry
        .get("incorrect_answers")?
        .as_array()?
        .iter()
        .filter_map(decode_opt)
        .collect();
    options.push(answer.clone());
    options.shuffle(&mut rand::thread_rng());

    Some(json!({
        "question": question,
        "category": category,
        "difficulty": difficulty,
        "options": options,
        "answer": answer,
    }))
}

fn decode_field(value: &Value) -> Option<String> {
    let encoded = value.as_str()?;
    let bytes = BASE64.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

fn decode_opt(value: &Value) -> Option<String> {
    decode_field(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(s: &str) -> String {
        BASE64.encode(s)
    }

    #[test]
    fn test_reshape_question() {
        let entry = json!({
            "question": b64("What is 2+2?"),
            "correct_answer": b64("4"),
            "category": b64("Math"),
            "difficulty": b64("easy"),
            "incorrect_answers": [b64("3"), b64("5"), b64("22")],
        });

        let question = reshape_question(&entry).unwrap();
        assert_eq!(question["question"], "What is 2+2?");
        assert_eq!(question["answer"], "4");
        assert_eq!(question["category"], "Math");

        let options = question["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        assert!(options.iter().any(|o| o == "4"));
    }

    #[test]
    fn test_reshape_question_missing_answer() {
        let entry = json!({ "question": b64("incomplete") });
        assert!(reshape_question(&entry).is_none());
    }

    #[test]
    fn test_decode_field_rejects_invalid() {
        assert!(decode_field(&json!("!!not-base64!!")).is_none());
        assert!(decode_field(&json!(42)).is_none());
    }
}
