//! Structured replies from the text-generation service

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One grammar correction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Correction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub original: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub corrected: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
}

/// A vocabulary item explained in the context of the answer.
///
/// The post-process reply adds part of speech, a CEFR band and an example.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub word: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub meaning: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub why: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub part_of_speech: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cefr: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<String>,
}

impl VocabItem {
    /// Item carrying only the word, for replies that list bare strings
    pub fn word(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }
}

/// A complete learning reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaiResponse {
    pub answer: String,
    #[serde(
        default,
        deserialize_with = "lenient_corrections",
        skip_serializing_if = "Option::is_none"
    )]
    pub corrections: Option<Vec<Correction>>,
    #[serde(
        default,
        deserialize_with = "lenient_hints",
        skip_serializing_if = "Option::is_none"
    )]
    pub hints: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_vocab")]
    pub vocab: Vec<VocabItem>,
}

impl KaiResponse {
    /// Degraded reply: `answer` as plain text, no learning signals
    pub fn plain(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            corrections: None,
            hints: None,
            vocab: Vec::new(),
        }
    }

    /// Whether any correction, hint or vocabulary item is present
    pub fn has_learning_signals(&self) -> bool {
        !self.vocab.is_empty()
            || self.corrections.as_ref().is_some_and(|c| !c.is_empty())
            || self.hints.as_ref().is_some_and(|h| !h.is_empty())
    }
}

/// Text of a scalar value; null, arrays and objects have none
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(&Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

/// Object entries of an array; other entries are dropped
fn object_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

fn lenient_corrections<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Correction>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(object_items(items))),
        _ => Ok(None),
    }
}

fn lenient_hints<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.iter().filter_map(scalar_text).collect())),
        _ => Ok(None),
    }
}

fn lenient_vocab<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<VocabItem>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Err(D::Error::custom("vocab must be an array"));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(word) => Some(VocabItem::word(word)),
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect())
}

/// Outcome of parsing a service reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    Parsed(KaiResponse),
    Invalid,
}

impl ParsedResponse {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn into_option(self) -> Option<KaiResponse> {
        match self {
            Self::Parsed(response) => Some(response),
            Self::Invalid => None,
        }
    }

    /// The parsed reply, or `raw` wrapped as a plain answer
    pub fn or_fallback(self, raw: &str) -> KaiResponse {
        match self {
            Self::Parsed(response) => response,
            Self::Invalid => KaiResponse::plain(raw),
        }
    }
}

/// Parse a service reply without ever failing hard.
///
/// The text must be one JSON object with a string `answer` and an array
/// `vocab`; anything else (prose, code fences, missing keys, wrong types)
/// is `Invalid`. Extra keys are ignored. Irregular items do not reject the
/// reply: null or scalar fields become text, bare vocab strings become
/// words, other non-object entries are dropped, and a `corrections` or
/// `hints` value that is not an array reads as absent.
pub fn safe_parse_kai_response(text: &str) -> ParsedResponse {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!("Reply is not JSON: {}", err);
            return ParsedResponse::Invalid;
        }
    };

    let has_answer = value.get("answer").is_some_and(Value::is_string);
    let has_vocab = value.get("vocab").is_some_and(Value::is_array);
    if !has_answer || !has_vocab {
        tracing::debug!(has_answer, has_vocab, "Reply JSON is missing required keys");
        return ParsedResponse::Invalid;
    }

    match serde_json::from_value::<KaiResponse>(value) {
        Ok(response) => ParsedResponse::Parsed(response),
        Err(err) => {
            tracing::warn!("Reply JSON could not be read: {}", err);
            ParsedResponse::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_reply_parses() {
        let parsed = safe_parse_kai_response(r#"{"answer":"Hi","vocab":[]}"#);
        assert_eq!(parsed, ParsedResponse::Parsed(KaiResponse::plain("Hi")));
    }

    #[test]
    fn test_not_json_is_invalid() {
        assert_eq!(safe_parse_kai_response("not json"), ParsedResponse::Invalid);
        assert_eq!(safe_parse_kai_response(""), ParsedResponse::Invalid);
    }

    #[test]
    fn test_code_fenced_json_is_invalid() {
        let text = "```json\n{\"answer\":\"Hi\",\"vocab\":[]}\n```";
        assert!(!safe_parse_kai_response(text).is_valid());
    }

    #[test]
    fn test_missing_or_mistyped_required_keys_are_invalid() {
        for text in [
            r#"{"vocab":[]}"#,
            r#"{"answer":"Hi"}"#,
            r#"{"answer":42,"vocab":[]}"#,
            r#"{"answer":"Hi","vocab":{}}"#,
            r#"{"answer":"Hi","vocab":null}"#,
            r#"["answer","vocab"]"#,
            "null",
            "\"answer\"",
        ] {
            assert_eq!(safe_parse_kai_response(text), ParsedResponse::Invalid, "{text}");
        }
    }

    #[test]
    fn test_full_reply_round_trips() {
        let response = KaiResponse {
            answer: "You went to school yesterday.".to_string(),
            corrections: Some(vec![Correction {
                original: "I goed".to_string(),
                corrected: "I went".to_string(),
                explanation: "Irregular past tense.".to_string(),
            }]),
            hints: Some(vec!["I went to school.".to_string()]),
            vocab: vec![VocabItem {
                word: "yesterday".to_string(),
                meaning: "the day before today".to_string(),
                why: "time marker".to_string(),
                part_of_speech: Some("adverb".to_string()),
                cefr: Some("A1".to_string()),
                example: Some("You went to school yesterday.".to_string()),
            }],
        };
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("\"partOfSpeech\":\"adverb\""));
        assert_eq!(safe_parse_kai_response(&text), ParsedResponse::Parsed(response));
    }

    #[test]
    fn test_extra_keys_are_ignored_and_item_fields_default() {
        let parsed = safe_parse_kai_response(
            r#"{"answer":"Hi","vocab":[{"word":"hi"}],"mock":"quota","hints":null}"#,
        )
        .into_option()
        .unwrap();
        assert_eq!(parsed.vocab[0].word, "hi");
        assert_eq!(parsed.vocab[0].meaning, "");
        assert!(parsed.hints.is_none());
    }

    #[test]
    fn test_null_item_fields_become_empty() {
        let parsed = safe_parse_kai_response(
            r#"{"answer":"Hi","vocab":[{"word":"hi","meaning":null,"why":"x","cefr":null}]}"#,
        )
        .into_option()
        .unwrap();
        assert_eq!(parsed.vocab[0].word, "hi");
        assert_eq!(parsed.vocab[0].meaning, "");
        assert_eq!(parsed.vocab[0].why, "x");
        assert!(parsed.vocab[0].cefr.is_none());
    }

    #[test]
    fn test_non_object_vocab_items() {
        let parsed = safe_parse_kai_response(r#"{"answer":"Hi","vocab":["hello",null,3,[]]}"#)
            .into_option()
            .unwrap();
        assert_eq!(parsed.vocab, vec![VocabItem::word("hello")]);
    }

    #[test]
    fn test_scalar_item_fields_become_text() {
        let parsed = safe_parse_kai_response(
            r#"{"answer":"Hi","vocab":[{"word":42,"meaning":true,"why":{"a":1}}]}"#,
        )
        .into_option()
        .unwrap();
        assert_eq!(parsed.vocab[0].word, "42");
        assert_eq!(parsed.vocab[0].meaning, "true");
        assert_eq!(parsed.vocab[0].why, "");
    }

    #[test]
    fn test_irregular_hints_and_corrections() {
        let parsed = safe_parse_kai_response(
            r#"{"answer":"Hi","vocab":[],"hints":[null,"Say hello."],"corrections":["x",{"original":"a","corrected":null}]}"#,
        )
        .into_option()
        .unwrap();
        assert_eq!(parsed.hints, Some(vec!["Say hello.".to_string()]));
        let corrections = parsed.corrections.unwrap();
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].original, "a");
        assert_eq!(corrections[0].corrected, "");

        let parsed = safe_parse_kai_response(
            r#"{"answer":"Hi","vocab":[],"hints":"Say hello.","corrections":{"a":1}}"#,
        )
        .into_option()
        .unwrap();
        assert!(parsed.hints.is_none());
        assert!(parsed.corrections.is_none());
    }

    #[test]
    fn test_fallback_wraps_raw_text() {
        let response = safe_parse_kai_response("Just text").or_fallback("Just text");
        assert_eq!(response.answer, "Just text");
        assert!(response.vocab.is_empty());
        assert!(!response.has_learning_signals());
    }

    #[test]
    fn test_learning_signals() {
        let mut response = KaiResponse::plain("Hi");
        response.corrections = Some(vec![]);
        assert!(!response.has_learning_signals());
        response.hints = Some(vec!["Hello!".to_string()]);
        assert!(response.has_learning_signals());
    }
}
