use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::error::ParseError;

/// One clip as returned by the oracle. Fields other than `index` and
/// `caption` are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedClip {
    pub index: usize,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Reads an oracle response as a list of clips.
///
/// Accepts a JSON array, an object wrapping the array under `clips`, or
/// JSON lines. Markdown code fences around the payload are ignored.
pub fn parse_response(text: &str) -> Result<Vec<ParsedClip>, ParseError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let entries = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(mut object)) => match object.remove("clips") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ParseError::UnexpectedShape {
                    expected: "array under \"clips\"",
                });
            }
            None if object.contains_key("index") => vec![Value::Object(object)],
            None => {
                return Err(ParseError::UnexpectedShape {
                    expected: "array of clips or object with \"clips\"",
                });
            }
        },
        Ok(_) => {
            return Err(ParseError::UnexpectedShape {
                expected: "array of clips",
            });
        }
        Err(whole) => parse_lines(body).map_err(|_| ParseError::InvalidJson(whole.to_string()))?,
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            serde_json::from_value::<ParsedClip>(entry).map_err(|e| ParseError::InvalidEntry {
                position,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn parse_lines(body: &str) -> Result<Vec<Value>, serde_json::Error> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str::<Value>(line))
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Indices that occur more than once, ascending.
pub fn duplicate_indices(clips: &[ParsedClip]) -> Vec<usize> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for clip in clips {
        *counts.entry(clip.index).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(index, _)| index)
        .collect()
}
