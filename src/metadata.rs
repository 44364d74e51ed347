//! Front matter extraction.
//!
//! A document may start with a block of `key: value` lines terminated by a
//! blank line. Lines without a `:` (or starting with one) continue the value of
//! the previous key, which then becomes a list.

use crate::model::RenderModel;
use serde_json::Value;

const KEY_VALUE_DELIMITER: char = ':';

/// Stores a finished key/value pair: a single line becomes a string, several
/// lines become a list.
fn commit(model: &mut RenderModel, key: Option<String>, mut values: Vec<String>) {
    let Some(key) = key else {
        return;
    };
    let value = match values.len() {
        0 => return,
        1 => Value::String(values.remove(0)),
        _ => Value::Array(values.into_iter().map(Value::String).collect()),
    };
    model.insert(key, value);
}

/// Removes the leading metadata block from `content`, inserting its entries
/// into `model`, and returns the remaining body trimmed of surrounding whitespace.
///
/// The content is returned unchanged when its first line is blank or has no
/// `:`, and when the metadata runs to the end of the content without a blank
/// line separating it from a body. In the latter case only pairs completed by
/// a following key reach the model.
pub fn strip_metadata(content: &str, model: &mut RenderModel) -> String {
    let mut consumed = 0;
    let mut key: Option<String> = None;
    let mut values: Vec<String> = Vec::new();
    let mut terminated = false;

    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        consumed += raw_line.len();
        let line = raw_line.trim();

        if index == 0 {
            if line.is_empty() || !line.contains(KEY_VALUE_DELIMITER) {
                return content.to_string();
            }
        } else if line.is_empty() {
            commit(model, key.take(), std::mem::take(&mut values));
            terminated = true;
            break;
        }

        match line.find(KEY_VALUE_DELIMITER) {
            Some(position) if position > 0 => {
                commit(model, key.take(), std::mem::take(&mut values));
                key = Some(line[..position].trim().to_string());
                values.push(line[position + 1..].trim().to_string());
            }
            _ => values.push(line.to_string()),
        }
    }

    if !terminated || consumed >= content.len() {
        return content.to_string();
    }
    content[consumed..].trim().to_string()
}
