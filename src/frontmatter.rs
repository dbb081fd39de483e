use serde_json::{Map, Value};

/// Splits a pandoc-style metadata block off the top of a document.
///
/// Returns the parsed block and the trimmed body. A document without a
/// leading `---` delimiter, or with an unterminated block, yields an empty
/// map and the whole text as body.
pub(crate) fn parse(content: &str) -> (Map<String, Value>, String) {
    if !content.starts_with("---") {
        return (Map::new(), content.trim().to_string());
    }

    let parts: Vec<&str> = content.splitn(3, "---").collect();
    if parts.len() < 3 {
        return (Map::new(), content.trim().to_string());
    }

    let mut metadata = Map::new();
    for line in parts[1].trim().split('\n') {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');

        if key == "tags" && value.starts_with('[') && value.ends_with(']') {
            metadata.insert(key.to_string(), Value::Array(parse_tag_list(value)));
        } else {
            metadata.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    (metadata, parts[2].trim().to_string())
}

// Tag lists are written as `["a", "b"]` most of the time, but single quotes
// and bare words show up in older posts. Those fall back to a comma split,
// so this never fails.
fn parse_tag_list(value: &str) -> Vec<Value> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(value) {
        return tags.into_iter().map(Value::String).collect();
    }

    value
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|tag| {
            Value::String(
                tag.trim()
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_string(),
            )
        })
        .collect()
}
