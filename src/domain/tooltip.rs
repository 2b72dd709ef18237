use serde_json::Value;

/// Content of a `title` tooltip. Markup may carry either plain text or a
/// JSON object of labelled values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipContent {
    Fields(Vec<(String, String)>),
    Raw(String),
}

impl TooltipContent {
    /// Malformed or non-object JSON is shown as the raw title.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) if !map.is_empty() => Self::Fields(
                map.into_iter()
                    .map(|(key, value)| {
                        let text = match value {
                            Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (key, text)
                    })
                    .collect(),
            ),
            _ => Self::Raw(raw.to_string()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Fields(fields) => {
                fields.iter().map(|(k, v)| format!("{k}: {v}")).collect::<Vec<_>>().join("\n")
            }
            Self::Raw(raw) => raw.clone(),
        }
    }
}
