//! Caller-supplied situational context and the explanation fragments
//! derived from it.

use serde::Serialize;
use serde_json::Value;

use super::coerce;

/// Optional free-text context a caller attaches to an analysis request.
/// Fields are stored trimmed; blank input reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foods_eaten: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drinks_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_notes: Option<String>,
}

impl ContextInput {
    /// Lenient read from an untrusted value; anything that is not an object
    /// of non-blank strings reads as empty.
    pub fn from_value(value: &Value) -> Self {
        let map = coerce::object(Some(value));
        Self {
            foods_eaten: coerce::trimmed(map.get("foods_eaten")),
            drinks_taken: coerce::trimmed(map.get("drinks_taken")),
            mood_state: coerce::trimmed(map.get("mood_state")),
            other_notes: coerce::trimmed(map.get("other_notes")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.foods_eaten.is_none()
            && self.drinks_taken.is_none()
            && self.mood_state.is_none()
            && self.other_notes.is_none()
    }

    /// One human-readable sentence covering whichever fields are present,
    /// or an empty string when none are.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(foods) = &self.foods_eaten {
            parts.push(format!("吃了：{}", foods));
        }
        if let Some(drinks) = &self.drinks_taken {
            parts.push(format!("喝了：{}", drinks));
        }
        if let Some(mood) = &self.mood_state {
            parts.push(format!("精神状态：{}", mood));
        }
        if let Some(notes) = &self.other_notes {
            parts.push(format!("其他：{}", notes));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("你填写的情况显示：{}", parts.join("；"))
        }
    }

    /// One explanation fragment per present field, describing its likely
    /// relevance to interpretation.
    pub fn fragments(&self) -> Vec<String> {
        let mut items = Vec::new();
        if let Some(foods) = &self.foods_eaten {
            items.push(format!("近期饮食（{}）可能影响颜色与软硬度", foods));
        }
        if let Some(drinks) = &self.drinks_taken {
            items.push(format!("饮水/饮品（{}）可能影响水分含量", drinks));
        }
        if let Some(mood) = &self.mood_state {
            items.push(format!("精神状态（{}）有助判断是否存在不适", mood));
        }
        if let Some(notes) = &self.other_notes {
            items.push(format!("补充说明提示：{}", notes));
        }
        items
    }

    /// The raw echo embedded in the response body.
    pub fn echo(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}
