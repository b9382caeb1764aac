use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One row returned by a list endpoint. Field sets differ per resource, so
/// rows stay untyped and columns are resolved by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn id(&self) -> Option<String> {
        self.data.get("id").map(value_to_display)
    }

    /// Resolve a dotted path such as `travel.title` and render it as text.
    /// Missing values render as an empty string.
    pub fn display(&self, path: &str) -> String {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return String::new();
        };
        let mut current = match self.data.get(first) {
            Some(value) => value,
            None => return String::new(),
        };
        for segment in segments {
            match current.get(segment) {
                Some(value) => current = value,
                None => return String::new(),
            }
        }
        value_to_display(current)
    }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_display)
            .collect::<Vec<_>>()
            .join(", "),
        // 巢狀物件（例如 travel、article）顯示其標題或名稱
        Value::Object(map) => ["title", "titleEn", "titleUz", "name", "id"]
            .iter()
            .find_map(|key| map.get(*key))
            .map(value_to_display)
            .unwrap_or_default(),
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    /// 1-based row number shown in the `№` column.
    pub fn row_number(&self, index: usize) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit) + index as u64 + 1
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            search: None,
        }
    }

    /// A new search term always starts again from the first page.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.page = 1;
        self
    }

    pub fn at_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Persisted authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
}

/// Token pair issued by `/auth/login` and `/auth/refresh-token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl TokenPair {
    pub fn into_tokens(self) -> Option<(String, String)> {
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some((access, refresh))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_display_resolves_nested_titles() {
        let day = record(json!({
            "id": "d1",
            "title": "Registan",
            "lat": 39.65,
            "travel": {"id": "t1", "title": "Silk Road"}
        }));

        assert_eq!(day.id().as_deref(), Some("d1"));
        assert_eq!(day.display("title"), "Registan");
        assert_eq!(day.display("lat"), "39.65");
        assert_eq!(day.display("travel"), "Silk Road");
        assert_eq!(day.display("travel.id"), "t1");
        assert_eq!(day.display("missing.path"), "");
    }

    #[test]
    fn test_page_numbering() {
        let page: Page<Record> = Page {
            items: vec![],
            total: 45,
            page: 3,
            limit: 20,
        };
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.row_number(0), 41);
        assert_eq!(page.row_number(4), 45);
    }

    #[test]
    fn test_search_resets_page() {
        let query = ListQuery::new(4, 20).with_search(Some("  Bukhara ".to_string()));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert_eq!(query.search.as_deref(), Some("Bukhara"));

        let cleared = ListQuery::new(2, 10).with_search(Some("   ".to_string()));
        assert_eq!(cleared.search, None);
    }

    #[test]
    fn test_session_round_trips_camel_case() {
        let session: Session = serde_json::from_value(json!({
            "accessToken": "a",
            "refreshToken": "r",
            "user": {"id": "7"}
        }))
        .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user.unwrap().id, "7");
    }
}
