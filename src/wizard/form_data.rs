//! Form data accumulator shared by every step of a wizard.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WizardError;

/// Open, string-keyed record of field values collected across all steps.
///
/// Values are plain JSON (strings, numbers, null). A key that is absent has
/// never been written; a key holding `null` was explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Map<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a partial from a typed per-step struct.
    ///
    /// Every serialized field becomes a key, so `None` fields overwrite with
    /// `null` on merge unless the struct skips them.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, WizardError> {
        let value = serde_json::to_value(value).map_err(|e| WizardError::Shape(e.to_string()))?;
        Self::try_from(value)
    }

    /// Deserialize into a typed view.
    pub fn typed<T: DeserializeOwned>(&self) -> Result<T, WizardError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| WizardError::Shape(e.to_string()))
    }

    /// Shallow-merge `partial` over the current values.
    ///
    /// Keys present in `partial` overwrite unconditionally, including with
    /// `null`. Keys absent from `partial` are left untouched.
    pub fn merge(&mut self, partial: FormData) {
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`; `None` for absent, null, or non-string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Identifier of the persisted record, once the store has assigned one.
    pub fn id(&self) -> Option<&str> {
        self.get_str("id").filter(|id| !id.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl TryFrom<Value> for FormData {
    type Error = WizardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(WizardError::NotAnObject(kind_of(&other).to_string())),
        }
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<FormData> for Value {
    fn from(data: FormData) -> Self {
        Value::Object(data.0)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> FormData {
        FormData::try_from(value).unwrap()
    }

    #[test]
    fn merge_overrides_and_preserves() {
        let mut form = data(json!({"businessName": "Calm Rooms", "city": "Austin"}));
        form.merge(data(json!({"city": "Denver", "capacity": 5})));

        assert_eq!(form.get_str("businessName"), Some("Calm Rooms"));
        assert_eq!(form.get_str("city"), Some("Denver"));
        assert_eq!(form.get_i64("capacity"), Some(5));
        assert_eq!(form.len(), 3);
    }

    #[test]
    fn merge_writes_explicit_null() {
        let mut form = data(json!({"serviceRadius": 10}));
        form.merge(data(json!({"serviceRadius": null})));

        assert!(form.contains_key("serviceRadius"));
        assert_eq!(form.get("serviceRadius"), Some(&Value::Null));
        assert_eq!(form.get_i64("serviceRadius"), None);
    }

    #[test]
    fn sequence_of_merges_equals_left_to_right_fold() {
        let partials = [
            json!({"a": 1, "b": 1}),
            json!({"b": 2, "c": "x"}),
            json!({"a": null}),
            json!({}),
            json!({"d": 4, "c": "y"}),
        ];

        let mut form = FormData::new();
        for p in &partials {
            form.merge(data(p.clone()));
        }

        assert_eq!(
            Value::from(form),
            json!({"a": null, "b": 2, "c": "y", "d": 4})
        );
    }

    #[test]
    fn rejects_non_object_values() {
        let err = FormData::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, WizardError::NotAnObject(ref kind) if kind == "an array"));
    }

    #[test]
    fn id_ignores_empty_and_non_string_values() {
        assert_eq!(FormData::new().id(), None);
        assert_eq!(FormData::new().with("id", "").id(), None);
        assert_eq!(FormData::new().with("id", 7).id(), None);
        assert_eq!(FormData::new().with("id", "biz-1").id(), Some("biz-1"));
    }

    #[test]
    fn typed_round_trip_through_struct() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        #[serde(rename_all = "camelCase")]
        struct Partial {
            postal_code: Option<String>,
            capacity: Option<i64>,
        }

        let partial = FormData::from_serializable(&Partial {
            postal_code: Some("78701".into()),
            capacity: None,
        })
        .unwrap();
        assert_eq!(partial.get_str("postalCode"), Some("78701"));
        assert_eq!(partial.get("capacity"), Some(&Value::Null));

        let back: Partial = partial.typed().unwrap();
        assert_eq!(back.postal_code.as_deref(), Some("78701"));
        assert_eq!(back.capacity, None);
    }
}
