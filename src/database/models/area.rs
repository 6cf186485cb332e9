use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::replace::ReplaceField;
use super::Entity;
use crate::database::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub area_id: String,
    pub name: String,
    #[serde(default)]
    pub building: Option<String>,
}

impl Entity for Area {
    type Key = String;

    const COLLECTION: Collection = Collection::Area;

    fn key(&self) -> String {
        self.area_id.clone()
    }
}

/// POST /area body. A UUID is generated when `areaId` is omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArea {
    pub area_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub building: Option<String>,
}

impl NewArea {
    pub fn into_area(self, area_id: String) -> Area {
        Area {
            area_id,
            name: self.name,
            building: self.building,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub building: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AreaField {
    Name(String),
    Building(Option<String>),
}

impl ReplaceField for AreaField {
    const ALLOWED: &'static [&'static str] = &["name", "building"];

    fn parse(name: &str, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            "name" => AreaField::Name(serde_json::from_value(value)?),
            _ => AreaField::Building(serde_json::from_value(value)?),
        })
    }

    fn name(&self) -> &'static str {
        match self {
            AreaField::Name(_) => "name",
            AreaField::Building(_) => "building",
        }
    }

    fn value(&self) -> Value {
        match self {
            AreaField::Name(v) => Value::String(v.clone()),
            AreaField::Building(v) => v.clone().map(Value::String).unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSearchHit {
    pub id: String,
    pub name: String,
    pub building: Option<String>,
}

impl From<Area> for AreaSearchHit {
    fn from(a: Area) -> Self {
        Self {
            id: a.area_id,
            name: a.name,
            building: a.building,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{to_document, ReplaceRequest};
    use serde_json::json;

    #[test]
    fn explicit_null_building_is_kept_in_changes() {
        let changes: AreaChanges = serde_json::from_value(json!({"building": null})).unwrap();
        assert_eq!(changes.building, Some(None));
        let doc = to_document(&changes).unwrap();
        assert_eq!(doc.get("building"), Some(&Value::Null));

        let absent: AreaChanges = serde_json::from_value(json!({"name": "Ops"})).unwrap();
        assert_eq!(absent.building, None);
        assert!(!to_document(&absent).unwrap().contains_key("building"));
    }

    #[test]
    fn description_is_not_replaceable() {
        assert!(ReplaceRequest::<AreaField>::parse(json!({"description": "x"})).is_err());
        assert_eq!(
            ReplaceRequest::<AreaField>::parse(json!({"building": "Building Z"})).unwrap().field,
            AreaField::Building(Some("Building Z".to_string()))
        );
    }
}
