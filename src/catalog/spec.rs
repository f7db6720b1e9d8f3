use serde::{Deserialize, Serialize};

use super::{require, Draft, Id, Resource};
use crate::{client::Body, error::Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Heading that specification items are grouped under (Engine, Dimensions, ...).
pub struct SpecGroup {
    pub id: Id,
    pub name: String,
    /// Display position; lower sorts first.
    #[serde(default)]
    pub order: i64,
}

impl Resource for SpecGroup {
    const PATH: &'static str = "/specgroups";
    const LABEL: &'static str = "specification group";
    type Draft = SpecGroupDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecGroupDraft {
    pub name: String,
    pub order: i64,
}

impl Draft for SpecGroupDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    fn body(&self) -> Result<Body> {
        Body::json(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A measurable specification, e.g. "Bore x Stroke" in mm.
pub struct SpecItem {
    pub id: Id,
    #[serde(default)]
    pub specification_group_id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub specification_group: Option<super::SpecGroupRef>,
}

impl SpecItem {
    pub fn group_id(&self) -> Option<Id> {
        self.specification_group_id
            .or_else(|| self.specification_group.as_ref().map(|group| group.id))
    }
}

impl Resource for SpecItem {
    const PATH: &'static str = "/specification-items";
    const LABEL: &'static str = "specification item";
    type Draft = SpecItemDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecItemDraft {
    pub specification_group_id: Option<Id>,
    pub name: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Draft for SpecItemDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        if self.specification_group_id.is_none() {
            return Err(crate::error::ApiError::Validation(
                "specification group is required".into(),
            ));
        }
        Ok(())
    }

    fn body(&self) -> Result<Body> {
        Body::json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_falls_back_to_nested_group() {
        let item: SpecItem = serde_json::from_str(
            r#"{"id":4,"name":"Bore","unit":"mm","specification_group":{"id":2,"name":"Engine"}}"#,
        )
        .unwrap();
        assert_eq!(item.group_id(), Some(2));
    }

    #[test]
    fn item_draft_needs_group() {
        let draft = SpecItemDraft {
            name: "Bore".into(),
            unit: "mm".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }
}
