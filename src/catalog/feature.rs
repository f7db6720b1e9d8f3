use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{require, Draft, Id, Resource};
use crate::{
    client::{Body, FileUpload, Multipart},
    error::Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Master list entry for a feature a motor can have (ABS, keyless, ...).
pub struct Feature {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Resource for Feature {
    const PATH: &'static str = "/features";
    const LABEL: &'static str = "feature";
    type Draft = FeatureDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureDraft {
    pub name: String,
    pub desc: Option<String>,
    pub icon: Option<FileUpload>,
}

impl FeatureDraft {
    fn form(&self) -> Multipart {
        Multipart::new()
            .text("name", &self.name)
            .text_opt("desc", self.desc.as_ref())
            .file("icon", self.icon.as_ref())
    }
}

impl Draft for FeatureDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    fn body(&self) -> Result<Body> {
        match self.icon {
            Some(_) => Ok(Body::Multipart(self.form())),
            None => Ok(Body::Json(json!({ "name": self.name, "desc": self.desc }))),
        }
    }

    fn update_body(&self) -> Result<Body> {
        Ok(Body::Multipart(self.form()))
    }
}
