use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{require, Draft, Id, Resource};
use crate::{
    client::{Body, FileUpload, Multipart},
    error::Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Body style or segment, e.g. scooter or sport.
pub struct Category {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Resource for Category {
    const PATH: &'static str = "/categories";
    const LABEL: &'static str = "category";
    type Draft = CategoryDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub desc: Option<String>,
    pub image: Option<FileUpload>,
}

impl CategoryDraft {
    fn form(&self) -> Multipart {
        Multipart::new()
            .text("name", &self.name)
            .text_opt("desc", self.desc.as_ref())
            .file("image", self.image.as_ref())
    }
}

impl Draft for CategoryDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    fn body(&self) -> Result<Body> {
        match self.image {
            Some(_) => Ok(Body::Multipart(self.form())),
            None => Ok(Body::Json(json!({ "name": self.name, "desc": self.desc }))),
        }
    }

    fn update_body(&self) -> Result<Body> {
        Ok(Body::Multipart(self.form()))
    }
}
