use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{require, Draft, Id, Resource};
use crate::{
    client::{Body, FileUpload, Multipart},
    error::Result,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A motorcycle manufacturer.
pub struct Brand {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    /// Relative path of the brand icon, if uploaded.
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Resource for Brand {
    const PATH: &'static str = "/brands";
    const LABEL: &'static str = "brand";
    type Draft = BrandDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrandDraft {
    pub name: String,
    pub desc: Option<String>,
    pub icon: Option<FileUpload>,
    pub image: Option<FileUpload>,
}

impl BrandDraft {
    fn form(&self) -> Multipart {
        Multipart::new()
            .text("name", &self.name)
            .text_opt("desc", self.desc.as_ref())
            .file("icon", self.icon.as_ref())
            .file("image", self.image.as_ref())
    }
}

impl Draft for BrandDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    fn body(&self) -> Result<Body> {
        if self.icon.is_some() || self.image.is_some() {
            return Ok(Body::Multipart(self.form()));
        }
        Ok(Body::Json(json!({ "name": self.name, "desc": self.desc })))
    }

    fn update_body(&self) -> Result<Body> {
        Ok(Body::Multipart(self.form()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Part;

    #[test]
    fn files_switch_create_to_multipart() {
        let plain = BrandDraft {
            name: "Honda".into(),
            ..Default::default()
        };
        assert!(matches!(plain.body().unwrap(), Body::Json(_)));

        let with_icon = BrandDraft {
            name: "Honda".into(),
            icon: Some(FileUpload::new("honda.png", vec![0u8; 4])),
            ..Default::default()
        };
        match with_icon.body().unwrap() {
            Body::Multipart(form) => {
                assert_eq!(form.get("name"), Some(&Part::Text("Honda".into())));
                assert!(matches!(form.get("icon"), Some(Part::File(_))));
                assert!(form.get("desc").is_none());
            }
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let draft = BrandDraft {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn decodes_nullable_fields() {
        let brand: Brand =
            serde_json::from_str(r#"{"id":1,"name":"Yamaha","desc":null,"icon":null}"#).unwrap();
        assert_eq!(brand.name, "Yamaha");
        assert!(brand.image.is_none());
    }
}
