use serde::{Deserialize, Serialize};

use super::{require, Draft, Id, Resource};
use crate::{
    client::Body,
    error::{ApiError, Result},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: Id,
    pub name: String,
    /// CSS hex notation, `#rrggbb` or `#rgb`.
    pub hex: String,
}

impl Resource for Color {
    const PATH: &'static str = "/colors";
    const LABEL: &'static str = "color";
    type Draft = ColorDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColorDraft {
    pub name: String,
    pub hex: String,
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .filter(|digits| matches!(digits.len(), 3 | 6))
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
}

impl Draft for ColorDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("hex", &self.hex)?;
        if !is_hex_color(self.hex.trim()) {
            return Err(ApiError::Validation(format!(
                "hex must look like #rrggbb, got {:?}",
                self.hex
            )));
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
    fn hex_validation() {
        assert!(is_hex_color("#ff0000"));
        assert!(is_hex_color("#F0a"));
        assert!(!is_hex_color("ff0000"));
        assert!(!is_hex_color("#ff00"));
        assert!(!is_hex_color("#gg0000"));
    }

    #[test]
    fn draft_requires_name() {
        let draft = ColorDraft {
            name: String::new(),
            hex: "#000".into(),
        };
        assert!(matches!(draft.validate(), Err(ApiError::Validation(_))));
    }
}
