use serde::{Deserialize, Serialize};

use super::{
    lenient_number, lenient_string, require, Brand, Category, Color, Draft, Id, ListQuery,
    Resource,
};
use crate::{
    abort::AbortSignal,
    client::{ApiClient, ApiRequest, Body, FileUpload, Multipart},
    error::{ApiError, Result},
};

/// How many suggestions a motor search returns.
pub const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A motorcycle model with everything attached to it.
pub struct Motor {
    pub id: Id,
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year_model: String,
    #[serde(deserialize_with = "lenient_number")]
    pub engine_cc: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub low_price: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub up_price: f64,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub features: Vec<MotorFeature>,
    #[serde(default)]
    pub images: Vec<MotorImage>,
    #[serde(default)]
    pub specifications: Vec<MotorSpecification>,
    #[serde(default)]
    pub available_colors: Vec<AvailableColor>,
}

impl Resource for Motor {
    const PATH: &'static str = "/motors";
    const LABEL: &'static str = "motor";
    type Draft = MotorDraft;

    fn id(&self) -> Id {
        self.id
    }
}

impl Motor {
    /// Search suggestions by name. An empty query returns nothing without
    /// touching the network.
    pub async fn search(
        client: &ApiClient,
        query: &str,
        signal: Option<&AbortSignal>,
    ) -> Result<Vec<Motor>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let list = ListQuery::new().search(query).limit(SEARCH_LIMIT);
        Ok(client.list::<Motor>(&list, signal).await?.data)
    }

    pub async fn random(
        client: &ApiClient,
        limit: u32,
        signal: Option<&AbortSignal>,
    ) -> Result<Vec<Motor>> {
        let request = ApiRequest::get(format!("{}/random", Self::collection_path()))
            .query("limit", limit);
        Ok(client.fetch(request, signal).await?.unwrap_or_default())
    }

    /// Motors of one brand, one page at a time.
    pub fn by_brand(brand_id: Id) -> ListQuery {
        ListQuery::new().filter("brand_id", brand_id)
    }

    /// Motors of one category, one page at a time.
    pub fn by_category(category_id: Id) -> ListQuery {
        ListQuery::new().filter("category_id", category_id)
    }

    /// Price range formatted with thousands separators, e.g. `Rp 20.000.000 - Rp 25.500.000`.
    pub fn price_range(&self) -> String {
        let low = format_rupiah(self.low_price);
        if (self.up_price - self.low_price).abs() < f64::EPSILON {
            return low;
        }
        format!("{low} - {}", format_rupiah(self.up_price))
    }
}

fn format_rupiah(amount: f64) -> String {
    let digits = format!("{:.0}", amount.max(0.0));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("Rp {grouped}")
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MotorDraft {
    pub name: String,
    pub brand_id: Option<Id>,
    pub category_id: Option<Id>,
    pub year_model: String,
    pub engine_cc: f64,
    pub low_price: f64,
    pub up_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Draft for MotorDraft {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("year_model", &self.year_model)?;
        if self.brand_id.is_none() {
            return Err(ApiError::Validation("brand is required".into()));
        }
        if self.category_id.is_none() {
            return Err(ApiError::Validation("category is required".into()));
        }
        if self.low_price > self.up_price {
            return Err(ApiError::Validation(
                "low_price must not exceed up_price".into(),
            ));
        }
        Ok(())
    }

    fn body(&self) -> Result<Body> {
        Body::json(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRef {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A feature attached to a motor.
pub struct MotorFeature {
    pub id: Id,
    pub feature_item: FeatureRef,
}

impl Resource for MotorFeature {
    const PATH: &'static str = "/motor-features";
    const LABEL: &'static str = "motor feature";
    type Draft = MotorFeatureDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MotorFeatureDraft {
    pub motor_id: Id,
    pub feature_item_id: Id,
}

impl Draft for MotorFeatureDraft {
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn body(&self) -> Result<Body> {
        Body::json(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorImage {
    pub id: Id,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl Resource for MotorImage {
    const PATH: &'static str = "/motor-images";
    const LABEL: &'static str = "motor image";
    type Draft = MotorImageDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct MotorImageDraft {
    pub motor_id: Id,
    pub image: FileUpload,
    pub caption: Option<String>,
}

impl Draft for MotorImageDraft {
    fn validate(&self) -> Result<()> {
        if self.image.bytes.is_empty() {
            return Err(ApiError::Validation("image file is empty".into()));
        }
        Ok(())
    }

    fn body(&self) -> Result<Body> {
        Ok(Body::Multipart(
            Multipart::new()
                .text("motor_id", self.motor_id)
                .file("image", Some(&self.image))
                .text_opt("caption", self.caption.as_ref()),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecGroupRef {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecItemRef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub specification_group: SpecGroupRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The value a motor has for one specification item.
pub struct MotorSpecification {
    pub id: Id,
    #[serde(deserialize_with = "lenient_string")]
    pub value: String,
    pub specification_item: SpecItemRef,
}

impl MotorSpecification {
    /// Value with its unit appended when the item has one.
    pub fn display_value(&self) -> String {
        match self.specification_item.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{} {unit}", self.value),
            _ => self.value.clone(),
        }
    }
}

impl Resource for MotorSpecification {
    const PATH: &'static str = "/motor-specifications";
    const LABEL: &'static str = "motor specification";
    type Draft = MotorSpecificationDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MotorSpecificationDraft {
    pub motor_id: Id,
    pub specification_item_id: Id,
    pub value: String,
}

impl Draft for MotorSpecificationDraft {
    fn validate(&self) -> Result<()> {
        require("value", &self.value)
    }

    fn body(&self) -> Result<Body> {
        Body::json(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A color a motor is sold in, optionally with a photo in that color.
pub struct AvailableColor {
    pub id: Id,
    pub color: Color,
    #[serde(default)]
    pub image: Option<String>,
}

impl Resource for AvailableColor {
    const PATH: &'static str = "/available-colors";
    const LABEL: &'static str = "available color";
    type Draft = AvailableColorDraft;

    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct AvailableColorDraft {
    pub motor_id: Id,
    pub color_id: Id,
    pub image: Option<FileUpload>,
}

impl Draft for AvailableColorDraft {
    fn validate(&self) -> Result<()> {
        if self.color_id == 0 {
            return Err(ApiError::Validation("pick a color first".into()));
        }
        Ok(())
    }

    /// Always multipart, with or without a photo.
    fn body(&self) -> Result<Body> {
        Ok(Body::Multipart(
            Multipart::new()
                .text("motor_id", self.motor_id)
                .text("color_id", self.color_id)
                .file("image", self.image.as_ref()),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Landing page payload.
pub struct HomePage {
    #[serde(rename = "randomMotors", default)]
    pub random_motors: Vec<Motor>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub brands: Vec<Brand>,
}

impl HomePage {
    pub const PATH: &'static str = "/motorinci/front/home";

    pub async fn fetch(client: &ApiClient, signal: Option<&AbortSignal>) -> Result<Self> {
        client.fetch_data(ApiRequest::get(Self::PATH), signal).await
    }
}
