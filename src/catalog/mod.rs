//! Catalog entities and the CRUD operations shared by every collection
//! under `/motorinci`.

pub mod ai;
mod brand;
mod category;
mod color;
mod compare;
mod feature;
mod motor;
mod spec;

use std::fmt;

use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

pub use ai::AiReply;
pub use brand::{Brand, BrandDraft};
pub use category::{Category, CategoryDraft};
pub use color::{Color, ColorDraft};
pub use compare::{Comparison, ComparisonGroup, ComparisonRow};
pub use feature::{Feature, FeatureDraft};
pub use motor::{
    AvailableColor, AvailableColorDraft, FeatureRef, HomePage, Motor, MotorDraft, MotorFeature,
    MotorFeatureDraft, MotorImage, MotorImageDraft, MotorSpecification, MotorSpecificationDraft,
    SpecGroupRef, SpecItemRef,
};
pub use spec::{SpecGroup, SpecGroupDraft, SpecItem, SpecItemDraft};

use crate::{
    abort::AbortSignal,
    client::{ApiClient, ApiRequest, Body},
    error::{ApiError, Result},
};

pub type Id = u64;

pub const NAMESPACE: &str = "/motorinci";

/// A collection the backend exposes with list / show / create / update /
/// delete endpoints.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Collection path under [`NAMESPACE`], e.g. `"/brands"`.
    const PATH: &'static str;
    /// Human-readable singular name used in notices.
    const LABEL: &'static str;

    type Draft: Draft;

    fn id(&self) -> Id;

    fn collection_path() -> String {
        format!("{NAMESPACE}{}", Self::PATH)
    }

    fn item_path(id: Id) -> String {
        format!("{NAMESPACE}{}/{id}", Self::PATH)
    }
}

/// Form data for creating or updating a [`Resource`].
pub trait Draft: Send + Sync {
    /// Client-side checks run before anything is sent.
    fn validate(&self) -> Result<()>;

    /// Body for a create call.
    fn body(&self) -> Result<Body>;

    /// Body for an update call. Multipart bodies are sent as `POST` with a
    /// method override, JSON bodies as `PUT`.
    fn update_body(&self) -> Result<Body> {
        self.body()
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    /// Wraps an unpaginated listing as its only page.
    pub fn single(data: Vec<T>) -> Self {
        Self {
            data,
            current_page: 1,
            last_page: 1,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.last_page
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Paged(Page<T>),
    Flat(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Paged(page) => page,
            Listing::Flat(data) => Page::single(data),
        }
    }
}

/// Query parameters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, key: &str, value: impl ToString) -> Self {
        self.filters.push((key.to_string(), value.to_string()));
        self
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(search) = &self.search {
            request = request.query("search", search);
        }
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        for (key, value) in &self.filters {
            request = request.query(key, value);
        }
        if let Some(page) = self.page {
            request = request.query("page", page);
        }
        request
    }
}

impl ApiClient {
    pub async fn list<R: Resource>(
        &self,
        query: &ListQuery,
        signal: Option<&AbortSignal>,
    ) -> Result<Page<R>> {
        let request = query.apply(ApiRequest::get(R::collection_path()));
        let listing: Option<Listing<R>> = self.fetch(request, signal).await?;
        Ok(listing.map(Page::from).unwrap_or_else(|| Page::single(Vec::new())))
    }

    pub async fn get<R: Resource>(&self, id: Id, signal: Option<&AbortSignal>) -> Result<R> {
        self.fetch_data(ApiRequest::get(R::item_path(id)), signal)
            .await
    }

    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R> {
        draft.validate()?;
        let request = ApiRequest::post(R::collection_path()).body(draft.body()?);
        self.fetch_data(request, None).await
    }

    pub async fn update<R: Resource>(&self, id: Id, draft: &R::Draft) -> Result<R> {
        draft.validate()?;
        let request = match draft.update_body()? {
            Body::Multipart(form) => ApiRequest::post(R::item_path(id))
                .body(Body::Multipart(form.method_override(&Method::PUT))),
            body => ApiRequest::put(R::item_path(id)).body(body),
        };
        self.fetch_data(request, None).await
    }

    pub async fn delete<R: Resource>(&self, id: Id) -> Result<()> {
        self.fetch::<serde_json::Value>(ApiRequest::delete(R::item_path(id)), None)
            .await
            .map(|_| ())
    }
}

/// Accepts a JSON number or a numeric string, as decimal columns often
/// arrive quoted.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Accepts a JSON string or number.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Display helper for optional text fields.
pub(crate) struct OrDash<'a>(pub &'a Option<String>);

impl fmt::Display for OrDash<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_deref() {
            Some(text) if !text.is_empty() => f.write_str(text),
            _ => f.write_str("-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_listing_keeps_page_numbers() {
        let raw = r##"{"data":[{"id":1,"name":"Red","hex":"#ff0000"}],"current_page":2,"last_page":3}"##;
        let page: Page<Color> = serde_json::from_str::<Listing<Color>>(raw).unwrap().into();
        assert_eq!(page.current_page, 2);
        assert!(page.has_next_page());
    }

    #[test]
    fn flat_listing_is_single_page() {
        let raw = r##"[{"id":1,"name":"Red","hex":"#ff0000"}]"##;
        let page: Page<Color> = serde_json::from_str::<Listing<Color>>(raw).unwrap().into();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_next_page());
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Page {
            data: vec![()],
            current_page: 4,
            last_page: 4,
        };
        assert!(!page.has_next_page());
    }

    #[test]
    fn query_serializes_in_stable_order() {
        let request = ListQuery::new()
            .search("vario")
            .limit(10)
            .filter("category_id", 2)
            .page(3)
            .apply(ApiRequest::get("/motorinci/motors"));
        assert_eq!(
            request.query,
            vec![
                ("search".to_string(), "vario".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("category_id".to_string(), "2".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn paths_live_under_namespace() {
        assert_eq!(Brand::collection_path(), "/motorinci/brands");
        assert_eq!(SpecItem::item_path(7), "/motorinci/specification-items/7");
    }
}
