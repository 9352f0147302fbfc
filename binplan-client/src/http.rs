use binplan_core::{
    BinRecommendation, ItemId, ItemSummary, Placement, PlacementId, UnitId, UnitLayout,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::ClientError;
use crate::service::LayoutService;
use crate::types::{
    AutoLayoutRequest, CreatePlacement, ItemQuery, LayoutSuggestion, RecommendationRequest,
    UpdatePlacement,
};

/// JSON-over-HTTP client for the layout API.
pub struct HttpLayoutService {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpLayoutService {
    /// Creates a client for the API rooted at `base_url` (e.g. `https://host/api/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    /// Sends `token` as a bearer token on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pulls a readable message out of an error body.
///
/// Understands `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}`,
/// `{"error": {"message": "..."}}` and `{"message": "..."}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(detail) = value.get("detail") {
        if let Some(text) = detail.as_str() {
            return Some(text.to_string());
        }
        if let Some(entries) = detail.as_array() {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
    }

    value
        .get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

impl LayoutService for HttpLayoutService {
    #[instrument(skip(self), fields(unit = %unit_id))]
    async fn get_layout(&self, unit_id: &UnitId) -> Result<UnitLayout, ClientError> {
        debug!("Fetching unit layout");
        let url = self.url(&["units", unit_id.as_str(), "layout"])?;
        self.fetch(self.http.get(url)).await
    }

    #[instrument(skip(self, request), fields(unit = %request.unit_id, item = %request.item_id))]
    async fn create_placement(&self, request: &CreatePlacement) -> Result<Placement, ClientError> {
        debug!(rect = %request.rect(), "Creating placement");
        let url = self.url(&["units", request.unit_id.as_str(), "placements"])?;
        self.fetch(self.http.post(url).json(request)).await
    }

    #[instrument(skip(self, request), fields(placement = %id))]
    async fn update_placement(
        &self,
        id: &PlacementId,
        request: &UpdatePlacement,
    ) -> Result<Placement, ClientError> {
        debug!("Updating placement");
        let url = self.url(&["placements", id.as_str()])?;
        self.fetch(self.http.patch(url).json(request)).await
    }

    #[instrument(skip(self), fields(placement = %id))]
    async fn delete_placement(&self, id: &PlacementId) -> Result<(), ClientError> {
        debug!("Deleting placement");
        let url = self.url(&["placements", id.as_str()])?;
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    #[instrument(skip(self, item_ids), fields(unit = %unit_id, items = item_ids.len()))]
    async fn request_auto_layout(
        &self,
        unit_id: &UnitId,
        item_ids: &[ItemId],
    ) -> Result<Vec<LayoutSuggestion>, ClientError> {
        let body = AutoLayoutRequest {
            item_ids: item_ids.to_vec(),
        };
        let url = self.url(&["units", unit_id.as_str(), "auto-layout"])?;
        let suggestions: Vec<LayoutSuggestion> =
            self.fetch(self.http.post(url).json(&body)).await?;
        debug!(suggested = suggestions.len(), "Received auto-layout");
        Ok(suggestions)
    }

    #[instrument(skip(self, item_ids), fields(items = item_ids.len()))]
    async fn request_recommendations(
        &self,
        item_ids: &[ItemId],
    ) -> Result<Vec<BinRecommendation>, ClientError> {
        let body = RecommendationRequest {
            item_ids: item_ids.to_vec(),
        };
        let url = self.url(&["items", "bin-recommendations"])?;
        self.fetch(self.http.post(url).json(&body)).await
    }

    #[instrument(skip(self))]
    async fn search_items(&self, query: &ItemQuery) -> Result<Vec<ItemSummary>, ClientError> {
        let url = self.url(&["items"])?;
        self.fetch(self.http.get(url).query(query)).await
    }
}
