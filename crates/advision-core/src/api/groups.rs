//! Typed call groups over `ApiClient::send`.
//!
//! Responses other than the login token are returned as received.

use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use super::client::ApiClient;
use super::error::Result;
use super::request::FileUpload;
use super::routes;
use crate::models::{ChatTurn, LoginRequest, Page, RegisterRequest, TokenResponse};

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { api: self }
    }

    pub fn campaigns(&self) -> CampaignApi<'_> {
        CampaignApi { api: self }
    }

    pub fn creatives(&self) -> CreativeApi<'_> {
        CreativeApi { api: self }
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi { api: self }
    }

    pub fn ml(&self) -> MlApi<'_> {
        MlApi { api: self }
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi { api: self }
    }

    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi { api: self }
    }
}

pub struct AuthApi<'a> {
    api: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn register(&self, data: &RegisterRequest) -> Result<Value> {
        self.api.send(routes::auth::register(data)?).await
    }

    /// Exchange credentials for a token. Storing it is up to the caller.
    pub async fn login(&self, data: &LoginRequest) -> Result<TokenResponse> {
        self.api.send_as(routes::auth::login(data)?).await
    }

    pub async fn current_user(&self) -> Result<Value> {
        self.api.send(routes::auth::current_user()).await
    }
}

pub struct CampaignApi<'a> {
    api: &'a ApiClient,
}

impl CampaignApi<'_> {
    pub async fn list(&self, page: Page) -> Result<Value> {
        self.api.send(routes::campaigns::list(page)).await
    }

    pub async fn get(&self, id: impl Display) -> Result<Value> {
        self.api.send(routes::campaigns::get(id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, campaign: &B) -> Result<Value> {
        self.api.send(routes::campaigns::create(campaign)?).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Value> {
        self.api.send(routes::campaigns::delete(id)).await
    }
}

pub struct CreativeApi<'a> {
    api: &'a ApiClient,
}

impl CreativeApi<'_> {
    pub async fn upload(&self, campaign_id: impl Display, file: FileUpload) -> Result<Value> {
        self.api.send(routes::creatives::upload(campaign_id, file)).await
    }

    pub async fn list(&self, campaign_id: impl Display) -> Result<Value> {
        self.api.send(routes::creatives::list(campaign_id)).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Value> {
        self.api.send(routes::creatives::delete(id)).await
    }
}

pub struct AnalyticsApi<'a> {
    api: &'a ApiClient,
}

impl AnalyticsApi<'_> {
    pub async fn dashboard(&self) -> Result<Value> {
        self.api.send(routes::analytics::dashboard()).await
    }

    pub async fn roi_metrics(&self, campaign_id: Option<impl Display>) -> Result<Value> {
        self.api.send(routes::analytics::roi_metrics(campaign_id)).await
    }

    pub async fn budget_simulation<I: Serialize>(&self, campaign_id: I, new_budget: f64) -> Result<Value> {
        self.api
            .send(routes::analytics::budget_simulation(campaign_id, new_budget))
            .await
    }
}

pub struct MlApi<'a> {
    api: &'a ApiClient,
}

impl MlApi<'_> {
    pub async fn predict_engagement<I: Serialize>(&self, campaign_id: I) -> Result<Value> {
        self.api.send(routes::ml::predict_engagement(campaign_id)).await
    }

    pub async fn trust_score<I: Serialize>(&self, creative_id: I) -> Result<Value> {
        self.api.send(routes::ml::trust_score(creative_id)).await
    }

    pub async fn analyze_creative<I: Serialize>(&self, creative_id: I) -> Result<Value> {
        self.api.send(routes::ml::analyze_creative(creative_id)).await
    }
}

pub struct DocumentsApi<'a> {
    api: &'a ApiClient,
}

impl DocumentsApi<'_> {
    pub async fn upload(&self, file: FileUpload) -> Result<Value> {
        self.api.send(routes::documents::upload(file)).await
    }

    pub async fn list(&self) -> Result<Value> {
        self.api.send(routes::documents::list()).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Value> {
        self.api.send(routes::documents::delete(id)).await
    }

    /// Search the knowledge base; see `routes::DEFAULT_QUERY_RESULTS`.
    pub async fn query(&self, query: &str, n_results: u32) -> Result<Value> {
        self.api.send(routes::documents::query(query, n_results)).await
    }
}

pub struct ChatApi<'a> {
    api: &'a ApiClient,
}

impl ChatApi<'_> {
    pub async fn send_message(&self, message: &str, use_rag: bool, history: &[ChatTurn]) -> Result<Value> {
        self.api
            .send(routes::chat::send_message(message, use_rag, history))
            .await
    }

    pub async fn quick_insights(&self, campaign_id: Option<impl Display>) -> Result<Value> {
        self.api.send(routes::chat::quick_insights(campaign_id)).await
    }
}
