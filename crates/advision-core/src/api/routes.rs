//! Path templates and parameter shapes of every API call.
//!
//! Each function maps its arguments to a `RequestSpec` and does nothing else.
//! Record ids are taken as `Display` so both UUIDs and integers work.

use std::fmt::Display;

use serde::Serialize;
use serde_json::json;

use super::error::Result;
use super::request::{FileUpload, RequestSpec};
use crate::models::{ChatTurn, LoginRequest, Page, RegisterRequest};

/// Number of snippets requested from a knowledge-base query by default
pub const DEFAULT_QUERY_RESULTS: u32 = 5;

pub mod auth {
    use super::*;

    pub fn register(data: &RegisterRequest) -> Result<RequestSpec> {
        RequestSpec::post("/auth/register").json(data)
    }

    pub fn login(data: &LoginRequest) -> Result<RequestSpec> {
        RequestSpec::post("/auth/login").json(data)
    }

    pub fn current_user() -> RequestSpec {
        RequestSpec::get("/auth/me")
    }
}

pub mod campaigns {
    use super::*;

    pub fn list(page: Page) -> RequestSpec {
        RequestSpec::get("/campaigns/")
            .query("skip", page.skip)
            .query("limit", page.limit)
    }

    pub fn get(id: impl Display) -> RequestSpec {
        RequestSpec::get(format!("/campaigns/{}", id))
    }

    pub fn create<B: Serialize + ?Sized>(campaign: &B) -> Result<RequestSpec> {
        RequestSpec::post("/campaigns/").json(campaign)
    }

    pub fn delete(id: impl Display) -> RequestSpec {
        RequestSpec::delete(format!("/campaigns/{}", id))
    }
}

pub mod creatives {
    use super::*;

    pub fn upload(campaign_id: impl Display, file: FileUpload) -> RequestSpec {
        RequestSpec::post(format!("/creatives/upload/{}", campaign_id)).file(file)
    }

    pub fn list(campaign_id: impl Display) -> RequestSpec {
        RequestSpec::get(format!("/creatives/campaign/{}", campaign_id))
    }

    pub fn delete(id: impl Display) -> RequestSpec {
        RequestSpec::delete(format!("/creatives/{}", id))
    }
}

pub mod analytics {
    use super::*;

    pub fn dashboard() -> RequestSpec {
        RequestSpec::get("/analytics/dashboard")
    }

    /// `None` sends no filter. Any `Some` id is sent as given, including `0`.
    pub fn roi_metrics(campaign_id: Option<impl Display>) -> RequestSpec {
        RequestSpec::get("/analytics/roi-metrics").query_opt("campaign_id", campaign_id)
    }

    pub fn budget_simulation<I: Serialize>(campaign_id: I, new_budget: f64) -> RequestSpec {
        RequestSpec::post("/analytics/budget-simulation").json_value(json!({
            "campaign_id": campaign_id,
            "new_budget": new_budget,
        }))
    }
}

pub mod ml {
    use super::*;

    pub fn predict_engagement<I: Serialize>(campaign_id: I) -> RequestSpec {
        RequestSpec::post("/ml/predict-engagement").json_value(json!({ "campaign_id": campaign_id }))
    }

    pub fn trust_score<I: Serialize>(creative_id: I) -> RequestSpec {
        RequestSpec::post("/ml/trust-score").json_value(json!({ "creative_id": creative_id }))
    }

    pub fn analyze_creative<I: Serialize>(creative_id: I) -> RequestSpec {
        RequestSpec::post("/ml/analyze-creative").json_value(json!({ "creative_id": creative_id }))
    }
}

pub mod documents {
    use super::*;

    pub fn upload(file: FileUpload) -> RequestSpec {
        RequestSpec::post("/documents/upload").file(file)
    }

    pub fn list() -> RequestSpec {
        RequestSpec::get("/documents/")
    }

    pub fn delete(id: impl Display) -> RequestSpec {
        RequestSpec::delete(format!("/documents/{}", id))
    }

    /// Parameters travel in the query string; the body stays empty.
    ///
    /// Values are form-encoded, so a space goes out as `+`
    /// (`query=refund+policy`) rather than `%20`. Servers decode both the same.
    pub fn query(query: &str, n_results: u32) -> RequestSpec {
        RequestSpec::post("/documents/query")
            .query("query", query)
            .query("n_results", n_results)
    }
}

pub mod chat {
    use super::*;

    pub fn send_message(message: &str, use_rag: bool, history: &[ChatTurn]) -> RequestSpec {
        RequestSpec::post("/chat/message")
            .query("message", message)
            .query("use_rag", use_rag)
            .json_value(json!({ "conversation_history": history }))
    }

    /// `None` sends no filter. Any `Some` id is sent as given, including `0`.
    pub fn quick_insights(campaign_id: Option<impl Display>) -> RequestSpec {
        RequestSpec::post("/chat/quick-insights").query_opt("campaign_id", campaign_id)
    }
}
