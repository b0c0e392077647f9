//! Plain-text and JSON output helpers.

use anyhow::Result;
use serde_json::Value;

use advision_core::utils::{format_percent, shorten, CampaignFigures, TrustLevel};

/// Width of the campaign name column in metric tables
const NAME_WIDTH: usize = 28;

pub fn print_json(value: &Value) -> Result<()> {
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// One line per campaign with the ROI and CTR computed locally.
pub fn campaign_metrics_table(campaigns: &Value) -> String {
    let rows = campaigns.as_array().map(Vec::as_slice).unwrap_or_default();

    let mut out = format!(
        "{:<width$}  {:<10}  {:>9}  {:>7}\n",
        "NAME",
        "PLATFORM",
        "ROI",
        "CTR",
        width = NAME_WIDTH
    );
    for campaign in rows {
        let figures = CampaignFigures::from_json(campaign);
        out.push_str(&format!(
            "{:<width$}  {:<10}  {:>9}  {:>7}\n",
            shorten(&figures.name, NAME_WIDTH),
            shorten(&figures.platform, 10),
            format_percent(figures.roi(), 1),
            format_percent(figures.ctr(), 2),
            width = NAME_WIDTH
        ));
    }
    out
}

/// Trust score line for a `POST /ml/trust-score` response, if it has a score.
pub fn trust_summary(response: &Value) -> Option<String> {
    let score = response
        .get("trust_score")
        .or_else(|| response.get("score"))
        .and_then(Value::as_f64)?;
    Some(format!("Trust score {:.0} ({})", score, TrustLevel::from_score(score)))
}
