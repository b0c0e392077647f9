//! Client-side campaign arithmetic shown next to server data.

use std::fmt;

use serde_json::Value;

/// Return on investment in percent. Zero spend yields 0.
pub fn roi_percent(revenue: f64, spend: f64) -> f64 {
    if spend == 0.0 {
        return 0.0;
    }
    (revenue - spend) / spend * 100.0
}

/// Click-through rate in percent. Zero impressions yields 0.
pub fn ctr_percent(clicks: f64, impressions: f64) -> f64 {
    if impressions == 0.0 {
        return 0.0;
    }
    clicks / impressions * 100.0
}

/// Badge bucket for an ML trust score (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrustLevel {
    Risk,
    Caution,
    Verified,
    Trusted,
}

impl TrustLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            TrustLevel::Trusted
        } else if score >= 70.0 {
            TrustLevel::Verified
        } else if score >= 50.0 {
            TrustLevel::Caution
        } else {
            TrustLevel::Risk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrustLevel::Trusted => "Trusted",
            TrustLevel::Verified => "Verified",
            TrustLevel::Caution => "Caution",
            TrustLevel::Risk => "Risk",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numbers read out of a campaign payload.
///
/// Missing or unparsable fields count as zero. Decimal fields may arrive as
/// JSON strings and are parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignFigures {
    pub name: String,
    pub platform: String,
    pub spend: f64,
    pub revenue: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
}

impl CampaignFigures {
    pub fn from_json(campaign: &Value) -> Self {
        Self {
            name: text(campaign, "name"),
            platform: text(campaign, "platform"),
            spend: number(campaign, "spend"),
            revenue: number(campaign, "revenue"),
            impressions: number(campaign, "impressions"),
            clicks: number(campaign, "clicks"),
            conversions: number(campaign, "conversions"),
        }
    }

    pub fn roi(&self) -> f64 {
        roi_percent(self.revenue, self.spend)
    }

    pub fn ctr(&self) -> f64 {
        ctr_percent(self.clicks, self.impressions)
    }
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roi_percent() {
        assert_eq!(roi_percent(15000.0, 10000.0), 50.0);
        assert_eq!(roi_percent(5000.0, 10000.0), -50.0);
        assert_eq!(roi_percent(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_ctr_percent() {
        assert_eq!(ctr_percent(25.0, 1000.0), 2.5);
        assert_eq!(ctr_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_trust_level_thresholds() {
        assert_eq!(TrustLevel::from_score(95.0), TrustLevel::Trusted);
        assert_eq!(TrustLevel::from_score(90.0), TrustLevel::Trusted);
        assert_eq!(TrustLevel::from_score(89.9), TrustLevel::Verified);
        assert_eq!(TrustLevel::from_score(70.0), TrustLevel::Verified);
        assert_eq!(TrustLevel::from_score(50.0), TrustLevel::Caution);
        assert_eq!(TrustLevel::from_score(12.0), TrustLevel::Risk);
        assert_eq!(TrustLevel::Caution.to_string(), "Caution");
    }

    #[test]
    fn test_campaign_figures_from_json() {
        let campaign = json!({
            "id": "c1a2",
            "name": "Spring Sale",
            "platform": "facebook",
            "spend": "2000.00",
            "revenue": 3000,
            "impressions": 40000,
            "clicks": 800
        });
        let figures = CampaignFigures::from_json(&campaign);

        assert_eq!(figures.name, "Spring Sale");
        assert_eq!(figures.spend, 2000.0);
        assert_eq!(figures.conversions, 0.0);
        assert_eq!(figures.roi(), 50.0);
        assert_eq!(figures.ctr(), 2.0);
    }

    #[test]
    fn test_campaign_figures_tolerates_missing_fields() {
        let figures = CampaignFigures::from_json(&json!({"name": "Empty"}));
        assert_eq!(figures.roi(), 0.0);
        assert_eq!(figures.ctr(), 0.0);
        assert_eq!(figures.platform, "");
    }
}
