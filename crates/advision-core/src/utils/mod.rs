//! Utility modules for display formatting and client-side campaign metrics.

pub mod format;
pub mod metrics;

pub use format::{format_percent, shorten};
pub use metrics::{ctr_percent, roi_percent, CampaignFigures, TrustLevel};
