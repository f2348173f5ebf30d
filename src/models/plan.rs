//! Pricing tier model for the plan catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Billing cadence of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    /// Billed every month
    #[default]
    Monthly,
    /// Billed once a year
    Yearly,
}

impl BillingPeriod {
    /// Returns the wire representation of the period.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Yearly => "yearly",
        }
    }

    /// Suffix appended to a displayed price, e.g. `$9/month`.
    pub fn price_suffix(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "/month",
            BillingPeriod::Yearly => "/year",
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single feature bullet shown on a tier card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
}

/// A named pricing and feature bundle a visitor can subscribe to.
///
/// Prices are opaque, currency-formatted strings. They are only ever
/// displayed, never used for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    /// Tier name, unique within a catalog
    pub name: String,

    /// Price shown for monthly billing (e.g. "$9")
    pub monthly_price: String,

    /// Price shown for yearly billing (e.g. "$86")
    pub yearly_price: String,

    /// Ordered feature list
    #[serde(default)]
    pub features: Vec<Feature>,

    /// Marks the "most popular" tier; advisory only
    #[serde(default)]
    pub highlighted: bool,

    /// Feature name -> value shown in the comparison table
    #[serde(default)]
    pub feature_comparison: BTreeMap<String, String>,
}

impl PricingTier {
    /// Price for the given billing period, without a suffix.
    pub fn price_for(&self, period: BillingPeriod) -> &str {
        match period {
            BillingPeriod::Monthly => &self.monthly_price,
            BillingPeriod::Yearly => &self.yearly_price,
        }
    }

    /// Price for the given billing period with its display suffix.
    pub fn display_price(&self, period: BillingPeriod) -> String {
        format!("{}{}", self.price_for(period), period.price_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pro() -> PricingTier {
        PricingTier {
            name: "Pro".to_string(),
            monthly_price: "$9".to_string(),
            yearly_price: "$86".to_string(),
            features: vec![],
            highlighted: true,
            feature_comparison: BTreeMap::new(),
        }
    }

    #[test]
    fn test_display_price_per_period() {
        let tier = pro();
        assert_eq!(tier.display_price(BillingPeriod::Monthly), "$9/month");
        assert_eq!(tier.display_price(BillingPeriod::Yearly), "$86/year");
    }

    #[test]
    fn test_billing_period_serialization() {
        assert_eq!(
            serde_json::to_string(&BillingPeriod::Yearly).unwrap(),
            "\"yearly\""
        );
        let period: BillingPeriod = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(period, BillingPeriod::Monthly);
        assert!(serde_json::from_str::<BillingPeriod>("\"weekly\"").is_err());
    }

    #[test]
    fn test_tier_deserialization_uses_camel_case() {
        let json = r#"{
            "name": "Business",
            "monthlyPrice": "$29",
            "yearlyPrice": "$278",
            "features": [{"name": "OCR", "description": "Text recognition"}],
            "featureComparison": {"Storage": "100 GB"}
        }"#;

        let tier: PricingTier = serde_json::from_str(json).expect("Failed to deserialize tier");
        assert_eq!(tier.name, "Business");
        assert_eq!(tier.yearly_price, "$278");
        assert!(!tier.highlighted);
        assert_eq!(tier.features[0].name, "OCR");
        assert_eq!(tier.feature_comparison.get("Storage").map(String::as_str), Some("100 GB"));
    }
}
