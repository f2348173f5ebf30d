//! Plan catalog.
//!
//! Holds the ordered list of pricing tiers offered to visitors. The catalog is
//! loaded once at startup, either from a JSON file or from the built-in
//! defaults, and is immutable afterwards.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use thiserror::Error;

use crate::models::{Feature, PricingTier};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read plan catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse plan catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Plan catalog is empty")]
    Empty,

    #[error("Duplicate tier name: {0}")]
    DuplicateTier(String),

    #[error("More than one highlighted tier: {first} and {second}")]
    MultipleHighlighted { first: String, second: String },

    #[error("Tier {tier} has comparison keys that differ from {reference}")]
    ComparisonMismatch { tier: String, reference: String },
}

/// Read-only catalog of pricing tiers.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    tiers: Vec<PricingTier>,
}

impl PlanCatalog {
    /// Build a catalog from tiers, rejecting any that break the catalog rules.
    pub fn from_tiers(tiers: Vec<PricingTier>) -> Result<Self, CatalogError> {
        let catalog = Self { tiers };
        catalog.check_invariants()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON array of tiers.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let tiers: Vec<PricingTier> = serde_json::from_str(&raw)?;
        tracing::info!(path = %path.display(), tiers = tiers.len(), "Loaded plan catalog");
        Self::from_tiers(tiers)
    }

    /// Tiers in display order.
    pub fn list_tiers(&self) -> &[PricingTier] {
        &self.tiers
    }

    /// Look up a tier by exact name.
    pub fn find_tier(&self, name: &str) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Verify the catalog rules:
    /// - at least one tier
    /// - tier names are unique
    /// - at most one tier is highlighted
    /// - every tier defines the same comparison keys
    pub fn check_invariants(&self) -> Result<(), CatalogError> {
        let first = self.tiers.first().ok_or(CatalogError::Empty)?;

        let mut names = HashSet::new();
        for tier in &self.tiers {
            if !names.insert(tier.name.as_str()) {
                return Err(CatalogError::DuplicateTier(tier.name.clone()));
            }
        }

        let mut highlighted = self.tiers.iter().filter(|t| t.highlighted);
        if let (Some(a), Some(b)) = (highlighted.next(), highlighted.next()) {
            return Err(CatalogError::MultipleHighlighted {
                first: a.name.clone(),
                second: b.name.clone(),
            });
        }

        let reference: BTreeSet<&String> = first.feature_comparison.keys().collect();
        for tier in &self.tiers[1..] {
            let keys: BTreeSet<&String> = tier.feature_comparison.keys().collect();
            if keys != reference {
                return Err(CatalogError::ComparisonMismatch {
                    tier: tier.name.clone(),
                    reference: first.name.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Default for PlanCatalog {
    /// Built-in Free / Pro / Business catalog.
    fn default() -> Self {
        Self {
            tiers: vec![
                tier(
                    "Free",
                    "$0",
                    "$0",
                    false,
                    &[
                        ("Basic tools", "Merge, split, compress and rotate PDFs"),
                        ("Standard support", "Community help center"),
                    ],
                    &[
                        ("Documents per month", "10"),
                        ("Max file size", "10 MB"),
                        ("Document analysis", "No"),
                        ("Priority support", "No"),
                    ],
                ),
                tier(
                    "Pro",
                    "$9",
                    "$86",
                    true,
                    &[
                        ("All conversion tools", "PDF to and from Word, Excel and PowerPoint"),
                        ("Document analysis", "Analyze PDF, Word, Excel, CSV and text files"),
                        ("Email support", "Replies within one business day"),
                    ],
                    &[
                        ("Documents per month", "500"),
                        ("Max file size", "100 MB"),
                        ("Document analysis", "Yes"),
                        ("Priority support", "No"),
                    ],
                ),
                tier(
                    "Business",
                    "$29",
                    "$278",
                    false,
                    &[
                        ("Everything in Pro", "All tools and analysis features"),
                        ("Team seats", "Up to 10 members"),
                        ("Priority support", "Dedicated support channel"),
                    ],
                    &[
                        ("Documents per month", "Unlimited"),
                        ("Max file size", "1 GB"),
                        ("Document analysis", "Yes"),
                        ("Priority support", "Yes"),
                    ],
                ),
            ],
        }
    }
}

fn tier(
    name: &str,
    monthly: &str,
    yearly: &str,
    highlighted: bool,
    features: &[(&str, &str)],
    comparison: &[(&str, &str)],
) -> PricingTier {
    PricingTier {
        name: name.to_string(),
        monthly_price: monthly.to_string(),
        yearly_price: yearly.to_string(),
        features: features
            .iter()
            .map(|(name, description)| Feature {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect(),
        highlighted,
        feature_comparison: comparison
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}
