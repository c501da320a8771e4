//! Plan catalog.
//!
//! Plans are configuration: the catalog is loaded once at startup and every
//! order and grant is checked against it, never against client-sent values.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Longest plan we sell, in months.
pub const MAX_DURATION_MONTHS: u32 = 120;

/// A subscription tier on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub sku: String,
    pub name: String,
    /// Price in minor currency units (paise for INR).
    pub price: i64,
    pub duration_months: u32,
}

impl Plan {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        duration_months: u32,
    ) -> Result<Self, ValidationError> {
        let sku = sku.into();
        let name = name.into();
        if sku.trim().is_empty() {
            return Err(ValidationError::empty_field("sku"));
        }
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if price <= 0 {
            return Err(ValidationError::out_of_range("price", 1, i64::MAX, price));
        }
        if duration_months == 0 || duration_months > MAX_DURATION_MONTHS {
            return Err(ValidationError::out_of_range(
                "duration_months",
                1,
                MAX_DURATION_MONTHS as i64,
                duration_months as i64,
            ));
        }
        Ok(Self {
            sku,
            name,
            price,
            duration_months,
        })
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read plan catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse plan catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid plan '{sku}': {source}")]
    InvalidPlan {
        sku: String,
        #[source]
        source: ValidationError,
    },

    #[error("Duplicate plan SKU: {0}")]
    DuplicateSku(String),

    #[error("Plan catalog is empty")]
    Empty,
}

#[derive(Deserialize)]
struct CatalogFile {
    plans: Vec<Plan>,
}

/// The set of plans on sale, keyed by SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// Builds a catalog, re-validating each plan and rejecting duplicate SKUs.
    pub fn new(plans: Vec<Plan>) -> Result<Self, CatalogError> {
        if plans.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(plans.len());
        for plan in plans {
            if !seen.insert(plan.sku.clone()) {
                return Err(CatalogError::DuplicateSku(plan.sku));
            }
            let sku = plan.sku.clone();
            let plan = Plan::new(plan.sku, plan.name, plan.price, plan.duration_months)
                .map_err(|source| CatalogError::InvalidPlan { sku, source })?;
            validated.push(plan);
        }
        Ok(Self { plans: validated })
    }

    /// The plans sold when no catalog file is configured.
    pub fn builtin() -> Self {
        let plans = vec![
            Plan {
                sku: "basic-monthly".to_string(),
                name: "Basic Plan".to_string(),
                price: 49_900,
                duration_months: 1,
            },
            Plan {
                sku: "premium-monthly".to_string(),
                name: "Premium Plan".to_string(),
                price: 99_900,
                duration_months: 1,
            },
            Plan {
                sku: "premium-annual".to_string(),
                name: "Premium Annual".to_string(),
                price: 999_000,
                duration_months: 12,
            },
        ];
        Self { plans }
    }

    /// Parses a YAML document of the form `plans: [{sku, name, price, duration_months}]`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.plans)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Loads from `path` when given, otherwise returns the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn get(&self, sku: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.sku == sku)
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }
}
