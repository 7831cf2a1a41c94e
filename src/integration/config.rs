//! Integrator coefficient configuration

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GJ_MAX_ORDER, DEFAULT_GJ_ORDER, GJ_ORDER_LIMIT};
use crate::integration::coeffs::CoefficientTable;
use crate::integration::errors::{CoefficientError, Result};

/// Order settings for a Gauss-Jackson integrator
///
/// ```rust
/// use astrodyn::integration::GaussJacksonConfig;
///
/// let config = GaussJacksonConfig::from_json_str(r#"{ "max_order": 10, "order": 8 }"#).unwrap();
/// let table = config.build_table().unwrap();
/// assert_eq!(table.order(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussJacksonConfig {
    /// Largest order the coefficient table is allocated for
    pub max_order: usize,
    /// Order used when the table is first populated
    pub order: usize,
}

impl Default for GaussJacksonConfig {
    fn default() -> Self {
        Self {
            max_order: DEFAULT_GJ_MAX_ORDER,
            order: DEFAULT_GJ_ORDER,
        }
    }
}

impl GaussJacksonConfig {
    /// Create a configuration with explicit orders
    pub fn new(max_order: usize, order: usize) -> Self {
        Self { max_order, order }
    }

    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the orders against each other and against the supported limit
    pub fn validate(&self) -> Result<()> {
        if self.order > self.max_order {
            warn!(
                "Configured order {} exceeds max_order {}",
                self.order, self.max_order
            );
            return Err(CoefficientError::InvalidConfig(format!(
                "order {} exceeds max_order {}",
                self.order, self.max_order
            )));
        }
        if self.max_order > GJ_ORDER_LIMIT {
            warn!(
                "Configured max_order {} exceeds supported limit {}",
                self.max_order, GJ_ORDER_LIMIT
            );
            return Err(CoefficientError::InvalidConfig(format!(
                "max_order {} exceeds the supported limit {}",
                self.max_order, GJ_ORDER_LIMIT
            )));
        }
        Ok(())
    }

    /// Allocate and populate a coefficient table for this configuration
    pub fn build_table(&self) -> Result<CoefficientTable> {
        self.validate()?;
        let mut table = CoefficientTable::with_max_order(self.max_order);
        table.compute_coeffs(self.order)?;
        Ok(table)
    }
}
