//! Kusto cluster helpers: SKU tiers, language extensions and autoscale

use std::collections::HashMap;

use azrm_core::resource::Value;

pub const SKU_NAMES: &[&str] = &[
    "Dev(No SLA)_Standard_D11_v2",
    "Dev(No SLA)_Standard_E2a_v4",
    "Standard_D14_v2",
    "Standard_D11_v2",
    "Standard_D13_v2",
    "Standard_D12_v2",
    "Standard_DS14_v2+4TB_PS",
    "Standard_DS14_v2+3TB_PS",
    "Standard_DS13_v2+1TB_PS",
    "Standard_DS13_v2+2TB_PS",
    "Standard_E80ids_v4",
    "Standard_E8a_v4",
    "Standard_E8as_v4+1TB_PS",
    "Standard_E8as_v4+2TB_PS",
    "Standard_E4a_v4",
    "Standard_E16a_v4",
    "Standard_E16as_v4+4TB_PS",
    "Standard_E16as_v4+3TB_PS",
    "Standard_E64i_v3",
    "Standard_E2a_v4",
    "Standard_L8s",
    "Standard_L8s_v2",
    "Standard_L4s",
    "Standard_L16s",
    "Standard_L16s_v2",
];

pub const LANGUAGE_EXTENSIONS: &[&str] = &["PYTHON", "R"];
pub const ENGINE_TYPES: &[&str] = &["V2", "V3"];

/// Tier of a SKU, taken from the part of its name before the first `_`
///
/// `Dev(No SLA)_Standard_D11_v2` is `Basic`, `Standard_D13_v2` is `Standard`.
pub fn sku_tier(sku_name: &str) -> Result<&'static str, String> {
    let prefix = sku_name.split('_').next().unwrap_or_default();
    match prefix {
        "Dev(No SLA)" => Ok("Basic"),
        "Standard" => Ok("Standard"),
        _ => Err(format!(
            "sku name begins with invalid tier, possible are Dev(No SLA) and Standard but is: {:?}",
            prefix
        )),
    }
}

/// Engine used when `engine` is not configured
pub fn default_engine(four_point_oh_beta: bool) -> &'static str {
    if four_point_oh_beta { "V3" } else { "V2" }
}

/// Names in `a` that are not in `b`, in `a`'s order
pub fn diff_language_extensions(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|name| !b.contains(name)).cloned().collect()
}

/// Instance bounds of the optimized autoscale block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoScale {
    pub minimum: i64,
    pub maximum: i64,
}

impl AutoScale {
    /// Read `minimum_instances` / `maximum_instances` from the block value
    pub fn from_block(block: &HashMap<String, Value>) -> Option<Self> {
        Some(Self {
            minimum: block.get("minimum_instances")?.as_int()?,
            maximum: block.get("maximum_instances")?.as_int()?,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.minimum > self.maximum {
            return Err(
                "`optimized_auto_scale.maximum_instances` must be >= `optimized_auto_scale.minimum_instances`"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Keep the requested capacity inside the autoscale range
    ///
    /// Without a requested capacity the minimum is used.
    pub fn clamp_capacity(&self, capacity: Option<i64>) -> i64 {
        match capacity {
            Some(c) if c < self.minimum => self.minimum,
            Some(c) if c > self.maximum => self.maximum,
            Some(c) => c,
            None => self.minimum,
        }
    }
}
