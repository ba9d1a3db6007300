use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::entities::order::CostSource;
use crate::domain::entities::table::RawTable;

pub const COL_COST_SKU: &str = "Código do Produto";
pub const COL_COST_UNIT: &str = "Soma de CMC Unitário";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub keyword: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostingRules {
    pub sku_prefixes: Vec<String>,
    /// Checked in order; the first keyword contained in the product title wins.
    pub categories: Vec<CategoryCost>,
    pub default_cost: f64,
}

impl Default for CostingRules {
    fn default() -> Self {
        let categories = [
            ("BRETELLE", 74.64),
            ("MEIA", 14.41),
            ("JERSEY", 32.51),
            ("CAMISA", 30.13),
            ("BONE", 30.07),
            ("LUVA", 31.98),
            ("SHORT", 42.23),
            ("BERMUDA", 55.83),
            ("TRUCKPAD", 176.50),
        ]
        .into_iter()
        .map(|(keyword, cost)| CategoryCost {
            keyword: keyword.to_string(),
            cost,
        })
        .collect();

        Self {
            sku_prefixes: vec![String::new(), "NMD".to_string()],
            categories,
            default_cost: 44.16,
        }
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Unit cost per product code, taken from the inventory export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTable {
    costs: HashMap<String, f64>,
}

impl CostTable {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut costs = HashMap::new();
        for (sku, cost) in entries {
            let key = normalize_key(sku.as_ref());
            if key.is_empty() {
                continue;
            }
            costs.entry(key).or_insert(cost);
        }
        Self { costs }
    }

    /// Rows without a code or a numeric cost are skipped.
    pub fn from_table(table: &RawTable) -> Self {
        Self::from_entries(table.records().filter_map(|record| {
            let sku = record.get(COL_COST_SKU).as_text()?;
            let cost = record.get(COL_COST_UNIT).as_f64()?;
            Some((sku, cost))
        }))
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.costs.get(&normalize_key(code)).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CostQuery<'a> {
    pub reference: Option<&'a str>,
    pub sku: Option<&'a str>,
    pub sheet_unit_cost: Option<f64>,
    pub product: &'a str,
}

pub fn resolve_unit_cost(
    query: CostQuery<'_>,
    table: &CostTable,
    rules: &CostingRules,
) -> (f64, CostSource) {
    if let Some(cost) = query.reference.and_then(|reference| table.get(reference)) {
        return (cost, CostSource::Reference);
    }

    if let Some(sku) = query.sku {
        let sku = normalize_key(sku);
        for prefix in &rules.sku_prefixes {
            if let Some(cost) = table.get(&format!("{prefix}{sku}")) {
                return (cost, CostSource::Sku);
            }
        }
    }

    if let Some(cost) = query.sheet_unit_cost.filter(|cost| *cost > 0.0) {
        return (cost, CostSource::SheetCost);
    }

    let product = query.product.to_uppercase();
    if let Some(category) = rules
        .categories
        .iter()
        .find(|category| product.contains(&category.keyword.to_uppercase()))
    {
        return (category.cost, CostSource::Category);
    }

    (rules.default_cost, CostSource::Default)
}

/// Number of sales answered by each tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostTally(BTreeMap<CostSource, usize>);

impl CostTally {
    pub fn record(&mut self, source: CostSource) {
        *self.0.entry(source).or_insert(0) += 1;
    }

    pub fn count(&self, source: CostSource) -> usize {
        self.0.get(&source).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(source, count)| format!("{}={count}", source.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
