use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::config::PipelineSettings;
use crate::domain::costing::{CostTable, CostTally};
use crate::domain::dates::{parse_datetime, parse_marketplace_date};
use crate::domain::economics::price_sale;
use crate::domain::entities::ads::Campaign;
use crate::domain::entities::filter::DateRange;
use crate::domain::entities::order::{Channel, SaleLine, UnifiedOrder};
use crate::domain::entities::table::RawTable;
use crate::usecase::ports::source::{SalesSource, SourceError, TableKind};

pub mod marketplace {
    pub const DATE: &str = "Data da venda";
    pub const STATUS: &str = "Estado";
    pub const ORDER_ID: &str = "N.º de venda";
    pub const SKU: &str = "SKU";
    pub const TITLE: &str = "Título do anúncio";
    pub const UNITS: &str = "Unidades";
    pub const UNIT_PRICE: &str = "Preço unitário de venda do anúncio (BRL)";
    pub const REVENUE: &str = "Receita por produtos (BRL)";
    pub const FEES: &str = "Tarifa de venda e impostos (BRL)";
    pub const BUYER_STATE: &str = "Estado.1";
    pub const CITY: &str = "Cidade";

    pub const REQUIRED: [&str; 5] = [DATE, STATUS, ORDER_ID, TITLE, REVENUE];
}

pub mod reseller {
    pub const DATE: &str = "Data Compra";
    pub const ORDER_ID: &str = "Pedido";
    pub const SKU: &str = "SKU";
    pub const PRODUCT: &str = "Produto";
    pub const QUANTITY: &str = "Quantidade";
    pub const UNIT_PRICE: &str = "Preço Venda Un";
    pub const TOTAL: &str = "Total Venda 1";
    pub const REFERENCE: &str = "Referência";
    pub const UNIT_COST: &str = "Preço Custo Un";

    pub const REQUIRED: [&str; 7] = [DATE, ORDER_ID, SKU, PRODUCT, QUANTITY, UNIT_PRICE, TOTAL];
}

const NOT_AVAILABLE: &str = "N/A";
const PAID: &str = "paid";

/// The unified order table plus everything loaded alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataset {
    pub orders: Vec<UnifiedOrder>,
    pub campaigns: Option<Vec<Campaign>>,
    pub cost_tally: CostTally,
    pub warnings: Vec<String>,
    pub source: String,
    pub loaded_at: NaiveDateTime,
}

impl SalesDataset {
    pub fn date_span(&self) -> Option<DateRange> {
        let first = self.orders.iter().map(UnifiedOrder::day).min()?;
        let last = self.orders.iter().map(UnifiedOrder::day).max()?;
        Some(DateRange::new(first, last))
    }

    /// Distinct channels present, sorted by name.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.orders.iter().map(|order| order.channel).collect();
        channels.sort();
        channels.dedup();
        channels
    }

    pub fn has_ads(&self) -> bool {
        self.campaigns
            .as_ref()
            .is_some_and(|campaigns| !campaigns.is_empty())
    }
}

fn require_columns(
    table: &RawTable,
    kind: TableKind,
    columns: &[&str],
) -> Result<(), SourceError> {
    match columns.iter().find(|column| !table.has_column(column)) {
        Some(column) => Err(SourceError::MissingColumn {
            kind,
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

fn has_valid_state(status: &str, valid_states: &[String]) -> bool {
    let status = status.to_lowercase();
    valid_states
        .iter()
        .any(|state| status.contains(&state.to_lowercase()))
}

pub fn normalize_marketplace(
    table: &RawTable,
    settings: &PipelineSettings,
) -> Result<Vec<SaleLine>, SourceError> {
    use self::marketplace::*;
    require_columns(table, TableKind::MarketplaceOrders, &REQUIRED)?;

    let mut lines = Vec::new();
    let mut undated = 0_usize;
    let mut excluded = 0_usize;
    for record in table.records() {
        let date_cell = record.get(DATE);
        let Some(sold_at) = date_cell
            .as_text()
            .and_then(|text| parse_marketplace_date(&text))
            .or_else(|| parse_datetime(date_cell))
        else {
            undated += 1;
            continue;
        };

        let status = record.get(STATUS).text_or("");
        if !has_valid_state(&status, &settings.valid_states) {
            excluded += 1;
            continue;
        }

        lines.push(SaleLine {
            channel: Channel::MercadoLivre,
            order_id: record.get(ORDER_ID).text_or(""),
            sold_at,
            sku: Some(record.get(SKU).text_or(NOT_AVAILABLE)),
            reference: None,
            sheet_unit_cost: None,
            product: record.get(TITLE).text_or(""),
            quantity: record.get(UNITS).f64_or(1.0),
            unit_price: record.get(UNIT_PRICE).f64_or(0.0),
            gmv: record.get(REVENUE).f64_or(0.0),
            marketplace_fee: -record.get(FEES).f64_or(0.0),
            gateway_fee: 0.0,
            shipping: 0.0,
            tax: 0.0,
            opex: 0.0,
            state: record.get(BUYER_STATE).text_or(NOT_AVAILABLE),
            city: record.get(CITY).text_or(NOT_AVAILABLE),
            status: PAID.to_string(),
        });
    }

    debug!(
        kept = lines.len(),
        undated, excluded, "normalized marketplace sales"
    );
    Ok(lines)
}

pub fn normalize_reseller(
    table: &RawTable,
    settings: &PipelineSettings,
    warnings: &mut Vec<String>,
) -> Result<Vec<SaleLine>, SourceError> {
    use self::reseller::*;
    require_columns(table, TableKind::ResellerOrders, &REQUIRED)?;

    let mut lines = Vec::new();
    for (row_idx, record) in table.records().enumerate() {
        let Some(sold_at) = parse_datetime(record.get(DATE)) else {
            warnings.push(format!(
                "Braavo row {} skipped: unreadable purchase date",
                row_idx + 1
            ));
            continue;
        };

        let gmv = record.get(TOTAL).f64_or(0.0);
        lines.push(SaleLine {
            channel: Channel::Braavo,
            order_id: record.get(ORDER_ID).text_or(""),
            sold_at,
            sku: record.get(SKU).as_text(),
            reference: record.get(REFERENCE).as_text(),
            sheet_unit_cost: record.get(UNIT_COST).as_f64(),
            product: record.get(PRODUCT).text_or(""),
            quantity: record.get(QUANTITY).f64_or(1.0),
            unit_price: record.get(UNIT_PRICE).f64_or(0.0),
            gmv,
            marketplace_fee: 0.0,
            gateway_fee: gmv * settings.reseller_gateway_rate,
            shipping: 0.0,
            tax: 0.0,
            opex: 0.0,
            state: NOT_AVAILABLE.to_string(),
            city: NOT_AVAILABLE.to_string(),
            status: PAID.to_string(),
        });
    }

    debug!(kept = lines.len(), "normalized reseller sales");
    Ok(lines)
}

/// Prices every sale and unions the channels, marketplace rows first.
pub fn build_orders(
    marketplace_lines: Vec<SaleLine>,
    reseller_lines: Vec<SaleLine>,
    costs: &CostTable,
    settings: &PipelineSettings,
) -> (Vec<UnifiedOrder>, CostTally) {
    let mut tally = CostTally::default();
    let orders: Vec<UnifiedOrder> = marketplace_lines
        .into_iter()
        .chain(reseller_lines)
        .map(|line| {
            let order = price_sale(line, costs, &settings.costing);
            tally.record(order.cost_source);
            order
        })
        .collect();
    (orders, tally)
}

fn load_campaigns(source: &dyn SalesSource, warnings: &mut Vec<String>) -> Option<Vec<Campaign>> {
    match source.campaigns() {
        Ok(Some(table)) => Some(Campaign::from_table(&table)),
        Ok(None) => None,
        Err(err) => {
            warn!(error = %err, "ads report could not be loaded");
            warnings.push(format!("Mercado Ads ignored: {err}"));
            None
        }
    }
}

pub fn load_dataset(
    source: &dyn SalesSource,
    settings: &PipelineSettings,
    include_ads: bool,
) -> Result<SalesDataset, SourceError> {
    info!(source = %source.describe(), "loading sales");
    let mut warnings = Vec::new();

    let marketplace_table = source.marketplace_orders()?;
    let marketplace_lines = normalize_marketplace(&marketplace_table, settings)?;

    let reseller_table = source.reseller_orders()?;
    let reseller_lines = normalize_reseller(&reseller_table, settings, &mut warnings)?;

    let costs = match source.cost_reference()? {
        Some(table) => CostTable::from_table(&table),
        None => {
            warn!("no cost reference available; falling back to sheet and category costs");
            CostTable::default()
        }
    };

    let (orders, cost_tally) = build_orders(marketplace_lines, reseller_lines, &costs, settings);
    if orders.is_empty() {
        return Err(SourceError::Other(anyhow::anyhow!("no sales found")));
    }
    info!(
        orders = orders.len(),
        reference_skus = costs.len(),
        cost_tiers = %cost_tally.summary(),
        "sales loaded"
    );

    let campaigns = if include_ads {
        load_campaigns(source, &mut warnings)
    } else {
        None
    };
    for warning in &warnings {
        warn!("{warning}");
    }

    Ok(SalesDataset {
        orders,
        campaigns,
        cost_tally,
        warnings,
        source: source.describe(),
        loaded_at: Local::now().naive_local(),
    })
}
