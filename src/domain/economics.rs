use crate::domain::costing::{resolve_unit_cost, CostQuery, CostTable, CostingRules};
use crate::domain::entities::order::{SaleLine, UnifiedOrder};

pub fn net_profit(gmv: f64, total_cost: f64, deductions: [f64; 5]) -> f64 {
    gmv - total_cost - deductions.iter().sum::<f64>()
}

/// Zero when there is no revenue to divide by.
pub fn margin_pct(net_profit: f64, gmv: f64) -> f64 {
    let margin = net_profit / gmv * 100.0;
    if margin.is_finite() {
        margin
    } else {
        0.0
    }
}

pub fn price_sale(line: SaleLine, costs: &CostTable, rules: &CostingRules) -> UnifiedOrder {
    let (unit_cost, cost_source) = resolve_unit_cost(
        CostQuery {
            reference: line.reference.as_deref(),
            sku: line.sku.as_deref(),
            sheet_unit_cost: line.sheet_unit_cost,
            product: &line.product,
        },
        costs,
        rules,
    );

    let total_cost = unit_cost * line.quantity;
    let net = net_profit(
        line.gmv,
        total_cost,
        [
            line.marketplace_fee,
            line.gateway_fee,
            line.shipping,
            line.tax,
            line.opex,
        ],
    );

    UnifiedOrder {
        channel: line.channel,
        order_id: line.order_id,
        sold_at: line.sold_at,
        sku: line.sku.unwrap_or_else(|| "N/A".to_string()),
        product: line.product,
        quantity: line.quantity,
        unit_price: line.unit_price,
        gmv: line.gmv,
        unit_cost,
        cost_source,
        total_cost,
        marketplace_fee: line.marketplace_fee,
        gateway_fee: line.gateway_fee,
        shipping: line.shipping,
        tax: line.tax,
        opex: line.opex,
        net_profit: net,
        margin_pct: margin_pct(net, line.gmv),
        state: line.state,
        city: line.city,
        status: line.status,
    }
}
