use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::order::{UnifiedOrder, EXPORT_COLUMNS};
use crate::domain::entities::table::{format_number, Cell};

/// Reads a csv export as a grid of text cells; the first line stays in the grid.
pub fn read_csv_grid(csv_path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        grid.push(
            record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(value.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

fn order_record(order: &UnifiedOrder) -> Vec<String> {
    vec![
        order.channel.label().to_string(),
        order.order_id.clone(),
        order.sold_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        order.sku.clone(),
        order.product.clone(),
        format_number(order.quantity),
        format_number(order.unit_price),
        format_number(order.gmv),
        format_number(order.unit_cost),
        format_number(order.total_cost),
        format_number(order.marketplace_fee),
        format_number(order.gateway_fee),
        format_number(order.shipping),
        format_number(order.tax),
        format_number(order.opex),
        format_number(order.net_profit),
        format_number(order.margin_pct),
        order.state.clone(),
        order.city.clone(),
        order.status.clone(),
        order.month(),
        order.day().format("%Y-%m-%d").to_string(),
        order.weekday().to_string(),
        format_number(order.total_fee()),
    ]
}

pub fn export_orders_csv(out_path: &Path, orders: &[UnifiedOrder]) -> Result<usize> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("failed to create csv: {}", out_path.display()))?;
    writer
        .write_record(EXPORT_COLUMNS)
        .context("failed to write csv header")?;
    for order in orders {
        writer
            .write_record(order_record(order))
            .context("failed to write csv record")?;
    }
    writer.flush().context("failed to flush csv")?;
    Ok(orders.len())
}
