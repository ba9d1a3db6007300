use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};

use crate::domain::entities::ads::Campaign;
use crate::domain::entities::filter::ChannelFilter;
use crate::ui::format::{format_count, format_date_br, format_money, format_money_whole, format_pct};
use crate::usecase::services::report::{AdsView, ConsolidatedView, ProductTotals, SalesView};

fn table_with_header(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header.to_vec());
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn metric_table(rows: Vec<(&str, String)>) -> Table {
    let mut table = table_with_header(&["Indicador", "Valor"]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), right(value)]);
    }
    table
}

fn product_table(title: &str, products: &[ProductTotals]) -> Table {
    let mut table = table_with_header(&[title, "Receita", "Lucro", "Unidades"]);
    for item in products {
        table.add_row(vec![
            Cell::new(&item.product),
            right(format_money(item.revenue)),
            right(format_money(item.profit)),
            right(format_count(item.units)),
        ]);
    }
    table
}

fn campaign_table(title: &str, campaigns: &[Campaign]) -> Table {
    let mut table = table_with_header(&[title, "Receita", "Investimento", "ROAS"]);
    for item in campaigns {
        table.add_row(vec![
            Cell::new(&item.name),
            right(format_money(item.revenue)),
            right(format_money(item.spend)),
            right(format!("{:.2}x", item.roas)),
        ]);
    }
    table
}

pub fn render_sales(view: &SalesView) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Período: {} a {}",
        format_date_br(view.range.start),
        format_date_br(view.range.end)
    ));
    if view.channel != ChannelFilter::All {
        out.push_str(&format!(" | Canal: {}", view.channel.label()));
    }
    out.push('\n');

    let kpis = &view.kpis;
    out.push_str(&format!(
        "{}\n",
        metric_table(vec![
            ("Receita (GMV)", format_money(kpis.revenue)),
            ("Vendas", kpis.orders.to_string()),
            ("Lucro Líquido", format_money(kpis.profit)),
            ("Margem média", format_pct(kpis.mean_margin_pct, 1)),
            ("Taxas Pagas", format_money(kpis.fees)),
            ("Taxas / receita", format_pct(kpis.fee_share_pct, 1)),
            ("Ticket Médio", format_money(kpis.mean_ticket)),
            ("Unidades", format_count(kpis.units)),
        ])
    ));

    let mut channels = table_with_header(&[
        "Canal", "Receita", "Lucro", "Vendas", "Margem", "Taxas", "Ticket",
    ]);
    for summary in &view.channels {
        channels.add_row(vec![
            Cell::new(summary.channel.label()),
            right(format_money_whole(summary.revenue)),
            right(format_money_whole(summary.profit)),
            right(summary.orders.to_string()),
            right(format_pct(summary.margin_pct, 1)),
            right(format_money_whole(summary.fees)),
            right(format_money(summary.ticket)),
        ]);
    }
    out.push_str(&format!("{channels}\n"));

    let mut daily = table_with_header(&["Dia", "Canal", "Receita", "Lucro", "Unidades"]);
    for point in &view.daily {
        daily.add_row(vec![
            Cell::new(format_date_br(point.day)),
            Cell::new(point.channel.label()),
            right(format_money(point.revenue)),
            right(format_money(point.profit)),
            right(format_count(point.units)),
        ]);
    }
    out.push_str(&format!("{daily}\n"));

    out.push_str(&format!(
        "{}\n",
        product_table("Top 10 por Receita", &view.top_by_revenue)
    ));
    out.push_str(&format!(
        "{}\n",
        product_table("Top 10 por Lucro", &view.top_by_profit)
    ));
    out
}

pub fn render_ads(view: &AdsView) -> String {
    let kpis = &view.kpis;
    let mut out = format!(
        "{}\n",
        metric_table(vec![
            ("Investimento", format_money(kpis.spend)),
            ("Receita Ads", format_money(kpis.revenue)),
            ("ROAS", format!("{:.2}x", kpis.roas)),
            ("ACOS (meta 25%)", format_pct(kpis.acos_pct, 1)),
            ("Vendas por Ads", format_count(kpis.ad_sales)),
            ("Cliques", format_count(kpis.clicks)),
            ("Impressões", format_count(kpis.impressions)),
            ("CTR", format_pct(kpis.ctr_pct, 2)),
        ])
    );
    out.push_str(&format!(
        "{}\n",
        campaign_table("Top 10 por Receita", &view.top_by_revenue)
    ));
    out.push_str(&format!(
        "{}\n",
        campaign_table("Top 10 por ROAS", &view.top_by_roas)
    ));
    out
}

pub fn render_consolidated(view: &ConsolidatedView) -> String {
    format!(
        "{}\n",
        metric_table(vec![
            ("Receita Total", format_money(view.sales_revenue)),
            ("Lucro de Vendas", format_money(view.sales_profit)),
            ("Investimento Ads", format_money(view.ads_spend)),
            ("Ads / receita", format_pct(view.spend_share_pct, 1)),
            ("Lucro Real", format_money(view.real_profit)),
            ("Margem real", format_pct(view.real_margin_pct, 1)),
            ("ROI Ads", format_pct(view.roi_pct, 1)),
            ("Receita gerada por Ads", format_money_whole(view.ads_revenue)),
        ])
    )
}
