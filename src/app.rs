use std::sync::Arc;

use chrono::{Local, NaiveDate};
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use tracing::{info, warn};

use crate::build_service;
use crate::config::{AppConfig, SourceKind};
use crate::domain::dates::parse_day;
use crate::domain::entities::ads::Campaign;
use crate::domain::entities::filter::{ChannelFilter, Period, ViewTab};
use crate::domain::entities::order::UnifiedOrder;
use crate::infra::import::csv::export_orders_csv;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::format::{
    bar_width_pct, format_count, format_date_br, format_money, format_money_whole, format_pct,
};
use crate::ui::state::app_state::{AppState, DailyMetric};
use crate::usecase::services::dashboard::DashboardService;
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::report::{
    ads_view, channel_options, consolidated_view, filter_orders, sales_view, AdsView,
    ConsolidatedView, DailyPoint, ProductTotals, SalesView,
};

const SIDEBAR_STYLE: &str = "width: 250px; padding: 16px; background: #f3f5f9; border-right: 1px solid #dde2ea; display: flex; flex-direction: column; gap: 12px;";
const BUTTON_STYLE: &str = "border: 1px solid #bbb; background: #fff; padding: 6px 10px; border-radius: 6px; cursor: pointer;";
const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; font-size: 13px;";
const CELL_STYLE: &str = "border-bottom: 1px solid #eee; padding: 4px 8px;";
const NUMBER_CELL_STYLE: &str = "border-bottom: 1px solid #eee; padding: 4px 8px; text-align: right;";

/// Handed to the window through the launch builder.
#[derive(Clone)]
pub struct LaunchContext {
    pub config: AppConfig,
    pub service: Arc<DashboardService>,
}

fn iso_date(day: Option<NaiveDate>) -> String {
    day.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn show_error(title: &str, err: &anyhow::Error) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(format!("{err:#}"))
        .set_buttons(MessageButtons::Ok)
        .show();
}

#[component]
fn KpiCard(label: String, value: String, delta: Option<String>) -> Element {
    rsx! {
        div {
            style: "flex: 1; min-width: 160px; background: #fff; border: 1px solid #e3e6ec; border-radius: 8px; padding: 10px 12px;",
            div { style: "color: #666; font-size: 12px;", "{label}" }
            div { style: "font-size: 20px; font-weight: 600; margin-top: 4px;", "{value}" }
            if let Some(delta) = delta {
                div { style: "color: #2e7d32; font-size: 12px; margin-top: 2px;", "{delta}" }
            }
        }
    }
}

#[component]
fn ChannelComparison(view: SalesView) -> Element {
    rsx! {
        table { style: TABLE_STYLE,
            thead {
                tr {
                    for header in ["Canal", "Receita", "Lucro", "Vendas", "Margem", "Taxas", "Ticket"] {
                        th { style: CELL_STYLE, "{header}" }
                    }
                }
            }
            tbody {
                {view.channels.iter().map(|summary| {
                    let label = summary.channel.label();
                    let revenue = format_money_whole(summary.revenue);
                    let profit = format_money_whole(summary.profit);
                    let orders = summary.orders;
                    let margin = format_pct(summary.margin_pct, 1);
                    let fees = format_money_whole(summary.fees);
                    let ticket = format_money(summary.ticket);
                    rsx!(
                        tr {
                            td { style: CELL_STYLE, "{label}" }
                            td { style: NUMBER_CELL_STYLE, "{revenue}" }
                            td { style: NUMBER_CELL_STYLE, "{profit}" }
                            td { style: NUMBER_CELL_STYLE, "{orders}" }
                            td { style: NUMBER_CELL_STYLE, "{margin}" }
                            td { style: NUMBER_CELL_STYLE, "{fees}" }
                            td { style: NUMBER_CELL_STYLE, "{ticket}" }
                        }
                    )
                })}
            }
        }
    }
}

fn daily_value(point: &DailyPoint, metric: DailyMetric) -> f64 {
    match metric {
        DailyMetric::Revenue => point.revenue,
        DailyMetric::Profit => point.profit,
        DailyMetric::Units => point.units,
    }
}

fn daily_label(value: f64, metric: DailyMetric) -> String {
    match metric {
        DailyMetric::Units => format_count(value),
        DailyMetric::Revenue | DailyMetric::Profit => format_money(value),
    }
}

#[component]
fn DailyTable(points: Vec<DailyPoint>, metric: DailyMetric) -> Element {
    let max = points
        .iter()
        .map(|point| daily_value(point, metric))
        .fold(0.0_f64, f64::max);
    rsx! {
        table { style: TABLE_STYLE,
            tbody {
                {points.iter().map(|point| {
                    let value = daily_value(point, metric);
                    let day = format_date_br(point.day);
                    let channel = point.channel.label();
                    let color = point.channel.color();
                    let width = bar_width_pct(value, max);
                    let text = daily_label(value, metric);
                    rsx!(
                        tr {
                            td { style: "{CELL_STYLE} width: 90px;", "{day}" }
                            td { style: "{CELL_STYLE} width: 110px;", "{channel}" }
                            td { style: CELL_STYLE,
                                div { style: "height: 12px; width: {width}%; background: {color}; border-radius: 3px;" }
                            }
                            td { style: "{NUMBER_CELL_STYLE} width: 120px;", "{text}" }
                        }
                    )
                })}
            }
        }
    }
}

#[component]
fn ProductTable(title: String, products: Vec<ProductTotals>) -> Element {
    rsx! {
        div { style: "flex: 1; min-width: 320px;",
            h4 { "{title}" }
            table { style: TABLE_STYLE,
                thead {
                    tr {
                        th { style: CELL_STYLE, "Produto" }
                        th { style: CELL_STYLE, "Receita" }
                        th { style: CELL_STYLE, "Lucro" }
                        th { style: CELL_STYLE, "Unidades" }
                    }
                }
                tbody {
                    {products.iter().map(|item| {
                        let product = item.product.clone();
                        let revenue = format_money(item.revenue);
                        let profit = format_money(item.profit);
                        let units = format_count(item.units);
                        rsx!(
                            tr {
                                td { style: CELL_STYLE, "{product}" }
                                td { style: NUMBER_CELL_STYLE, "{revenue}" }
                                td { style: NUMBER_CELL_STYLE, "{profit}" }
                                td { style: NUMBER_CELL_STYLE, "{units}" }
                            }
                        )
                    })}
                }
            }
        }
    }
}

#[component]
fn CampaignTable(title: String, campaigns: Vec<Campaign>) -> Element {
    rsx! {
        div { style: "flex: 1; min-width: 320px;",
            h4 { "{title}" }
            table { style: TABLE_STYLE,
                thead {
                    tr {
                        th { style: CELL_STYLE, "Campanha" }
                        th { style: CELL_STYLE, "Receita" }
                        th { style: CELL_STYLE, "Investimento" }
                        th { style: CELL_STYLE, "ROAS" }
                    }
                }
                tbody {
                    {campaigns.iter().map(|item| {
                        let name = item.name.clone();
                        let revenue = format_money(item.revenue);
                        let spend = format_money(item.spend);
                        let roas = format!("{:.2}x", item.roas);
                        rsx!(
                            tr {
                                td { style: CELL_STYLE, "{name}" }
                                td { style: NUMBER_CELL_STYLE, "{revenue}" }
                                td { style: NUMBER_CELL_STYLE, "{spend}" }
                                td { style: NUMBER_CELL_STYLE, "{roas}" }
                            }
                        )
                    })}
                }
            }
        }
    }
}

#[component]
fn SalesPanel(view: SalesView, metric: DailyMetric, on_metric: EventHandler<DailyMetric>) -> Element {
    let kpis = view.kpis.clone();
    rsx! {
        div { style: "display: flex; flex-wrap: wrap; gap: 10px;",
            KpiCard {
                label: "💰 Receita (GMV)",
                value: format_money(kpis.revenue),
                delta: format!("{} vendas", kpis.orders),
            }
            KpiCard {
                label: "💵 Lucro Líquido",
                value: format_money(kpis.profit),
                delta: format!("{} margem", format_pct(kpis.mean_margin_pct, 1)),
            }
            KpiCard {
                label: "💳 Taxas Pagas",
                value: format_money(kpis.fees),
                delta: format!("{} da receita", format_pct(kpis.fee_share_pct, 1)),
            }
            KpiCard {
                label: "🎫 Ticket Médio",
                value: format_money(kpis.mean_ticket),
                delta: format!("{} unidades", format_count(kpis.units)),
            }
        }

        h3 { "Comparativo por canal" }
        ChannelComparison { view: view.clone() }

        h3 { "Evolução diária" }
        div { style: "display: flex; gap: 6px; margin-bottom: 8px;",
            {DailyMetric::ALL.into_iter().map(|candidate| {
                let background = if candidate == metric { "#e8f0fe" } else { "#fff" };
                let text = candidate.label();
                rsx!(
                    button {
                        style: "{BUTTON_STYLE} background: {background};",
                        onclick: move |_| on_metric.call(candidate),
                        "{text}"
                    }
                )
            })}
        }
        DailyTable { points: view.daily.clone(), metric: metric }

        div { style: "display: flex; flex-wrap: wrap; gap: 16px; margin-top: 12px;",
            ProductTable { title: "🏆 Top 10 por Receita", products: view.top_by_revenue.clone() }
            ProductTable { title: "💎 Top 10 por Lucro", products: view.top_by_profit.clone() }
        }
    }
}

#[component]
fn AdsPanel(view: AdsView) -> Element {
    let kpis = view.kpis.clone();
    rsx! {
        div { style: "display: flex; flex-wrap: wrap; gap: 10px;",
            KpiCard { label: "💸 Investimento", value: format_money(kpis.spend) }
            KpiCard {
                label: "💰 Receita Ads",
                value: format_money(kpis.revenue),
                delta: format!("ROAS {:.2}x", kpis.roas),
            }
            KpiCard {
                label: "🎯 ACOS",
                value: format_pct(kpis.acos_pct, 1),
                delta: "meta 25%".to_string(),
            }
            KpiCard { label: "🛒 Vendas por Ads", value: format_count(kpis.ad_sales) }
        }
        div { style: "display: flex; flex-wrap: wrap; gap: 10px; margin-top: 10px;",
            KpiCard { label: "👆 Cliques", value: format_count(kpis.clicks) }
            KpiCard { label: "👀 Impressões", value: format_count(kpis.impressions) }
            KpiCard { label: "📈 CTR", value: format_pct(kpis.ctr_pct, 2) }
        }
        div { style: "display: flex; flex-wrap: wrap; gap: 16px; margin-top: 12px;",
            CampaignTable { title: "🏆 Top 10 por Receita", campaigns: view.top_by_revenue.clone() }
            CampaignTable { title: "⚡ Top 10 por ROAS", campaigns: view.top_by_roas.clone() }
        }
    }
}

#[component]
fn ConsolidatedPanel(view: ConsolidatedView) -> Element {
    rsx! {
        div { style: "display: flex; flex-wrap: wrap; gap: 10px;",
            KpiCard { label: "💰 Receita Total", value: format_money(view.sales_revenue) }
            KpiCard {
                label: "💳 Investimento Ads",
                value: format_money(view.ads_spend),
                delta: format!("{} da receita", format_pct(view.spend_share_pct, 1)),
            }
            KpiCard {
                label: "📈 Lucro Real",
                value: format_money(view.real_profit),
                delta: format!("{} margem", format_pct(view.real_margin_pct, 1)),
            }
            KpiCard {
                label: "🎯 ROI Ads",
                value: format_pct(view.roi_pct, 1),
                delta: format!("{} gerados", format_money_whole(view.ads_revenue)),
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let context = use_context::<LaunchContext>();
    let state = AppState::new(context.service.clone());
    let AppState {
        mut service,
        mut dataset,
        mut tab,
        mut channel,
        mut period,
        mut custom_from,
        mut custom_to,
        mut daily_metric,
        mut busy,
        mut status,
    } = state;
    let config = context.config.clone();

    use_effect(move || {
        let current = service();
        *busy.write() = true;
        match run_blocking(|| current.dataset()) {
            Ok(loaded) => {
                for warning in &loaded.warnings {
                    warn!(%warning, "dataset warning");
                }
                if !loaded.has_ads() {
                    tab.set(ViewTab::Sales);
                }
                *status.write() = format!(
                    "{} pedidos carregados de {}",
                    loaded.orders.len(),
                    current.describe_source()
                );
                dataset.set(Some(loaded));
            }
            Err(err) => {
                dataset.set(None);
                *status.write() = format!("❌ Erro ao carregar dados: {err}");
            }
        }
        *busy.write() = false;
    });

    let handle_pick_folder = move |_: MouseEvent| {
        let Some(dir) = FileDialog::new()
            .set_title("Pasta com as planilhas")
            .pick_folder()
        else {
            return;
        };
        *busy.write() = true;
        *status.write() = format!("Carregando {}", dir.display());
        let mut next_config = config.clone();
        next_config.source.data_dir = Some(dir.clone());
        let result = run_blocking(|| -> anyhow::Result<DashboardService> {
            if next_config.source.kind == SourceKind::Sqlite {
                let imported =
                    ImportService::new(next_config.db_path()?).import_directory(&dir)?;
                info!(datasets = imported.len(), dir = %dir.display(), "imported folder");
            }
            build_service(&next_config)
        });
        match result {
            Ok(next) => service.set(Arc::new(next)),
            Err(err) => {
                *status.write() = format!("Falha ao trocar de pasta: {err}");
                show_error("Pasta de dados", &err);
            }
        }
        *busy.write() = false;
    };

    let handle_reload = move |_: MouseEvent| {
        *busy.write() = true;
        let current = service.peek().clone();
        match run_blocking(|| current.refresh()) {
            Ok(loaded) => {
                *status.write() = format!("{} pedidos recarregados", loaded.orders.len());
                dataset.set(Some(loaded));
            }
            Err(err) => {
                *status.write() = format!("❌ Erro ao recarregar: {err}");
            }
        }
        *busy.write() = false;
    };

    let handle_export = move |_: MouseEvent| {
        let Some(current) = dataset() else {
            *status.write() = "Nada para exportar".to_string();
            return;
        };
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("vendas_unificadas.csv")
            .save_file()
        else {
            return;
        };
        let selection = state.selection();
        let range = selection.range(&current, Local::now().date_naive());
        let orders: Vec<UnifiedOrder> = filter_orders(&current.orders, range, selection.channel)
            .into_iter()
            .cloned()
            .collect();
        *busy.write() = true;
        match run_blocking(|| export_orders_csv(&path, &orders)) {
            Ok(count) => {
                *status.write() = format!("{count} pedidos exportados para {}", path.display());
            }
            Err(err) => {
                *status.write() = format!("Falha ao exportar: {err}");
                show_error("Exportar CSV", &err);
            }
        }
        *busy.write() = false;
    };

    let Some(current) = dataset() else {
        let message = status();
        return rsx! {
            div { style: "display: flex; height: 100vh; font-family: sans-serif;",
                div { style: SIDEBAR_STYLE,
                    h3 { "🎯 Filtros" }
                    button { style: BUTTON_STYLE, disabled: busy(), onclick: handle_pick_folder, "📁 Escolher pasta" }
                    button { style: BUTTON_STYLE, disabled: busy(), onclick: handle_reload, "🔄 Recarregar" }
                }
                div { style: "flex: 1; padding: 24px;",
                    h2 { "📊 Dashboard de Vendas" }
                    p { "{message}" }
                }
            }
        };
    };

    let today = Local::now().date_naive();
    let selection = state.selection();
    let range = selection.range(&current, today);
    let span = current.date_span();
    let tabs = ViewTab::available(current.has_ads());
    let active_tab = if tabs.contains(&tab()) { tab() } else { ViewTab::Sales };
    let channel_labels = channel_options(&current.channels());
    let selected_channel = channel().label();
    let period_now = period();
    let from_value = iso_date(custom_from().or(span.map(|s| s.start)));
    let to_value = iso_date(custom_to().or(span.map(|s| s.end)));
    let min_value = iso_date(span.map(|s| s.start));
    let max_value = iso_date(span.map(|s| s.end));
    let header_period = format!(
        "📅 {} a {}",
        format_date_br(range.start),
        format_date_br(range.end)
    );
    let updated = current.loaded_at.format("%H:%M").to_string();
    let message = status();
    let campaigns: &[Campaign] = current.campaigns.as_deref().unwrap_or_default();

    rsx! {
        div { style: "display: flex; height: 100vh; font-family: sans-serif;",
            div { style: SIDEBAR_STYLE,
                h3 { "🎯 Filtros" }

                if tabs.len() > 1 {
                    div {
                        {tabs.iter().copied().map(|candidate| {
                            let text = candidate.label();
                            rsx!(
                                label { style: "display: flex; gap: 6px; padding: 2px 0; cursor: pointer;",
                                    input {
                                        r#type: "radio",
                                        name: "view-tab",
                                        checked: candidate == active_tab,
                                        onclick: move |_| tab.set(candidate),
                                    }
                                    span { "{text}" }
                                }
                            )
                        })}
                    }
                }

                if active_tab.uses_channel_filter() {
                    label { "📊 Canal" }
                    select {
                        onchange: move |event| {
                            if let Some(next) = ChannelFilter::from_label(&event.value()) {
                                channel.set(next);
                            }
                        },
                        {channel_labels.iter().map(|name| {
                            let is_selected = name.as_str() == selected_channel;
                            rsx!(option { value: "{name}", selected: is_selected, "{name}" })
                        })}
                    }

                    label { "📅 Período" }
                    select {
                        onchange: move |event| {
                            if let Some(next) = Period::from_key(&event.value()) {
                                period.set(next);
                            }
                        },
                        {Period::ALL.into_iter().map(|candidate| {
                            let key = candidate.key();
                            let text = candidate.label();
                            rsx!(option { value: "{key}", selected: candidate == period_now, "{text}" })
                        })}
                    }

                    if period_now == Period::Custom {
                        div { style: "display: flex; gap: 6px;",
                            input {
                                r#type: "date",
                                value: "{from_value}",
                                min: "{min_value}",
                                max: "{max_value}",
                                onchange: move |event| custom_from.set(parse_day(&event.value())),
                            }
                            input {
                                r#type: "date",
                                value: "{to_value}",
                                min: "{min_value}",
                                max: "{max_value}",
                                onchange: move |event| custom_to.set(parse_day(&event.value())),
                            }
                        }
                    }
                }

                button { style: BUTTON_STYLE, disabled: busy(), onclick: handle_pick_folder, "📁 Escolher pasta" }
                button { style: BUTTON_STYLE, disabled: busy(), onclick: handle_reload, "🔄 Recarregar" }
                button { style: BUTTON_STYLE, disabled: busy(), onclick: handle_export, "💾 Exportar CSV" }
                div { style: "margin-top: auto; color: #666; font-size: 12px;", "{message}" }
            }

            div { style: "flex: 1; padding: 16px 24px; overflow: auto; background: #fafbfd;",
                div { style: "display: flex; gap: 16px; align-items: baseline;",
                    h2 { "📊 Dashboard de Vendas" }
                    span { "{header_period}" }
                    if active_tab.uses_channel_filter() && channel() != ChannelFilter::All {
                        span { "📊 Canal: {selected_channel}" }
                    }
                    span { style: "color: #888;", "🔄 Atualizado: {updated}" }
                }

                {match active_tab {
                    ViewTab::Sales => rsx! {
                        SalesPanel {
                            view: sales_view(&current, selection, today),
                            metric: daily_metric(),
                            on_metric: move |next| daily_metric.set(next),
                        }
                    },
                    ViewTab::Ads => rsx! {
                        AdsPanel { view: ads_view(campaigns) }
                    },
                    ViewTab::Consolidated => rsx! {
                        ConsolidatedPanel { view: consolidated_view(&current, selection, today) }
                    },
                }}
            }
        }
    }
}
