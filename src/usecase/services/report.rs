use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::entities::ads::Campaign;
use crate::domain::entities::filter::{ChannelFilter, DateRange, Period, ALL_CHANNELS_LABEL};
use crate::domain::entities::order::{Channel, UnifiedOrder};
use crate::usecase::services::pipeline::SalesDataset;

pub const TOP_N: usize = 10;

fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn channel_options(channels: &[Channel]) -> Vec<String> {
    let mut sorted = channels.to_vec();
    sorted.sort();
    sorted.dedup();
    std::iter::once(ALL_CHANNELS_LABEL.to_string())
        .chain(sorted.into_iter().map(|channel| channel.label().to_string()))
        .collect()
}

pub fn filter_orders<'a>(
    orders: &'a [UnifiedOrder],
    range: DateRange,
    channel: ChannelFilter,
) -> Vec<&'a UnifiedOrder> {
    orders
        .iter()
        .filter(|order| range.contains(order.day()) && channel.matches(order.channel))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesKpis {
    pub revenue: f64,
    pub profit: f64,
    pub mean_margin_pct: f64,
    pub fees: f64,
    pub fee_share_pct: f64,
    pub mean_ticket: f64,
    pub orders: usize,
    pub units: f64,
}

pub fn sales_kpis(orders: &[&UnifiedOrder]) -> SalesKpis {
    if orders.is_empty() {
        return SalesKpis::default();
    }
    let count = orders.len() as f64;
    let revenue: f64 = orders.iter().map(|o| o.gmv).sum();
    let fees: f64 = orders.iter().map(|o| o.total_fee()).sum();
    SalesKpis {
        revenue,
        profit: orders.iter().map(|o| o.net_profit).sum(),
        mean_margin_pct: orders.iter().map(|o| o.margin_pct).sum::<f64>() / count,
        fees,
        fee_share_pct: ratio_pct(fees, revenue),
        mean_ticket: revenue / count,
        orders: orders.len(),
        units: orders.iter().map(|o| o.quantity).sum(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub revenue: f64,
    pub profit: f64,
    pub fees: f64,
    pub units: f64,
    pub orders: usize,
    pub margin_pct: f64,
    pub ticket: f64,
}

pub fn channel_breakdown(orders: &[&UnifiedOrder]) -> Vec<ChannelSummary> {
    let mut grouped: BTreeMap<Channel, ChannelSummary> = BTreeMap::new();
    for order in orders {
        let entry = grouped
            .entry(order.channel)
            .or_insert_with(|| ChannelSummary {
                channel: order.channel,
                revenue: 0.0,
                profit: 0.0,
                fees: 0.0,
                units: 0.0,
                orders: 0,
                margin_pct: 0.0,
                ticket: 0.0,
            });
        entry.revenue += order.gmv;
        entry.profit += order.net_profit;
        entry.fees += order.total_fee();
        entry.units += order.quantity;
        entry.orders += 1;
    }

    grouped
        .into_values()
        .map(|mut summary| {
            summary.margin_pct = round_to(ratio_pct(summary.profit, summary.revenue), 1);
            summary.ticket = round_to(summary.revenue / summary.orders as f64, 2);
            summary
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub day: NaiveDate,
    pub channel: Channel,
    pub revenue: f64,
    pub profit: f64,
    pub units: f64,
}

/// One point per (day, channel), in calendar order.
pub fn daily_series(orders: &[&UnifiedOrder]) -> Vec<DailyPoint> {
    let mut grouped: BTreeMap<(NaiveDate, Channel), DailyPoint> = BTreeMap::new();
    for order in orders {
        let day = order.day();
        let point = grouped
            .entry((day, order.channel))
            .or_insert_with(|| DailyPoint {
                day,
                channel: order.channel,
                revenue: 0.0,
                profit: 0.0,
                units: 0.0,
            });
        point.revenue += order.gmv;
        point.profit += order.net_profit;
        point.units += order.quantity;
    }
    grouped.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Revenue,
    Profit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotals {
    pub product: String,
    pub revenue: f64,
    pub profit: f64,
    pub units: f64,
}

impl ProductTotals {
    pub fn metric(&self, rank: RankBy) -> f64 {
        match rank {
            RankBy::Revenue => self.revenue,
            RankBy::Profit => self.profit,
        }
    }
}

pub fn top_products(orders: &[&UnifiedOrder], rank: RankBy, limit: usize) -> Vec<ProductTotals> {
    let mut grouped: BTreeMap<&str, ProductTotals> = BTreeMap::new();
    for order in orders {
        let totals = grouped
            .entry(order.product.as_str())
            .or_insert_with(|| ProductTotals {
                product: order.product.clone(),
                revenue: 0.0,
                profit: 0.0,
                units: 0.0,
            });
        totals.revenue += order.gmv;
        totals.profit += order.net_profit;
        totals.units += order.quantity;
    }

    let mut ranked: Vec<ProductTotals> = grouped.into_values().collect();
    ranked.sort_by(|a, b| b.metric(rank).total_cmp(&a.metric(rank)));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdsKpis {
    pub spend: f64,
    pub revenue: f64,
    pub roas: f64,
    pub acos_pct: f64,
    pub ad_sales: f64,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr_pct: f64,
}

pub fn ads_kpis(campaigns: &[Campaign]) -> AdsKpis {
    let spend: f64 = campaigns.iter().map(|c| c.spend).sum();
    let revenue: f64 = campaigns.iter().map(|c| c.revenue).sum();
    let clicks: f64 = campaigns.iter().map(|c| c.clicks).sum();
    let impressions: f64 = campaigns.iter().map(|c| c.impressions).sum();
    AdsKpis {
        spend,
        revenue,
        roas: if spend > 0.0 { revenue / spend } else { 0.0 },
        acos_pct: if revenue > 0.0 { spend / revenue * 100.0 } else { 0.0 },
        ad_sales: campaigns.iter().map(|c| c.ad_sales).sum(),
        clicks,
        impressions,
        ctr_pct: if impressions > 0.0 {
            clicks / impressions * 100.0
        } else {
            0.0
        },
    }
}

fn largest_by<F>(campaigns: impl Iterator<Item = Campaign>, key: F, limit: usize) -> Vec<Campaign>
where
    F: Fn(&Campaign) -> f64,
{
    let mut ranked: Vec<Campaign> = campaigns.collect();
    // stable sort keeps export order among ties
    ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
    ranked.truncate(limit);
    ranked
}

pub fn top_campaigns_by_revenue(campaigns: &[Campaign], limit: usize) -> Vec<Campaign> {
    largest_by(campaigns.iter().cloned(), |c| c.revenue, limit)
}

pub fn top_campaigns_by_roas(campaigns: &[Campaign], limit: usize) -> Vec<Campaign> {
    largest_by(
        campaigns.iter().filter(|c| c.spend > 0.0).cloned(),
        |c| c.roas,
        limit,
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedView {
    pub sales_revenue: f64,
    pub sales_profit: f64,
    pub ads_spend: f64,
    pub ads_revenue: f64,
    pub real_profit: f64,
    pub roi_pct: f64,
    pub spend_share_pct: f64,
    pub real_margin_pct: f64,
}

/// Sales side is the filtered selection; the ads side covers the whole export.
pub fn consolidated(orders: &[&UnifiedOrder], campaigns: &[Campaign]) -> ConsolidatedView {
    let sales_revenue: f64 = orders.iter().map(|o| o.gmv).sum();
    let sales_profit: f64 = orders.iter().map(|o| o.net_profit).sum();
    let ads = ads_kpis(campaigns);
    let real_profit = sales_profit - ads.spend;
    ConsolidatedView {
        sales_revenue,
        sales_profit,
        ads_spend: ads.spend,
        ads_revenue: ads.revenue,
        real_profit,
        roi_pct: if ads.spend > 0.0 {
            (ads.revenue - ads.spend) / ads.spend * 100.0
        } else {
            0.0
        },
        spend_share_pct: ratio_pct(ads.spend, sales_revenue),
        real_margin_pct: ratio_pct(real_profit, sales_revenue),
    }
}

/// Filter state shared by the desktop window and the terminal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub period: Period,
    pub channel: ChannelFilter,
    pub custom_from: Option<NaiveDate>,
    pub custom_to: Option<NaiveDate>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            period: Period::Custom,
            channel: ChannelFilter::All,
            custom_from: None,
            custom_to: None,
        }
    }
}

impl Selection {
    pub fn range(&self, dataset: &SalesDataset, today: NaiveDate) -> DateRange {
        self.period
            .resolve(today, dataset.date_span(), self.custom_from, self.custom_to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesView {
    pub range: DateRange,
    pub channel: ChannelFilter,
    pub kpis: SalesKpis,
    pub channels: Vec<ChannelSummary>,
    pub daily: Vec<DailyPoint>,
    pub top_by_revenue: Vec<ProductTotals>,
    pub top_by_profit: Vec<ProductTotals>,
}

pub fn sales_view(dataset: &SalesDataset, selection: Selection, today: NaiveDate) -> SalesView {
    let range = selection.range(dataset, today);
    let orders = filter_orders(&dataset.orders, range, selection.channel);
    SalesView {
        range,
        channel: selection.channel,
        kpis: sales_kpis(&orders),
        channels: channel_breakdown(&orders),
        daily: daily_series(&orders),
        top_by_revenue: top_products(&orders, RankBy::Revenue, TOP_N),
        top_by_profit: top_products(&orders, RankBy::Profit, TOP_N),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdsView {
    pub kpis: AdsKpis,
    pub top_by_revenue: Vec<Campaign>,
    pub top_by_roas: Vec<Campaign>,
}

pub fn ads_view(campaigns: &[Campaign]) -> AdsView {
    AdsView {
        kpis: ads_kpis(campaigns),
        top_by_revenue: top_campaigns_by_revenue(campaigns, TOP_N),
        top_by_roas: top_campaigns_by_roas(campaigns, TOP_N),
    }
}

pub fn consolidated_view(
    dataset: &SalesDataset,
    selection: Selection,
    today: NaiveDate,
) -> ConsolidatedView {
    let range = selection.range(dataset, today);
    let orders = filter_orders(&dataset.orders, range, selection.channel);
    consolidated(&orders, dataset.campaigns.as_deref().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(name: &str, spend: f64, revenue: f64, roas: f64) -> Campaign {
        Campaign {
            name: name.to_string(),
            spend,
            revenue,
            roas,
            ..Campaign::default()
        }
    }

    #[test]
    fn empty_selection_yields_zero_kpis() {
        assert_eq!(sales_kpis(&[]), SalesKpis::default());
        assert!(channel_breakdown(&[]).is_empty());
        assert!(top_products(&[], RankBy::Profit, TOP_N).is_empty());
    }

    #[test]
    fn ads_ratios_are_zero_without_denominators() {
        let kpis = ads_kpis(&[campaign("idle", 0.0, 0.0, 0.0)]);
        assert_eq!(kpis.roas, 0.0);
        assert_eq!(kpis.acos_pct, 0.0);
        assert_eq!(kpis.ctr_pct, 0.0);
    }

    #[test]
    fn roas_ranking_ignores_unfunded_campaigns() {
        let campaigns = vec![
            campaign("free", 0.0, 90.0, 99.0),
            campaign("low", 10.0, 20.0, 2.0),
            campaign("high", 10.0, 80.0, 8.0),
        ];
        let names: Vec<String> = top_campaigns_by_roas(&campaigns, TOP_N)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["high", "low"]);

        let by_revenue = top_campaigns_by_revenue(&campaigns, 1);
        assert_eq!(by_revenue[0].name, "free");
    }

    #[test]
    fn consolidated_without_spend_has_no_roi() {
        let view = consolidated(&[], &[]);
        assert_eq!(view.roi_pct, 0.0);
        assert_eq!(view.spend_share_pct, 0.0);
        assert_eq!(view.real_margin_pct, 0.0);
    }

    #[test]
    fn channel_options_start_with_all() {
        let options = channel_options(&[Channel::MercadoLivre, Channel::Braavo, Channel::Braavo]);
        assert_eq!(options, vec!["Todos", "Braavo", "Mercado Livre"]);
    }
}
