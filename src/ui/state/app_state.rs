use std::sync::Arc;

use chrono::NaiveDate;
use dioxus::prelude::*;

use crate::domain::entities::filter::{ChannelFilter, Period, ViewTab};
use crate::usecase::services::dashboard::DashboardService;
use crate::usecase::services::pipeline::SalesDataset;
use crate::usecase::services::report::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DailyMetric {
    #[default]
    Revenue,
    Profit,
    Units,
}

impl DailyMetric {
    pub const ALL: [DailyMetric; 3] = [DailyMetric::Revenue, DailyMetric::Profit, DailyMetric::Units];

    pub fn label(self) -> &'static str {
        match self {
            DailyMetric::Revenue => "Receita",
            DailyMetric::Profit => "Lucro",
            DailyMetric::Units => "Unidades",
        }
    }
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub service: Signal<Arc<DashboardService>>,
    pub dataset: Signal<Option<Arc<SalesDataset>>>,
    pub tab: Signal<ViewTab>,
    pub channel: Signal<ChannelFilter>,
    pub period: Signal<Period>,
    pub custom_from: Signal<Option<NaiveDate>>,
    pub custom_to: Signal<Option<NaiveDate>>,
    pub daily_metric: Signal<DailyMetric>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(service: Arc<DashboardService>) -> Self {
        Self {
            service: use_signal(move || service),
            dataset: use_signal(|| None::<Arc<SalesDataset>>),
            tab: use_signal(ViewTab::default),
            channel: use_signal(ChannelFilter::default),
            period: use_signal(|| Period::Custom),
            custom_from: use_signal(|| None::<NaiveDate>),
            custom_to: use_signal(|| None::<NaiveDate>),
            daily_metric: use_signal(DailyMetric::default),
            busy: use_signal(|| false),
            status: use_signal(|| "Pronto".to_string()),
        }
    }

    pub fn selection(&self) -> Selection {
        Selection {
            period: *self.period.read(),
            channel: *self.channel.read(),
            custom_from: *self.custom_from.read(),
            custom_to: *self.custom_to.read(),
        }
    }
}
