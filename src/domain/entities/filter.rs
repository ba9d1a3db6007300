use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::entities::order::Channel;

pub const ALL_CHANNELS_LABEL: &str = "Todos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Custom,
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    CurrentMonth,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Custom,
        Period::Today,
        Period::Yesterday,
        Period::Last7Days,
        Period::Last30Days,
        Period::CurrentMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Period::Custom => "Personalizado",
            Period::Today => "Hoje",
            Period::Yesterday => "Ontem",
            Period::Last7Days => "Últimos 7 dias",
            Period::Last30Days => "Últimos 30 dias",
            Period::CurrentMonth => "Mês atual",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Period::Custom => "custom",
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::Last7Days => "last7",
            Period::Last30Days => "last30",
            Period::CurrentMonth => "month",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|period| period.key() == key)
    }

    /// Resolves the period against `today`. `Custom` takes the requested
    /// bounds clamped into the span covered by the data.
    pub fn resolve(
        self,
        today: NaiveDate,
        data_span: Option<DateRange>,
        custom_from: Option<NaiveDate>,
        custom_to: Option<NaiveDate>,
    ) -> DateRange {
        match self {
            Period::Today => DateRange::new(today, today),
            Period::Yesterday => {
                let day = today - Duration::days(1);
                DateRange::new(day, day)
            }
            Period::Last7Days => DateRange::new(today - Duration::days(7), today),
            Period::Last30Days => DateRange::new(today - Duration::days(30), today),
            Period::CurrentMonth => {
                let first = today.with_day(1).unwrap_or(today);
                DateRange::new(first, today)
            }
            Period::Custom => {
                let span = data_span.unwrap_or(DateRange::new(today, today));
                let from = span.clamp(custom_from.unwrap_or(span.start));
                let to = span.clamp(custom_to.unwrap_or(span.end));
                DateRange::new(from, to)
            }
        }
    }
}

/// Inclusive calendar-day range. `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn clamp(&self, day: NaiveDate) -> NaiveDate {
        if day < self.start {
            self.start
        } else if day > self.end {
            self.end
        } else {
            day
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelFilter {
    #[default]
    All,
    Only(Channel),
}

impl ChannelFilter {
    pub fn label(self) -> &'static str {
        match self {
            ChannelFilter::All => ALL_CHANNELS_LABEL,
            ChannelFilter::Only(channel) => channel.label(),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label.trim().eq_ignore_ascii_case(ALL_CHANNELS_LABEL) {
            return Some(ChannelFilter::All);
        }
        Channel::from_label(label).map(ChannelFilter::Only)
    }

    pub fn matches(self, channel: Channel) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Only(wanted) => wanted == channel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    #[default]
    Sales,
    Ads,
    Consolidated,
}

impl ViewTab {
    pub fn label(self) -> &'static str {
        match self {
            ViewTab::Sales => "💰 Vendas",
            ViewTab::Ads => "📣 Mercado Ads",
            ViewTab::Consolidated => "📊 Consolidado",
        }
    }

    /// Tabs offered for the current data. Ads views need a campaign export.
    pub fn available(has_ads: bool) -> Vec<ViewTab> {
        if has_ads {
            vec![ViewTab::Sales, ViewTab::Ads, ViewTab::Consolidated]
        } else {
            vec![ViewTab::Sales]
        }
    }

    pub fn uses_channel_filter(self) -> bool {
        !matches!(self, ViewTab::Ads)
    }
}
