use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::dates::weekday_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    MercadoLivre,
    Braavo,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::MercadoLivre, Channel::Braavo];

    pub fn label(self) -> &'static str {
        match self {
            Channel::MercadoLivre => "Mercado Livre",
            Channel::Braavo => "Braavo",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|channel| channel.label().eq_ignore_ascii_case(wanted))
    }

    pub fn color(self) -> &'static str {
        match self {
            Channel::MercadoLivre => "#FFE600",
            Channel::Braavo => "#00A650",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl PartialOrd for Channel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Channel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.label().cmp(other.label())
    }
}

/// Which tier of the cost lookup answered for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CostSource {
    Reference,
    Sku,
    SheetCost,
    Category,
    Default,
}

impl CostSource {
    pub fn label(self) -> &'static str {
        match self {
            CostSource::Reference => "reference",
            CostSource::Sku => "sku",
            CostSource::SheetCost => "sheet",
            CostSource::Category => "category",
            CostSource::Default => "default",
        }
    }
}

/// A channel row after column mapping, before costing.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub channel: Channel,
    pub order_id: String,
    pub sold_at: NaiveDateTime,
    pub sku: Option<String>,
    pub reference: Option<String>,
    pub sheet_unit_cost: Option<f64>,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub gmv: f64,
    pub marketplace_fee: f64,
    pub gateway_fee: f64,
    pub shipping: f64,
    pub tax: f64,
    pub opex: f64,
    pub state: String,
    pub city: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedOrder {
    pub channel: Channel,
    pub order_id: String,
    pub sold_at: NaiveDateTime,
    pub sku: String,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub gmv: f64,
    pub unit_cost: f64,
    pub cost_source: CostSource,
    pub total_cost: f64,
    pub marketplace_fee: f64,
    pub gateway_fee: f64,
    pub shipping: f64,
    pub tax: f64,
    pub opex: f64,
    pub net_profit: f64,
    pub margin_pct: f64,
    pub state: String,
    pub city: String,
    pub status: String,
}

impl UnifiedOrder {
    pub fn day(&self) -> NaiveDate {
        self.sold_at.date()
    }

    pub fn month(&self) -> String {
        self.sold_at.format("%Y-%m").to_string()
    }

    pub fn weekday(&self) -> &'static str {
        weekday_name(self.sold_at.date())
    }

    pub fn total_fee(&self) -> f64 {
        self.marketplace_fee + self.gateway_fee
    }
}

pub const EXPORT_COLUMNS: [&str; 24] = [
    "canal",
    "id_pedido",
    "data_venda",
    "sku",
    "produto",
    "qtd",
    "preco_unitario",
    "gmv",
    "cmc_unitario",
    "cmc_total",
    "taxa_ml",
    "taxa_gateway",
    "frete",
    "imposto",
    "opex",
    "lucro_liquido",
    "margem_pct",
    "uf",
    "cidade",
    "status",
    "mes",
    "dia",
    "dia_nome",
    "taxa_total",
];
