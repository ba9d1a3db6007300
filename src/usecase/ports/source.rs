use std::fmt;

use crate::domain::entities::table::RawTable;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{kind} not found: expected {expected}")]
    MissingFile { kind: TableKind, expected: String },
    #[error("{kind} is missing required column `{column}`")]
    MissingColumn { kind: TableKind, column: String },
    #[error("no {kind} dataset has been imported")]
    MissingDataset { kind: TableKind },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    MarketplaceOrders,
    ResellerOrders,
    CostReference,
    Campaigns,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::MarketplaceOrders,
        TableKind::ResellerOrders,
        TableKind::CostReference,
        TableKind::Campaigns,
    ];

    /// Dataset name used by the relational store.
    pub fn dataset_name(self) -> &'static str {
        match self {
            TableKind::MarketplaceOrders => "vendas_mercado_livre",
            TableKind::ResellerOrders => "vendas_braavo",
            TableKind::CostReference => "estoque_omie",
            TableKind::Campaigns => "campanhas_ads",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            TableKind::MarketplaceOrders | TableKind::ResellerOrders
        )
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TableKind::MarketplaceOrders => "Mercado Livre sales sheet",
            TableKind::ResellerOrders => "Braavo sales sheet",
            TableKind::CostReference => "Omie cost sheet",
            TableKind::Campaigns => "Mercado Ads campaign report",
        };
        f.write_str(label)
    }
}

/// Raw tables behind the dashboard. Optional tables return `Ok(None)` when
/// the source simply does not have them.
pub trait SalesSource: Send + Sync {
    fn describe(&self) -> String;

    fn marketplace_orders(&self) -> Result<RawTable, SourceError>;
    fn reseller_orders(&self) -> Result<RawTable, SourceError>;
    fn cost_reference(&self) -> Result<Option<RawTable>, SourceError>;
    fn campaigns(&self) -> Result<Option<RawTable>, SourceError>;
}
