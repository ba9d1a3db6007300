use crate::domain::entities::table::RawTable;

pub const COL_NAME: &str = "Nome";
pub const COL_BUDGET: &str = "Orçamento";
pub const COL_IMPRESSIONS: &str = "Impressões";
pub const COL_CLICKS: &str = "Cliques";
pub const COL_CPC: &str = "CPC  (Custo por clique)";
pub const COL_CTR: &str = "CTR (Click through rate)";
pub const COL_CVR: &str = "CVR (Conversion rate)";
pub const COL_REVENUE: &str = "Receita (Moeda local)";
pub const COL_SPEND: &str = "Investimento (Moeda local)";
pub const COL_ACOS: &str = "ACOS (Investimento / Receitas)";
pub const COL_ROAS: &str = "ROAS (Receitas / Investimento)";
pub const COL_AD_SALES: &str = "Vendas por publicidade (Diretas + Indiretas)";
pub const COL_DIRECT_SALES: &str = "Vendas diretas";
pub const COL_INDIRECT_SALES: &str = "Vendas indiretas";
pub const COL_DIRECT_REVENUE: &str = "Receita por ventas diretas (Moeda local)";
pub const COL_INDIRECT_REVENUE: &str = "Receita por vendas indiretas (Moeda local)";
pub const COL_UNITS: &str = "Unidades vendidas por publicidade";

/// One row of the campaign report. Numeric fields default to 0 when the
/// export leaves them blank or unparseable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Campaign {
    pub name: String,
    pub budget: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub cvr: f64,
    pub revenue: f64,
    pub spend: f64,
    pub acos: f64,
    pub roas: f64,
    pub ad_sales: f64,
    pub direct_sales: f64,
    pub indirect_sales: f64,
    pub direct_revenue: f64,
    pub indirect_revenue: f64,
    pub units_sold: f64,
}

impl Campaign {
    pub fn from_table(table: &RawTable) -> Vec<Campaign> {
        table
            .records()
            .map(|record| {
                let num = |column: &str| record.get(column).f64_or(0.0);
                Campaign {
                    name: record.get(COL_NAME).text_or(""),
                    budget: num(COL_BUDGET),
                    impressions: num(COL_IMPRESSIONS),
                    clicks: num(COL_CLICKS),
                    cpc: num(COL_CPC),
                    ctr: num(COL_CTR),
                    cvr: num(COL_CVR),
                    revenue: num(COL_REVENUE),
                    spend: num(COL_SPEND),
                    acos: num(COL_ACOS),
                    roas: num(COL_ROAS),
                    ad_sales: num(COL_AD_SALES),
                    direct_sales: num(COL_DIRECT_SALES),
                    indirect_sales: num(COL_INDIRECT_SALES),
                    direct_revenue: num(COL_DIRECT_REVENUE),
                    indirect_revenue: num(COL_INDIRECT_REVENUE),
                    units_sold: num(COL_UNITS),
                }
            })
            .collect()
    }
}
