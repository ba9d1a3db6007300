use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use clap::Parser;
use rusqlite::Connection;

use crate::config::{AppConfig, PipelineSettings, SourceKind};
use crate::domain::entities::filter::{ChannelFilter, Period};
use crate::domain::entities::order::{Channel, CostSource, EXPORT_COLUMNS};
use crate::infra::import::csv::export_orders_csv;
use crate::infra::import::spreadsheet::{find_latest, sheet_spec, SpreadsheetSource};
use crate::domain::entities::table::{Cell, RawTable};
use crate::infra::sqlite::queries::{list_datasets, replace_dataset};
use crate::infra::sqlite::repo::SqliteSource;
use crate::infra::sqlite::schema::init_db;
use crate::ui::terminal::{render_ads, render_consolidated, render_sales};
use crate::usecase::ports::source::{SalesSource, SourceError, TableKind};
use crate::usecase::services::dashboard::DashboardService;
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::pipeline::load_dataset;
use crate::usecase::services::report::{
    ads_view, channel_options, consolidated_view, sales_view, Selection,
};
use crate::{apply_overrides, build_service, Cli};

const MARKETPLACE_CSV: &str = "\
Relatório de vendas
Data da venda,Estado,N.º de venda,SKU,Título do anúncio,Unidades,Preço unitário de venda do anúncio (BRL),Receita por produtos (BRL),Tarifa de venda e impostos (BRL),Estado,Cidade
2 de maio de 2024 14:30 hs.,Entregue,ML-1,ABC,Camisa Ciclismo,2,100,200,-30,SP,São Paulo
3 de maio de 2024 09:00 hs.,Cancelada,ML-2,ABC,Camisa Ciclismo,1,100,100,-15,SP,Campinas
3 de maio de 2024 10:15 hs.,Venda entregue,ML-3,ZZZ,Jersey Pro,1,150,150,-20,RJ,Niterói
";

const RESELLER_CSV: &str = "\
Data Compra,Pedido,SKU,Produto,Quantidade,Preço Venda Un,Total Venda 1,Referência,Preço Custo Un
2024-05-02 11:00:00,P-1,,Bermuda Gel,1,300,300,REF-9,
04/05/2024 16:20,P-2,,Meia Sport,3,20,60,,8
not-a-date,P-3,,Luva,1,50,50,,
";

const COST_CSV: &str = "\
Código do Produto,Soma de CMC Unitário
ABC,40
REF-9,120
";

const CAMPAIGNS_CSV: &str = "\
Relatório de campanha - Maio
Nome,Investimento (Moeda local),Receita (Moeda local),Impressões,Cliques,ROAS (Receitas / Investimento),Vendas por publicidade (Diretas + Indiretas)
Campanha A,100,500,10000,200,5,10
Campanha B,50,100,5000,50,2,3
Campanha C,0,0,100,0,0,0
";

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("salesdash-{prefix}-{nanos}"))
}

fn write_fixtures(dir: &Path, with_ads: bool) {
    fs::create_dir_all(dir).expect("should create temp dir");
    fs::write(dir.join("Vendas_BR_Mercado_Libre_2024-05.csv"), MARKETPLACE_CSV)
        .expect("should write marketplace fixture");
    fs::write(dir.join("Planilha-2024-05.csv"), RESELLER_CSV)
        .expect("should write reseller fixture");
    fs::write(dir.join("estoque_omie.csv"), COST_CSV).expect("should write cost fixture");
    if with_ads {
        fs::write(dir.join("Relatorio_campanhas_2024-05.csv"), CAMPAIGNS_CSV)
            .expect("should write campaigns fixture");
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn spreadsheet_source_loads_unified_orders() {
    let temp_dir = unique_test_dir("spreadsheet-load");
    write_fixtures(&temp_dir, true);

    let source = SpreadsheetSource::new(&temp_dir);
    let dataset = load_dataset(&source, &PipelineSettings::default(), true)
        .expect("dataset should load");

    let ids: Vec<&str> = dataset.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["ML-1", "ML-3", "P-1", "P-2"]);
    assert_eq!(dataset.warnings.len(), 1, "unreadable reseller date should warn");

    let ml1 = &dataset.orders[0];
    assert_eq!(ml1.channel, Channel::MercadoLivre);
    assert_eq!(ml1.state, "SP");
    assert_eq!(ml1.cost_source, CostSource::Sku);
    assert_close(ml1.marketplace_fee, 30.0);
    assert_close(ml1.net_profit, 90.0);
    assert_close(ml1.margin_pct, 45.0);

    let ml3 = &dataset.orders[1];
    assert_eq!(ml3.cost_source, CostSource::Category);
    assert_close(ml3.unit_cost, 32.51);

    let p1 = &dataset.orders[2];
    assert_eq!(p1.channel, Channel::Braavo);
    assert_eq!(p1.sku, "N/A");
    assert_eq!(p1.cost_source, CostSource::Reference);
    assert_close(p1.gateway_fee, 12.0);
    assert_close(p1.net_profit, 168.0);

    let p2 = &dataset.orders[3];
    assert_eq!(p2.cost_source, CostSource::SheetCost);
    assert_eq!(p2.day(), day(2024, 5, 4));
    assert_close(p2.net_profit, 33.6);

    assert_eq!(dataset.cost_tally.count(CostSource::Default), 0);
    assert_eq!(
        dataset.date_span().map(|span| (span.start, span.end)),
        Some((day(2024, 5, 2), day(2024, 5, 4)))
    );
    let campaigns = dataset.campaigns.as_ref().expect("campaigns should load");
    assert_eq!(campaigns.len(), 3);
    assert_eq!(campaigns[0].name, "Campanha A");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn missing_reseller_sheet_is_reported_with_expected_pattern() {
    let temp_dir = unique_test_dir("missing-reseller");
    write_fixtures(&temp_dir, false);
    fs::remove_file(temp_dir.join("Planilha-2024-05.csv")).expect("should remove fixture");

    let source = SpreadsheetSource::new(&temp_dir);
    let err = load_dataset(&source, &PipelineSettings::default(), true)
        .expect_err("load should fail without the reseller sheet");

    match err {
        SourceError::MissingFile { kind, expected } => {
            assert_eq!(kind, TableKind::ResellerOrders);
            assert!(expected.contains("Planilha-"));
        }
        other => panic!("unexpected error: {other}"),
    }

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn missing_required_column_names_the_column() {
    let temp_dir = unique_test_dir("missing-column");
    write_fixtures(&temp_dir, false);
    fs::write(
        temp_dir.join("Planilha-2024-05.csv"),
        "Data Compra,Pedido,Produto\n2024-05-02,P-1,Meia\n",
    )
    .expect("should overwrite reseller fixture");

    let err = load_dataset(
        &SpreadsheetSource::new(&temp_dir),
        &PipelineSettings::default(),
        false,
    )
    .expect_err("load should fail on a short header");

    assert!(matches!(
        err,
        SourceError::MissingColumn { kind: TableKind::ResellerOrders, ref column } if column == "SKU"
    ));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn ads_are_optional_and_can_be_disabled() {
    let temp_dir = unique_test_dir("no-ads");
    write_fixtures(&temp_dir, false);

    let source = SpreadsheetSource::new(&temp_dir);
    let without_file = load_dataset(&source, &PipelineSettings::default(), true)
        .expect("dataset should load without campaigns");
    assert!(!without_file.has_ads());

    write_fixtures(&temp_dir, true);
    let disabled = load_dataset(&source, &PipelineSettings::default(), false)
        .expect("dataset should load with ads disabled");
    assert!(disabled.campaigns.is_none());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn unreadable_campaign_report_is_ignored_with_warning() {
    let temp_dir = unique_test_dir("broken-ads");
    write_fixtures(&temp_dir, false);
    fs::write(
        temp_dir.join("Relatorio_campanhas_2024-06.xlsx"),
        b"not a zip archive",
    )
    .expect("should write broken campaigns file");

    let dataset = load_dataset(
        &SpreadsheetSource::new(&temp_dir),
        &PipelineSettings::default(),
        true,
    )
    .expect("sales should load despite the broken campaign report");

    assert!(dataset.campaigns.is_none());
    assert!(!dataset.has_ads());
    assert_eq!(dataset.orders.len(), 4);
    let ads_warnings: Vec<&String> = dataset
        .warnings
        .iter()
        .filter(|w| w.starts_with("Mercado Ads ignored"))
        .collect();
    assert_eq!(ads_warnings.len(), 1, "warnings: {:?}", dataset.warnings);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn find_latest_prefers_newest_name_and_skips_lock_files() {
    let temp_dir = unique_test_dir("find-latest");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    for name in [
        "Planilha-2024-04.csv",
        "Planilha-2024-05.xlsx",
        "~$Planilha-2024-06.xlsx",
        "Planilha-2024-07.txt",
    ] {
        fs::write(temp_dir.join(name), "x").expect("should write file");
    }

    let found = find_latest(&temp_dir, sheet_spec(TableKind::ResellerOrders).pattern)
        .expect("listing should succeed");

    assert_eq!(found, Some(temp_dir.join("Planilha-2024-05.xlsx")));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sales_view_follows_period_and_channel() {
    let temp_dir = unique_test_dir("sales-view");
    write_fixtures(&temp_dir, true);
    let dataset = load_dataset(
        &SpreadsheetSource::new(&temp_dir),
        &PipelineSettings::default(),
        true,
    )
    .expect("dataset should load");
    let today = day(2024, 5, 4);

    let everything = sales_view(&dataset, Selection::default(), today);
    assert_eq!(everything.kpis.orders, 4);
    assert_close(everything.kpis.revenue, 710.0);
    assert_close(everything.kpis.profit, 389.09);
    assert_close(everything.kpis.units, 7.0);
    let channels: Vec<Channel> = everything.channels.iter().map(|c| c.channel).collect();
    assert_eq!(channels, vec![Channel::Braavo, Channel::MercadoLivre]);
    assert_close(everything.channels[0].margin_pct, 56.0);
    assert_eq!(everything.top_by_revenue[0].product, "Bermuda Gel");
    assert_eq!(everything.daily.len(), 4);

    let custom = Selection {
        custom_from: Some(day(2024, 5, 3)),
        ..Selection::default()
    };
    let from_third = sales_view(&dataset, custom, today);
    assert_close(from_third.kpis.revenue, 210.0);

    let only_today = Selection {
        period: Period::Today,
        ..Selection::default()
    };
    assert_eq!(sales_view(&dataset, only_today, today).kpis.orders, 1);

    let marketplace_only = Selection {
        channel: ChannelFilter::Only(Channel::MercadoLivre),
        ..Selection::default()
    };
    assert_close(
        sales_view(&dataset, marketplace_only, today).kpis.revenue,
        350.0,
    );

    assert_eq!(
        channel_options(&dataset.channels()),
        vec!["Todos", "Braavo", "Mercado Livre"]
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn ads_and_consolidated_views_use_whole_campaign_export() {
    let temp_dir = unique_test_dir("ads-view");
    write_fixtures(&temp_dir, true);
    let dataset = load_dataset(
        &SpreadsheetSource::new(&temp_dir),
        &PipelineSettings::default(),
        true,
    )
    .expect("dataset should load");
    let campaigns = dataset.campaigns.clone().expect("campaigns should load");

    let ads = ads_view(&campaigns);
    assert_close(ads.kpis.spend, 150.0);
    assert_close(ads.kpis.roas, 4.0);
    assert_close(ads.kpis.acos_pct, 25.0);
    let by_roas: Vec<&str> = ads.top_by_roas.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(by_roas, vec!["Campanha A", "Campanha B"]);

    let today = day(2024, 5, 4);
    let only_today = Selection {
        period: Period::Today,
        ..Selection::default()
    };
    let view = consolidated_view(&dataset, only_today, today);
    assert_close(view.sales_revenue, 60.0);
    assert_close(view.ads_spend, 150.0);
    assert_close(view.real_profit, 33.6 - 150.0);
    assert_close(view.roi_pct, 300.0);

    let rendered = render_consolidated(&view);
    assert!(rendered.contains("R$ 150.00"));
    assert!(render_ads(&ads).contains("Campanha A"));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn terminal_sales_report_lists_channels_and_products() {
    let temp_dir = unique_test_dir("terminal-report");
    write_fixtures(&temp_dir, false);
    let dataset = load_dataset(
        &SpreadsheetSource::new(&temp_dir),
        &PipelineSettings::default(),
        false,
    )
    .expect("dataset should load");

    let rendered = render_sales(&sales_view(&dataset, Selection::default(), day(2024, 5, 4)));

    assert!(rendered.contains("Período: 02/05/2024 a 04/05/2024"));
    assert!(rendered.contains("R$ 710.00"));
    assert!(rendered.contains("Mercado Livre"));
    assert!(rendered.contains("Jersey Pro"));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("app.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('dataset','column_name','cell')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 3, "required tables should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn init_db_adds_kind_to_older_cell_tables() {
    let temp_dir = unique_test_dir("init-db-upgrade");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("app.sqlite");
    Connection::open(&db_path)
        .expect("should open sqlite db")
        .execute_batch(
            "CREATE TABLE cell (
                dataset_id INTEGER NOT NULL,
                row_idx    INTEGER NOT NULL,
                col_idx    INTEGER NOT NULL,
                value      TEXT NOT NULL,
                PRIMARY KEY (dataset_id, row_idx, col_idx)
            );
            INSERT INTO cell VALUES (1, 0, 0, 'ABC');",
        )
        .expect("should create legacy cell table");

    init_db(&db_path).expect("init_db should upgrade the cell table");
    init_db(&db_path).expect("init_db should be repeatable");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let kind: String = conn
        .query_row("SELECT kind FROM cell WHERE value = 'ABC'", [], |row| row.get(0))
        .expect("kind column should exist");
    assert_eq!(kind, "text");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_source_matches_spreadsheet_source_after_import() {
    let temp_dir = unique_test_dir("sqlite-import");
    let data_dir = temp_dir.join("exports");
    write_fixtures(&data_dir, true);
    let db_path = temp_dir.join("sales.sqlite");

    let imported = ImportService::new(db_path.clone())
        .import_directory(&data_dir)
        .expect("import should succeed");
    let names: Vec<&str> = imported.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["vendas_mercado_livre", "vendas_braavo", "estoque_omie", "campanhas_ads"]
    );
    assert_eq!(imported[0].row_count, 3);

    let settings = PipelineSettings::default();
    let from_sheets = load_dataset(&SpreadsheetSource::new(&data_dir), &settings, true)
        .expect("spreadsheet dataset should load");
    let from_db = load_dataset(&SqliteSource::new(&db_path), &settings, true)
        .expect("sqlite dataset should load");

    assert_eq!(from_db.orders, from_sheets.orders);
    assert_eq!(from_db.campaigns, from_sheets.campaigns);
    assert_eq!(from_db.cost_tally, from_sheets.cost_tally);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_source_keeps_typed_cells() {
    let temp_dir = unique_test_dir("sqlite-typed");
    let data_dir = temp_dir.join("exports");
    write_fixtures(&data_dir, false);
    let db_path = temp_dir.join("sales.sqlite");
    ImportService::new(db_path.clone())
        .import_directory(&data_dir)
        .expect("import should succeed");

    let reseller = RawTable::new(
        RESELLER_CSV
            .lines()
            .next()
            .expect("fixture header")
            .split(',')
            .map(str::to_string)
            .collect(),
        vec![vec![
            Cell::Number(45323.5),
            Cell::Text("P-9".into()),
            Cell::Empty,
            Cell::Text("Bermuda Gel".into()),
            Cell::Number(1.0),
            Cell::Number(300.0),
            Cell::Number(300.0),
            Cell::Text("REF-9".into()),
            Cell::Empty,
        ]],
    );
    let costs = RawTable::new(
        vec!["Código do Produto".into(), "Soma de CMC Unitário".into()],
        vec![
            vec![Cell::Text("ABC".into()), Cell::Number(32.5123456789)],
            vec![Cell::Text("REF-9".into()), Cell::Number(120.0)],
        ],
    );
    replace_dataset(&db_path, TableKind::ResellerOrders.dataset_name(), "typed", &reseller)
        .expect("reseller dataset should be replaced");
    replace_dataset(&db_path, TableKind::CostReference.dataset_name(), "typed", &costs)
        .expect("cost dataset should be replaced");

    let source = SqliteSource::new(&db_path);
    assert_eq!(
        source.reseller_orders().expect("reseller table should load"),
        reseller
    );

    let dataset = load_dataset(&source, &PipelineSettings::default(), false)
        .expect("sqlite dataset should load");
    let ids: Vec<&str> = dataset.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["ML-1", "ML-3", "P-9"]);
    assert!(dataset.warnings.is_empty(), "warnings: {:?}", dataset.warnings);

    let p9 = &dataset.orders[2];
    assert_eq!(
        p9.sold_at,
        day(2024, 2, 1).and_hms_opt(12, 0, 0).expect("valid time")
    );
    assert_eq!(p9.cost_source, CostSource::Reference);
    assert_eq!(dataset.orders[0].unit_cost, 32.5123456789);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn reimport_replaces_datasets_of_the_same_name() {
    let temp_dir = unique_test_dir("sqlite-reimport");
    let data_dir = temp_dir.join("exports");
    write_fixtures(&data_dir, false);
    let db_path = temp_dir.join("sales.sqlite");
    let service = ImportService::new(db_path.clone());

    service.import_directory(&data_dir).expect("first import should succeed");
    service.import_directory(&data_dir).expect("second import should succeed");

    let datasets = service.datasets().expect("should list datasets");
    assert_eq!(datasets.len(), 3, "campaigns were never imported");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let column_sets: i64 = conn
        .query_row(
            "SELECT COUNT(DISTINCT dataset_id) FROM column_name",
            [],
            |row| row.get(0),
        )
        .expect("column count query should succeed");
    assert_eq!(column_sets, 3, "replaced datasets should leave no columns behind");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn replaced_dataset_leaves_no_cells_behind() {
    let temp_dir = unique_test_dir("replace-dataset");
    let data_dir = temp_dir.join("exports");
    write_fixtures(&data_dir, false);
    let db_path = temp_dir.join("sales.sqlite");
    ImportService::new(db_path.clone())
        .import_directory(&data_dir)
        .expect("import should succeed");

    let datasets = list_datasets(&db_path).expect("should list datasets");
    let reseller = datasets
        .iter()
        .find(|d| d.name == "vendas_braavo")
        .expect("reseller dataset should exist");
    let replaced = replace_dataset(&db_path, "vendas_braavo", "empty", &RawTable::default())
        .expect("replace should succeed");
    assert_ne!(replaced.dataset_id, reseller.id);

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM cell WHERE dataset_id = ?1",
            [reseller.id.0],
            |row| row.get(0),
        )
        .expect("cell count query should succeed");
    assert_eq!(remaining, 0);

    let err = load_dataset(&SqliteSource::new(&db_path), &PipelineSettings::default(), false)
        .expect_err("load should fail on a reseller dataset without columns");
    assert!(matches!(
        err,
        SourceError::MissingColumn {
            kind: TableKind::ResellerOrders,
            ..
        }
    ));

    conn.execute("DELETE FROM dataset WHERE name = 'vendas_braavo'", [])
        .expect("should drop reseller dataset row");
    let err = load_dataset(&SqliteSource::new(&db_path), &PipelineSettings::default(), false)
        .expect_err("load should fail without the reseller dataset");
    assert!(matches!(
        err,
        SourceError::MissingDataset {
            kind: TableKind::ResellerOrders
        }
    ));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn export_writes_header_and_one_row_per_order() {
    let temp_dir = unique_test_dir("export");
    write_fixtures(&temp_dir, false);
    let dataset = load_dataset(
        &SpreadsheetSource::new(&temp_dir),
        &PipelineSettings::default(),
        false,
    )
    .expect("dataset should load");
    let out_path = temp_dir.join("out").join("vendas_unificadas.csv");

    let written = export_orders_csv(&out_path, &dataset.orders).expect("export should succeed");
    assert_eq!(written, 4);

    let mut reader = csv::Reader::from_path(&out_path).expect("should open exported csv");
    let headers = reader.headers().expect("should read header").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), EXPORT_COLUMNS.to_vec());
    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("should read rows");
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[0][0], "Mercado Livre");
    assert_eq!(&rows[0][1], "ML-1");
    assert_eq!(&rows[0][22], "Thursday");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn dashboard_service_caches_until_refresh() {
    let temp_dir = unique_test_dir("dashboard-cache");
    write_fixtures(&temp_dir, false);
    let source: Arc<dyn SalesSource> = Arc::new(SpreadsheetSource::new(&temp_dir));
    let service = DashboardService::new(
        source,
        PipelineSettings::default(),
        true,
        Duration::from_secs(3600),
    );

    let first = service.dataset().expect("first load should succeed");
    let second = service.dataset().expect("cached load should succeed");
    assert!(Arc::ptr_eq(&first, &second), "second call should hit the cache");

    let refreshed = service.refresh().expect("refresh should succeed");
    assert!(!Arc::ptr_eq(&first, &refreshed), "refresh should reload");

    let uncached = DashboardService::new(
        Arc::new(SpreadsheetSource::new(&temp_dir)),
        PipelineSettings::default(),
        true,
        Duration::ZERO,
    );
    let a = uncached.dataset().expect("load should succeed");
    let b = uncached.dataset().expect("load should succeed");
    assert!(!Arc::ptr_eq(&a, &b), "zero ttl should never cache");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn cli_flags_override_config() {
    let cli = Cli::try_parse_from([
        "salesdash",
        "--source",
        "sqlite",
        "--db",
        "/tmp/sales.sqlite",
        "--no-ads",
        "report",
        "--period",
        "last7",
        "--channel",
        "braavo",
    ])
    .expect("arguments should parse");

    let mut config = AppConfig::default();
    apply_overrides(&mut config, &cli);

    assert_eq!(config.source.kind, SourceKind::Sqlite);
    assert_eq!(
        config.db_path().expect("db path should resolve"),
        PathBuf::from("/tmp/sales.sqlite")
    );
    assert!(!config.ads.enabled);
    assert!(Cli::try_parse_from(["salesdash", "report", "--period", "forever"]).is_err());
}

#[test]
fn build_service_uses_configured_data_dir() {
    let temp_dir = unique_test_dir("build-service");
    write_fixtures(&temp_dir, false);
    let mut config = AppConfig::default();
    config.source.data_dir = Some(temp_dir.clone());

    let service = build_service(&config).expect("service should build");
    assert!(service.describe_source().contains("spreadsheets"));
    assert_eq!(
        service.dataset().expect("dataset should load").orders.len(),
        4
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
