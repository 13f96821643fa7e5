use std::path::PathBuf;

use kd_core::calculations::{
    AreaRatioCalculator, AreaRatioInput, Calculator, CostBandCalculator, UnitMixCalculator,
};
use kd_core::models::FormType;
use kd_core::session::ToolSession;
use kd_core::session::mappers::area_ratio_to_unit_mix;
use kd_core::store::{CalculatorStore, KeyValueStore};
use kd_store_sqlite::SqliteStore;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

async fn memory_store() -> CalculatorStore<SqliteStore> {
    let store = SqliteStore::connect(":memory:")
        .await
        .expect("Failed to open in-memory database");
    store.run_migrations().await.expect("Failed to run migrations");
    CalculatorStore::new(store)
}

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("kd-{}-{}.db", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn emsal_input() -> AreaRatioInput {
    AreaRatioInput {
        land_area: dec!(1000),
        floor_area_ratio: Some(dec!(2)),
        base_coverage_ratio: Some(dec!(0.4)),
        floor_height: Some(dec!(3)),
        ..Default::default()
    }
}

#[tokio::test]
async fn inputs_survive_reopening_the_database() {
    let path = temp_db("reopen");
    let url = path.to_string_lossy().to_string();

    {
        let store = SqliteStore::connect(&url).await.unwrap();
        store.run_migrations().await.unwrap();
        CalculatorStore::new(store)
            .save_inputs::<AreaRatioCalculator>(&emsal_input())
            .await;
    }

    let store = SqliteStore::connect(&url).await.unwrap();
    store.run_migrations().await.unwrap();
    let loaded = CalculatorStore::new(store)
        .load_inputs::<AreaRatioCalculator>()
        .await;

    assert_eq!(loaded, Some(emsal_input()));
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn result_hands_off_to_next_tool() {
    let store = memory_store().await;

    let mut emsal = ToolSession::open(AreaRatioCalculator, &store).await;
    emsal.replace(emsal_input()).await;
    emsal.compute().await.expect("valid input");

    let mut daire = ToolSession::open(UnitMixCalculator, &store).await;
    let applied = daire
        .load_from::<AreaRatioCalculator, _>(area_ratio_to_unit_mix)
        .await;

    assert!(applied);
    assert_eq!(daire.inputs().total_buildable_area, dec!(2000));

    let saved = store.load_inputs::<UnitMixCalculator>().await.unwrap();
    assert_eq!(saved.total_buildable_area, dec!(2000));
}

#[tokio::test]
async fn clear_removes_one_tool_only() {
    let store = memory_store().await;
    store.save_inputs::<AreaRatioCalculator>(&emsal_input()).await;
    store
        .save_inputs::<CostBandCalculator>(&CostBandCalculator::default().initial_input())
        .await;

    store.clear(FormType::AreaRatio).await;

    assert_eq!(store.load_inputs::<AreaRatioCalculator>().await, None);
    assert!(store.load_inputs::<CostBandCalculator>().await.is_some());
}

#[tokio::test]
async fn clear_all_leaves_foreign_keys() {
    let store = memory_store().await;
    store.save_inputs::<AreaRatioCalculator>(&emsal_input()).await;
    store.backend().set("theme", "dark").await.unwrap();

    store.clear_all().await;

    assert_eq!(store.load_inputs::<AreaRatioCalculator>().await, None);
    assert_eq!(
        store.backend().get("theme").await.unwrap().as_deref(),
        Some("dark")
    );
}
