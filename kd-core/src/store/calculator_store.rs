//! Per-tool persistence of inputs and last results.
//!
//! Persistence is a best-effort cache: write failures are logged and
//! dropped, and a missing or unreadable entry reads back as `None`. No
//! operation here ever fails a calculation.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::key_value::KeyValueStore;
use crate::calculations::{Calculator, RecordOf};
use crate::models::{CalculationRecord, FormType};

/// Key prefix every calculator entry is stored under.
pub const DEFAULT_NAMESPACE: &str = "kd_calculator_";

const RESULT_SUFFIX: &str = "_result";

pub struct CalculatorStore<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> CalculatorStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(
        backend: S,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `<namespace><formType>`, e.g. `kd_calculator_emsal`.
    pub fn input_key(
        &self,
        form_type: FormType,
    ) -> String {
        format!("{}{}", self.namespace, form_type.as_str())
    }

    /// `<namespace><formType>_result`.
    pub fn result_key(
        &self,
        form_type: FormType,
    ) -> String {
        format!("{}{}", self.input_key(form_type), RESULT_SUFFIX)
    }

    pub async fn save_inputs<C: Calculator>(
        &self,
        inputs: &C::Input,
    ) {
        self.write(self.input_key(C::FORM_TYPE), inputs).await;
    }

    pub async fn load_inputs<C: Calculator>(&self) -> Option<C::Input> {
        self.read(self.input_key(C::FORM_TYPE)).await
    }

    pub async fn save_result<O, I>(
        &self,
        record: &CalculationRecord<O, I>,
    ) where
        O: Serialize,
        I: Serialize,
    {
        self.write(self.result_key(record.form_type), record).await;
    }

    pub async fn load_result<C: Calculator>(&self) -> Option<RecordOf<C>> {
        self.read(self.result_key(C::FORM_TYPE)).await
    }

    /// Removes a tool's inputs and last result.
    pub async fn clear(
        &self,
        form_type: FormType,
    ) {
        for key in [self.input_key(form_type), self.result_key(form_type)] {
            if let Err(e) = self.backend.remove(&key).await {
                tracing::error!(key = %key, error = %e, "failed to clear calculator entry");
            }
        }
    }

    /// Removes every entry under this store's namespace.
    pub async fn clear_all(&self) {
        let keys = match self.backend.keys_with_prefix(&self.namespace).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(namespace = %self.namespace, error = %e, "failed to list calculator entries");
                return;
            }
        };

        for key in keys {
            if let Err(e) = self.backend.remove(&key).await {
                tracing::error!(key = %key, error = %e, "failed to clear calculator entry");
            }
        }
    }

    /// Pre-fills `target` from the last result of the `Src` tool.
    ///
    /// The mapper runs once, on the stored record; later changes to the
    /// source tool are not propagated. Returns whether a source record was
    /// found and applied.
    pub async fn hand_off<Src, T, F>(
        &self,
        target: &mut T,
        mapper: F,
    ) -> bool
    where
        Src: Calculator,
        F: FnOnce(&RecordOf<Src>, &mut T),
    {
        match self.load_result::<Src>().await {
            Some(record) => {
                mapper(&record, target);
                tracing::debug!(source = %Src::FORM_TYPE, "handed off calculator result");
                true
            }
            None => false,
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: String,
        value: &T,
    ) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "failed to serialise calculator entry");
                return;
            }
        };

        if let Err(e) = self.backend.set(&key, &json).await {
            tracing::error!(key = %key, error = %e, "failed to save calculator entry");
        }
    }

    async fn read<T: DeserializeOwned>(
        &self,
        key: String,
    ) -> Option<T> {
        let raw = match self.backend.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "failed to load calculator entry");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding unreadable calculator entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::{
        AreaRatioCalculator, AreaRatioInput, CostBandCalculator, CostBandInput, QualityTier,
        UnitMixCalculator,
    };
    use crate::store::{MemoryStore, StoreError};

    /// A backend where every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
        async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }
    }

    fn area_ratio_input() -> AreaRatioInput {
        AreaRatioInput {
            land_area: dec!(500),
            floor_area_ratio: Some(dec!(2)),
            base_coverage_ratio: Some(dec!(0.4)),
            ..Default::default()
        }
    }

    // =========================================================================
    // keys
    // =========================================================================

    #[test]
    fn keys_use_namespace_and_form_type() {
        let store = CalculatorStore::new(MemoryStore::new());

        assert_eq!(store.input_key(FormType::AreaRatio), "kd_calculator_emsal");
        assert_eq!(
            store.result_key(FormType::MiniFeasibility),
            "kd_calculator_muteahhit-mini_result"
        );
    }

    // =========================================================================
    // inputs and results
    // =========================================================================

    #[tokio::test]
    async fn inputs_round_trip() {
        let store = CalculatorStore::new(MemoryStore::new());
        let inputs = CostBandInput {
            total_buildable_area: dec!(1234.5),
            quality: Some(QualityTier::Premium),
            vat_included: true,
            unit_cost_override: None,
        };

        store.save_inputs::<CostBandCalculator>(&inputs).await;

        assert_eq!(store.load_inputs::<CostBandCalculator>().await, Some(inputs));
    }

    #[tokio::test]
    async fn missing_inputs_read_as_none() {
        let store = CalculatorStore::new(MemoryStore::new());

        assert_eq!(store.load_inputs::<CostBandCalculator>().await, None);
    }

    #[tokio::test]
    async fn corrupt_entry_reads_as_none() {
        let store = CalculatorStore::new(MemoryStore::new());
        store
            .backend()
            .set("kd_calculator_maliyet", "{not json")
            .await
            .unwrap();

        assert_eq!(store.load_inputs::<CostBandCalculator>().await, None);
    }

    #[tokio::test]
    async fn result_is_stored_apart_from_inputs() {
        let store = CalculatorStore::new(MemoryStore::new());
        let record = AreaRatioCalculator.calculate(&area_ratio_input());

        store.save_result(&record).await;

        assert_eq!(store.load_inputs::<AreaRatioCalculator>().await, None);
        assert_eq!(store.load_result::<AreaRatioCalculator>().await, Some(record));
    }

    #[tokio::test]
    async fn backend_failures_are_swallowed() {
        let store = CalculatorStore::new(BrokenStore);

        store.save_inputs::<AreaRatioCalculator>(&area_ratio_input()).await;
        store.clear(FormType::AreaRatio).await;
        store.clear_all().await;

        assert_eq!(store.load_inputs::<AreaRatioCalculator>().await, None);
    }

    // =========================================================================
    // clearing
    // =========================================================================

    #[tokio::test]
    async fn clear_removes_inputs_and_result() {
        let store = CalculatorStore::new(MemoryStore::new());
        let input = area_ratio_input();
        store.save_inputs::<AreaRatioCalculator>(&input).await;
        store.save_result(&AreaRatioCalculator.calculate(&input)).await;

        store.clear(FormType::AreaRatio).await;

        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn clear_all_keeps_other_namespaces() {
        let store = CalculatorStore::new(MemoryStore::new());
        store.backend().set("theme", "dark").await.unwrap();
        store.save_inputs::<AreaRatioCalculator>(&area_ratio_input()).await;
        store
            .save_inputs::<CostBandCalculator>(&CostBandInput::default())
            .await;

        store.clear_all().await;

        assert_eq!(
            store.backend().keys_with_prefix("").await.unwrap(),
            vec!["theme"]
        );
    }

    // =========================================================================
    // hand-off
    // =========================================================================

    #[tokio::test]
    async fn hand_off_applies_source_result() {
        let store = CalculatorStore::new(MemoryStore::new());
        store
            .save_result(&AreaRatioCalculator.calculate(&area_ratio_input()))
            .await;

        let mut target = CostBandInput::default();
        let applied = store
            .hand_off::<AreaRatioCalculator, _, _>(&mut target, |record, target| {
                target.total_buildable_area = record.output.total_buildable_area;
            })
            .await;

        assert!(applied);
        assert_eq!(target.total_buildable_area, dec!(1000));
    }

    #[tokio::test]
    async fn hand_off_without_source_leaves_target_untouched() {
        let store = CalculatorStore::new(MemoryStore::new());
        let mut target = CostBandInput::default();

        let applied = store
            .hand_off::<UnitMixCalculator, _, _>(&mut target, |_, target| {
                target.total_buildable_area = dec!(1);
            })
            .await;

        assert!(!applied);
        assert_eq!(target, CostBandInput::default());
    }

    #[tokio::test]
    async fn hand_off_ignores_saved_inputs() {
        let store = CalculatorStore::new(MemoryStore::new());
        store.save_inputs::<AreaRatioCalculator>(&area_ratio_input()).await;
        let mut target = CostBandInput::default();

        let applied = store
            .hand_off::<AreaRatioCalculator, _, _>(&mut target, |_, _| {})
            .await;

        assert!(!applied);
    }

    #[tokio::test]
    async fn custom_namespace_prefixes_keys() {
        let store = CalculatorStore::with_namespace(MemoryStore::new(), "test_");
        store.save_inputs::<AreaRatioCalculator>(&area_ratio_input()).await;

        assert_eq!(
            store.backend().keys_with_prefix("").await.unwrap(),
            vec!["test_emsal"]
        );
    }
}
