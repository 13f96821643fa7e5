//! One open calculator form.
//!
//! A [`ToolSession`] owns the current inputs of one tool. It is seeded from
//! the store when opened, writes every change back while autosave is on, and
//! persists each successful result so that later tools can hand it off.

pub mod mappers;

use crate::calculations::{Calculator, RecordOf};
use crate::store::{CalculatorStore, KeyValueStore};

pub struct ToolSession<'s, C: Calculator, S> {
    calculator: C,
    store: &'s CalculatorStore<S>,
    inputs: C::Input,
    autosave: bool,
}

impl<'s, C, S> ToolSession<'s, C, S>
where
    C: Calculator,
    S: KeyValueStore,
{
    /// Opens the tool with its saved inputs, or its initial inputs when
    /// nothing usable is stored.
    pub async fn open(
        calculator: C,
        store: &'s CalculatorStore<S>,
    ) -> Self {
        let inputs = match store.load_inputs::<C>().await {
            Some(saved) => saved,
            None => calculator.initial_input(),
        };

        let session = Self {
            calculator,
            store,
            inputs,
            autosave: true,
        };
        session.persist().await;
        session
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn inputs(&self) -> &C::Input {
        &self.inputs
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(
        &mut self,
        autosave: bool,
    ) {
        self.autosave = autosave;
    }

    /// Applies `change` to the inputs.
    pub async fn update<F>(
        &mut self,
        change: F,
    ) where
        F: FnOnce(&mut C::Input),
    {
        change(&mut self.inputs);
        self.persist().await;
    }

    /// Replaces the inputs wholesale.
    pub async fn replace(
        &mut self,
        inputs: C::Input,
    ) {
        self.inputs = inputs;
        self.persist().await;
    }

    /// Returns to the tool's initial inputs.
    pub async fn reset(&mut self) {
        self.inputs = self.calculator.initial_input();
        self.persist().await;
    }

    /// Pre-fills the inputs from the last result of the `Src` tool.
    ///
    /// Returns whether a source result was found.
    pub async fn load_from<Src, F>(
        &mut self,
        mapper: F,
    ) -> bool
    where
        Src: Calculator,
        F: FnOnce(&RecordOf<Src>, &mut C::Input),
    {
        let applied = self.store.hand_off::<Src, _, _>(&mut self.inputs, mapper).await;
        if applied {
            self.persist().await;
        }
        applied
    }

    pub fn validate(&self) -> Vec<C::Error> {
        self.calculator.validate(&self.inputs)
    }

    /// Validates and calculates the current inputs, storing the result on
    /// success.
    pub async fn compute(&self) -> Result<RecordOf<C>, Vec<C::Error>> {
        let record = self.calculator.evaluate(&self.inputs)?;
        self.store.save_result(&record).await;
        Ok(record)
    }

    /// One-line summary of a result produced by this tool.
    pub fn summary(
        &self,
        record: &RecordOf<C>,
    ) -> String {
        self.calculator.summary(&record.output)
    }

    async fn persist(&self) {
        if self.autosave {
            self.store.save_inputs::<C>(&self.inputs).await;
        }
    }
}
