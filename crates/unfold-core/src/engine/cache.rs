use super::builder::EnergyModel;
use super::config::ModelKey;
use super::error::EngineError;
use crate::core::models::molecule::MoleculeFingerprint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Whether a cache request built a model or returned an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Built,
    Reused,
}

type Slot = Arc<Mutex<Option<Arc<EnergyModel>>>>;
type SlotKey = (MoleculeFingerprint, ModelKey);

/// Built energy models, keyed by the molecule they describe and their parameters.
///
/// One cache can serve several molecules; a model is only reused for the
/// molecule it was built from. Each key owns its own lock, so concurrent requests for the same key build
/// the model at most once while requests for other keys proceed in parallel.
/// A failed build leaves its key empty and a later request retries it.
#[derive(Debug, Default)]
pub struct ModelCache {
    slots: Mutex<HashMap<SlotKey, Slot>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking builder cannot leave a half-written model behind: the slot
    // is only assigned after a successful build.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the model of `molecule` for `key`, running `build` only if it is
    /// not cached yet.
    pub fn get_or_build<F>(
        &self,
        molecule: MoleculeFingerprint,
        key: ModelKey,
        build: F,
    ) -> Result<(Arc<EnergyModel>, CacheStatus), EngineError>
    where
        F: FnOnce() -> Result<EnergyModel, EngineError>,
    {
        let slot = Arc::clone(lock(&self.slots).entry((molecule, key)).or_default());

        let mut entry = lock(&slot);
        if let Some(model) = entry.as_ref() {
            info!(%molecule, key = %key, "Model already built; reusing it.");
            return Ok((Arc::clone(model), CacheStatus::Reused));
        }

        debug!(%molecule, key = %key, "Building model.");
        let model = Arc::new(build()?);
        *entry = Some(Arc::clone(&model));
        Ok((model, CacheStatus::Built))
    }

    pub fn get(&self, molecule: MoleculeFingerprint, key: ModelKey) -> Option<Arc<EnergyModel>> {
        let slot = lock(&self.slots).get(&(molecule, key)).cloned()?;
        let entry = lock(&slot);
        entry.clone()
    }

    /// Number of successfully built models.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All built models, ordered by molecule and then by key.
    pub fn models(&self) -> Vec<Arc<EnergyModel>> {
        let mut slots: Vec<(SlotKey, Slot)> = lock(&self.slots)
            .iter()
            .map(|(key, slot)| (*key, Arc::clone(slot)))
            .collect();
        slots.sort_by_key(|(key, _)| *key);
        slots
            .iter()
            .filter_map(|(_, slot)| lock(slot).clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::tests::molecule_from_bonds;
    use crate::engine::builder::EnergyModelBuilder;
    use crate::engine::config::ModelParams;
    use crate::engine::context::BuildContext;
    use crate::engine::progress::ProgressReporter;
    use crate::engine::rotation::tests::folded_butane;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn second_request_reuses_the_model() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);
        let builder = EnergyModelBuilder::new(&context);
        let params = ModelParams::new(1, 4, 300.0, 200.0);
        let cache = ModelCache::new();
        let id = molecule.fingerprint();

        let (first, status) = cache.get_or_build(id, params.key(), || builder.build(params)).unwrap();
        assert_eq!(status, CacheStatus::Built);
        let (second, status) = cache
            .get_or_build(id, params.key(), || panic!("must not rebuild"))
            .unwrap();
        assert_eq!(status, CacheStatus::Reused);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_requests_build_at_most_once() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);
        let builder = EnergyModelBuilder::new(&context);
        let params = ModelParams::new(1, 8, 300.0, 200.0);
        let cache = ModelCache::new();
        let builds = AtomicUsize::new(0);
        let id = molecule.fingerprint();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_build(id, params.key(), || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            builder.build(params)
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_build_leaves_the_key_unbuilt() {
        let cache = ModelCache::new();
        let id = folded_butane().fingerprint();
        let key = ModelParams::new(1, 4, 300.0, 200.0).key();

        let result = cache.get_or_build(id, key, || Err(EngineError::Internal("boom".into())));
        assert!(result.is_err());
        assert!(cache.get(id, key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn models_are_listed_by_key() {
        let molecule = folded_butane();
        let reporter = ProgressReporter::new();
        let context = BuildContext::new(&molecule, 1, &reporter);
        let builder = EnergyModelBuilder::new(&context);
        let cache = ModelCache::new();

        for d in [8, 2, 4] {
            let params = ModelParams::new(1, d, 300.0, 200.0);
            cache
                .get_or_build(molecule.fingerprint(), params.key(), || builder.build(params))
                .unwrap();
        }

        let steps: Vec<usize> = cache.models().iter().map(|m| m.params.d).collect();
        assert_eq!(steps, vec![2, 4, 8]);
    }

    #[test]
    fn models_of_different_molecules_are_kept_apart() {
        let butane = folded_butane();
        let hexane = molecule_from_bonds(6, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
        let reporter = ProgressReporter::new();
        let params = ModelParams::new(1, 4, 300.0, 200.0);
        let cache = ModelCache::new();

        let butane_context = BuildContext::new(&butane, 1, &reporter);
        let (first, _) = cache
            .get_or_build(butane.fingerprint(), params.key(), || {
                EnergyModelBuilder::new(&butane_context).build(params)
            })
            .unwrap();

        let hexane_context = BuildContext::new(&hexane, 1, &reporter);
        let (second, status) = cache
            .get_or_build(hexane.fingerprint(), params.key(), || {
                EnergyModelBuilder::new(&hexane_context).build(params)
            })
            .unwrap();

        assert_eq!(status, CacheStatus::Built);
        assert_eq!(first.mapping.bond_names(), ["2_3".to_string()]);
        assert_eq!(second.mapping.bond_names(), ["3_4".to_string()]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(butane.fingerprint(), params.key()).is_some());
    }
}
