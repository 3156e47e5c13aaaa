use std::sync::{PoisonError, RwLock};

use crate::domain::errors::DomainError;
use crate::domain::ports::SettingsRepository;
use crate::domain::settings::StoreSettings;

#[derive(Default)]
struct Cache {
    settings: Option<StoreSettings>,
    /// Bumped on every invalidation. A load started under an older
    /// generation must not be stored.
    generation: u64,
}

/// Store settings read through an in-process cache that is dropped on every
/// update.
pub struct SettingsService<S> {
    repo: S,
    cache: RwLock<Cache>,
}

impl<S: SettingsRepository> SettingsService<S> {
    pub fn new(repo: S) -> Self {
        Self {
            repo,
            cache: RwLock::new(Cache::default()),
        }
    }

    pub fn current(&self) -> Result<StoreSettings, DomainError> {
        let generation = {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(settings) = &cache.settings {
                return Ok(settings.clone());
            }
            cache.generation
        };
        let settings = StoreSettings::from_pairs(&self.repo.load()?);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.generation == generation {
            cache.settings = Some(settings.clone());
        }
        Ok(settings)
    }

    pub fn update(&self, settings: StoreSettings) -> Result<StoreSettings, DomainError> {
        settings.validate()?;
        self.repo.save(&settings.to_pairs())?;
        self.invalidate();
        log::info!("Store settings updated");
        Ok(settings)
    }

    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.settings = None;
        cache.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;

    use super::*;
    use crate::application::fakes::FakeSettings;

    #[test]
    fn settings_are_loaded_once_until_updated() {
        let fake = FakeSettings::default();
        let service = SettingsService::new(fake.clone());

        assert_eq!(service.current().expect("load"), StoreSettings::default());
        service.current().expect("cached");
        assert_eq!(*fake.loads.lock().expect("lock"), 1);

        let updated = StoreSettings {
            store_name: "Nakshi Ghor".to_string(),
            bkash_enabled: true,
            ..StoreSettings::default()
        };
        service.update(updated.clone()).expect("saved");
        assert_eq!(service.current().expect("reload"), updated);
        assert_eq!(*fake.loads.lock().expect("lock"), 2);
    }

    /// Returns whatever was stored when `load` began, but only after the
    /// test lets it finish.
    #[derive(Clone)]
    struct GatedSettings {
        inner: FakeSettings,
        started: Arc<Mutex<Option<mpsc::Sender<()>>>>,
        release: Arc<Mutex<Option<mpsc::Receiver<()>>>>,
    }

    impl SettingsRepository for GatedSettings {
        fn load(&self) -> Result<HashMap<String, String>, DomainError> {
            let snapshot = self.inner.load()?;
            let started = self.started.lock().expect("lock").take();
            let release = self.release.lock().expect("lock").take();
            if let (Some(started), Some(release)) = (started, release) {
                started.send(()).expect("signal");
                release.recv().expect("release");
            }
            Ok(snapshot)
        }

        fn save(&self, pairs: &[(&'static str, String)]) -> Result<(), DomainError> {
            self.inner.save(pairs)
        }
    }

    #[test]
    fn a_load_racing_an_update_does_not_cache_stale_settings() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let repo = GatedSettings {
            inner: FakeSettings::default(),
            started: Arc::new(Mutex::new(Some(started_tx))),
            release: Arc::new(Mutex::new(Some(release_rx))),
        };
        let service = Arc::new(SettingsService::new(repo));

        let reader = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.current().expect("load"))
        };
        started_rx.recv().expect("reader started loading");

        let updated = StoreSettings {
            store_name: "Nakshi Ghor".to_string(),
            nagad_enabled: true,
            ..StoreSettings::default()
        };
        service.update(updated.clone()).expect("saved");
        release_tx.send(()).expect("release reader");

        let stale = reader.join().expect("reader thread");
        assert_eq!(stale, StoreSettings::default());
        assert_eq!(service.current().expect("reload"), updated);
    }

    #[test]
    fn invalid_settings_are_not_saved() {
        let fake = FakeSettings::default();
        let service = SettingsService::new(fake.clone());
        let err = service
            .update(StoreSettings {
                store_name: " ".to_string(),
                ..StoreSettings::default()
            })
            .expect_err("rejected");
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(fake.pairs.lock().expect("lock").is_empty());
    }
}
