use crate::auth::repo::{MemoryUsers, UserRepo};
use crate::config::AppConfig;
use crate::predict::model::Predictor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub predictor: Arc<Predictor>,
}

impl AppState {
    /// Reads config from the environment and loads the model. Fails if either
    /// artifact cannot be loaded; the server must not start without it.
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let predictor = Predictor::load(
            &config.model.vectorizer_path,
            &config.model.classifier_path,
        )?;

        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(MemoryUsers::new()) as Arc<dyn UserRepo>,
            Arc::new(predictor),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        predictor: Arc<Predictor>,
    ) -> Self {
        Self {
            config,
            users,
            predictor,
        }
    }

    /// Fresh empty user store and the small in-code model.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_users(Arc::new(MemoryUsers::new()))
    }

    #[cfg(test)]
    pub fn fake_with_users(users: Arc<dyn UserRepo>) -> Self {
        let config = AppConfig::from_lookup(|_| None).expect("default config");
        Self::from_parts(
            Arc::new(config),
            users,
            Arc::new(crate::predict::model::fixtures::sample_predictor()),
        )
    }
}
