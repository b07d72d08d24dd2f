#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use notifier::backends::{BackendDescriptor, BackendRegistry, Context, DeliveryBackend, TransportError};
use notifier::store::MemoryStore;
use notifier::NotifierService;
use notifier_core::config::NotifierConfig;
use notifier_models::{Notification, User};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn prefs(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

/// Scripted outcome for a test delivery backend
pub enum Outcome {
    Deliver,
    ReportFailure,
    Error,
}

/// Delivery double that counts sends and returns a scripted outcome
pub struct ScriptedBackend {
    descriptor: BackendDescriptor,
    outcome: Outcome,
    sends: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(name: &'static str, display_name: &'static str, outcome: Outcome) -> Self {
        Self {
            descriptor: BackendDescriptor {
                name,
                display_name,
                description: "Test delivery",
            },
            outcome,
            sends: AtomicUsize::new(0),
        }
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryBackend for ScriptedBackend {
    fn descriptor(&self) -> BackendDescriptor {
        self.descriptor
    }

    async fn send(
        &self,
        _user: &User,
        _notification: &Notification,
        _context: Option<&Context>,
    ) -> Result<bool, TransportError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Deliver => Ok(true),
            Outcome::ReportFailure => Ok(false),
            Outcome::Error => Err(TransportError::SendFailed("scripted failure".to_string())),
        }
    }
}

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub service: NotifierService,
}

/// Service wired to the in-memory store and the console email/sms backends
pub async fn console_env() -> TestEnv {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    let mut config = NotifierConfig::default();
    config.backends.push("sms".to_string());
    let registry = Arc::new(BackendRegistry::from_config(&config).unwrap());

    let service = NotifierService::new(store.clone(), registry);
    service.initialize().await.unwrap();

    TestEnv { store, service }
}

/// Service wired to the given test doubles
pub async fn scripted_env(backends: Vec<Arc<ScriptedBackend>>) -> TestEnv {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    let mut registry = BackendRegistry::new();
    for backend in backends {
        registry.register(backend);
    }

    let service = NotifierService::new(store.clone(), Arc::new(registry));
    service.initialize().await.unwrap();

    TestEnv { store, service }
}
