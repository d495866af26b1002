//! Pre-trained risk classifiers behind a stable interface, plus the load-once slot
//! the risk engine reads them through.

mod linear;
mod onnx;

pub use linear::LinearRiskModel;
pub use onnx::OnnxRiskModel;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::error::{LoadError, ModelError};

/// Where a loaded model came from; attached to every score for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub backend: String,
    pub location: String,
    pub sha256: String,
}

/// A loaded binary classifier. Read-only after load.
pub trait RiskModel: Send + Sync {
    fn info(&self) -> &ModelInfo;

    /// Input column names, in order, the model was trained on.
    fn expected_features(&self) -> &[String];

    /// Probability of the positive (severe pain) class.
    fn predict_proba(&self, input: &[f32]) -> Result<f64, ModelError>;
}

/// Produces a model on demand. Called at most once per [`LazyModel`].
pub trait ModelProvider: Send + Sync {
    fn load(&self) -> Result<Arc<dyn RiskModel>, LoadError>;
}

impl<F> ModelProvider for F
where
    F: Fn() -> Result<Arc<dyn RiskModel>, LoadError> + Send + Sync,
{
    fn load(&self) -> Result<Arc<dyn RiskModel>, LoadError> {
        self()
    }
}

/// Loads an artifact from disk; the extension picks the backend.
pub struct FileModelProvider {
    path: PathBuf,
}

impl FileModelProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelProvider for FileModelProvider {
    fn load(&self) -> Result<Arc<dyn RiskModel>, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::NotFound {
                path: self.path.clone(),
            });
        }
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("onnx") => Ok(Arc::new(OnnxRiskModel::load(&self.path)?)),
            Some("json") => Ok(Arc::new(LinearRiskModel::load(&self.path)?)),
            _ => Err(LoadError::UnsupportedArtifact {
                path: self.path.clone(),
            }),
        }
    }
}

pub(crate) fn read_artifact(path: &Path) -> Result<(Vec<u8>, String), LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::Corrupt {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })?;
    let mut h = Sha256::new();
    h.update(&bytes);
    let digest = format!("{:x}", h.finalize());
    Ok((bytes, digest))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Unloaded,
    Loaded,
    Failed,
}

/// Model reference that moves once from unloaded to loaded or failed.
/// Concurrent first callers block on a single load; a failure is kept and
/// returned to every later caller without touching the provider again.
pub struct LazyModel {
    provider: Arc<dyn ModelProvider>,
    slot: OnceLock<Result<Arc<dyn RiskModel>, LoadError>>,
}

impl LazyModel {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            slot: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<dyn RiskModel>, LoadError> {
        self.slot
            .get_or_init(|| match self.provider.load() {
                Ok(model) => {
                    let info = model.info();
                    info!(
                        backend = %info.backend,
                        location = %info.location,
                        sha256 = %info.sha256,
                        "risk model loaded"
                    );
                    Ok(model)
                }
                Err(e) => {
                    warn!(error = %e, "risk model unavailable");
                    Err(e)
                }
            })
            .clone()
    }

    pub fn state(&self) -> ModelState {
        match self.slot.get() {
            None => ModelState::Unloaded,
            Some(Ok(_)) => ModelState::Loaded,
            Some(Err(_)) => ModelState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Constant(ModelInfo, Vec<String>);

    impl RiskModel for Constant {
        fn info(&self) -> &ModelInfo {
            &self.0
        }
        fn expected_features(&self) -> &[String] {
            &self.1
        }
        fn predict_proba(&self, _input: &[f32]) -> Result<f64, ModelError> {
            Ok(0.5)
        }
    }

    fn counting_provider(
        calls: Arc<AtomicUsize>,
        succeed: bool,
    ) -> Arc<dyn ModelProvider> {
        Arc::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            if succeed {
                let info = ModelInfo {
                    backend: "constant".into(),
                    location: "memory".into(),
                    sha256: String::new(),
                };
                Ok(Arc::new(Constant(info, vec![])) as Arc<dyn RiskModel>)
            } else {
                Err(LoadError::NotFound {
                    path: PathBuf::from("models/missing.onnx"),
                })
            }
        })
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let lazy = Arc::new(LazyModel::new(counting_provider(calls.clone(), true)));
        assert_eq!(lazy.state(), ModelState::Unloaded);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = lazy.clone();
                std::thread::spawn(move || lazy.get().is_ok())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lazy.state(), ModelState::Loaded);
        let a = lazy.get().unwrap();
        let b = lazy.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failure_is_remembered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let lazy = LazyModel::new(counting_provider(calls.clone(), false));
        assert!(lazy.get().is_err());
        assert!(lazy.get().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lazy.state(), ModelState::Failed);
    }

    #[test]
    fn file_provider_missing_artifact() {
        let p = FileModelProvider::new("nonexistent/pain_predictor.onnx");
        assert!(matches!(p.load(), Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn file_provider_rejects_pickles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pain_predictor.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();
        assert!(matches!(
            FileModelProvider::new(&path).load(),
            Err(LoadError::UnsupportedArtifact { .. })
        ));
    }

    #[test]
    fn artifact_digest_is_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        std::fs::write(&path, b"abc").unwrap();
        let (_, digest) = read_artifact(&path).unwrap();
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
