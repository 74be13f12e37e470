//! Model Module - ensemble risk inference
//!
//! Bundle loading and validation, the two classifiers, scaling and the
//! weighted blend. The registry owns whatever model is currently active.

pub mod bundle;
pub mod classifier;
pub mod ensemble;
pub mod error;
pub mod registry;
pub mod scaler;
pub mod tree;

// Re-export common types
pub use bundle::{load_bundle, sha256_hex, FeatureImportance, ModelBundle, TrainingMetrics, SUPPORTED_SCHEMA_VERSION};
pub use classifier::Classifier;
pub use ensemble::{blend, EnsembleModel, ModelSummary, RiskScore, PRIMARY_WEIGHT, SECONDARY_WEIGHT};
pub use error::ModelError;
pub use registry::{ModelRegistry, RegistryStatus};
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, TreeNode};
