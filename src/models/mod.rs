// ============ Model implementations ============

pub(crate) mod centroid;
pub(crate) mod linear;
pub(crate) mod tfidf;

// Public model structs (for direct construction and type annotations)
pub use centroid::NearestCentroidModel;
pub use linear::{LinearSvmModel, LogisticRegressionModel};
pub use tfidf::TfidfVectorizer;
