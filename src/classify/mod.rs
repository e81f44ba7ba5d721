mod backend;
mod backends;
mod registry;

pub use backend::ClassifierBackend;
pub use backends::StubClassifier;
pub use registry::BackendRegistry;
