pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod params;

pub use config::{AnalysisConfig, load_dotenv};
pub use dataset::{Dataset, FieldValue, Row};
pub use error::*;
pub use loader::{load_library, parse_plist};
pub use params::{ParamBundle, ParamValue};
