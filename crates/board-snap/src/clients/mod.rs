pub mod analysis;

pub use analysis::{AnalysisClient, Analyzer};
