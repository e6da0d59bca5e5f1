//! Natural-language understanding pipeline.
//!
//! Classification is two-tiered: a deterministic regex cascade handles
//! the phrasings we see every day, and an external zero-shot oracle
//! catches everything else. Entity extraction runs regardless of which
//! tier decided the intent.

pub mod analyzer;
pub mod cascade;
pub mod entities;
pub mod intent;
pub mod normalizer;
pub mod oracle;

pub use analyzer::{ClassificationResult, NluAnalyzer};
pub use cascade::{CascadeMatch, PatternCascadeClassifier};
pub use entities::{EntityBag, EntityExtractor, NerSpan};
pub use intent::{ConfidenceTier, Intent};
pub use oracle::{FallbackOracleAdapter, NerProvider, NullNer, OracleClassifier, OracleRanking};
