mod classifier;
mod enhancer;
mod extractor;
mod normalize;
mod pipeline;
mod standardizer;

pub use classifier::{classify, classify_detailed, Classification, ConfidenceTier};
pub use enhancer::{from_fn, EnhanceError, EnhanceResult, EnhancementStep, Enhancer, FnStep};
pub use extractor::{
    extract, extract_one, CandidateRecord, NoiseReason, RawRecord, HINT_CONTEXT, HINT_ROLE,
    META_CONFIDENCE, META_NOISE_REASON, META_OFFSET,
};
pub use normalize::{collapse_whitespace, normalize_text};
pub use pipeline::{BatchReport, BatchWarning, Pipeline, RefineOutput, Stage};
pub use standardizer::{standardize, StandardizeError, StandardizeResult};
