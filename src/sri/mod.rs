//! Subresource integrity injection.
//!
//! # Flow
//!
//! ```text
//! Document ──> SriPipeline::process
//!                  │
//!                  ├─ Stream  ──> SriError::StreamUnsupported
//!                  ├─ Empty   ──> forwarded untouched
//!                  └─ Buffer  ──> transform
//!                                   ├─ markup + selector   (candidates)
//!                                   ├─ reference           (local path or skip)
//!                                   ├─ resolve             (filesystem path)
//!                                   └─ integrity + cache   (digest, once per path)
//! ```

mod algorithm;
mod cache;
mod document;
mod integrity;
mod markup;
mod pipeline;
mod reference;
mod resolve;
mod selector;
mod transform;

pub use algorithm::Algorithm;
pub use document::Document;
pub use pipeline::{Processed, SriPipeline};
pub use resolve::Resolution;
pub use selector::{DEFAULT_SELECTOR, SelectorError, SelectorList};
