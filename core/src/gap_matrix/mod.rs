//! Percentile gap matrices
//!
//! For every selected job and snapshot date, compares each pair of ladder
//! percentiles (upper minus lower) and lays the results out as an
//! upper-triangular grid.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                 Dataset rows + FilterCriteria                  │
//! └────────────────────────────────────────────────────────────────┘
//!                              │
//!          expand composite jobs, derive CacheKey
//!                              │
//!                              ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │      GapMatrixCache: job -> date -> percentile -> value        │
//! │      (built once per key, dropped only by clear())             │
//! └────────────────────────────────────────────────────────────────┘
//!                              │
//!               resolve target dates, build tiles
//!                              │
//!                              ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │   MatrixPayload: role categories of tiles + color domain       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missing data never fails a build: an absent percentile value marks the
//! cell `is_missing`, and an empty selection yields an empty payload.

mod cache;
pub mod engine;

#[cfg(test)]
mod engine_tests;

pub use cache::{CacheEntry, CacheKey, GapMatrixCache};
pub use engine::{GapMatrixEngine, MatrixRequest, OTHER_ROLES, color_domain};
