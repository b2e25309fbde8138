//! # Ledger Testkit Test Suite
//!
//! Cross-crate tests for the harness.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs        # LocalNetwork, message helpers, counting node
//! │   └── integration/
//! │       ├── bootstrap.rs   # module addresses, minting, permission merge
//! │       ├── pipeline.rs    # build/sign/broadcast against the local node
//! │       └── scenarios.rs   # the four reference scenarios end to end
//! └── benches/
//!     └── pipeline_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lt-tests
//! cargo test -p lt-tests integration::scenarios::
//! cargo bench -p lt-tests
//! ```

pub mod fixtures;
pub mod integration;
