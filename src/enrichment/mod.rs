pub mod client;
pub mod error;
pub mod lookup;
pub mod types;

pub use client::{CaseClient, OutputFetcher};
pub use error::CaseError;
pub use lookup::Enricher;
