//! # pubmed-papers
//!
//! Find PubMed papers with at least one author affiliated with a pharmaceutical
//! or biotech company, and report them as CSV.
//!
//! ## Modules
//!
//! - [`pubmed`] - NCBI E-utilities client (ESearch + EFetch)
//! - [`affiliation`] - Company vs. academic affiliation heuristic
//! - [`fetcher`] - Per-article processing and batch search
//! - [`report`] - CSV output
//! - [`article`] - Article records and the [`LiteratureSource`] seam
//! - [`config`] - Client configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmed_papers::{fetcher::PaperFetcher, pubmed::PubMedClient, report};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = PaperFetcher::new(PubMedClient::new()?);
//!     let rows = fetcher.fetch_papers("cancer immunotherapy", 100).await;
//!     report::write_csv(&rows, std::io::stdout())?;
//!     Ok(())
//! }
//! ```

pub mod affiliation;
pub mod article;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod pubmed;
pub mod report;

pub use article::{ArticleRecord, AuthorRecord, LiteratureSource, PublicationDate};
pub use error::{FetcherError, Result};
pub use fetcher::{PaperFetcher, PaperRow};
