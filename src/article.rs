//! Article records as delivered by a literature database.
//!
//! The [`LiteratureSource`] trait is the seam between the report pipeline and
//! whatever performs the actual search. [`crate::pubmed::PubMedClient`] is the
//! network implementation; tests plug in fixed fixtures.

use crate::error::Result;
use chrono::NaiveDate;
use std::fmt;
use std::future::Future;

/// A searchable literature database.
pub trait LiteratureSource {
    /// Run `query` and return at most `max_results` articles, in database order.
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<ArticleRecord>>> + Send;
}

/// One article as returned by the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// PubMed identifier; may hold several newline-separated values
    pub pubmed_id: String,
    pub title: Option<String>,
    pub publication_date: PublicationDate,
    pub authors: Vec<AuthorRecord>,
}

impl ArticleRecord {
    /// First line of the identifier field
    pub fn primary_id(&self) -> &str {
        self.pubmed_id.split('\n').next().unwrap_or_default()
    }
}

/// One author entry of an article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRecord {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub affiliation: Option<String>,
}

impl AuthorRecord {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        affiliation: impl Into<String>,
    ) -> Self {
        Self {
            last_name: Some(last_name.into()),
            first_name: Some(first_name.into()),
            affiliation: Some(affiliation.into()),
        }
    }

    /// Affiliation text, empty when absent
    pub fn affiliation(&self) -> &str {
        self.affiliation.as_deref().unwrap_or_default()
    }

    /// `"Lastname, Firstname"`, with separators stripped when a part is missing
    pub fn display_name(&self) -> String {
        format!(
            "{}, {}",
            self.last_name.as_deref().unwrap_or_default(),
            self.first_name.as_deref().unwrap_or_default()
        )
        .trim_matches(|c| c == ',' || c == ' ')
        .to_string()
    }
}

/// Publication date of an article.
///
/// `Date` renders as `YYYY-MM-DD`; `Raw` is the database's own text, rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationDate {
    Date(NaiveDate),
    Raw(String),
}

impl Default for PublicationDate {
    fn default() -> Self {
        PublicationDate::Raw(String::new())
    }
}

impl fmt::Display for PublicationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationDate::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            PublicationDate::Raw(text) => f.write_str(text),
        }
    }
}
