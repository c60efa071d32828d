//! Paper selection: search, classify authors, build report rows.
//!
//! A paper survives only if at least one of its authors has a company
//! affiliation. Failures never escape [`PaperFetcher::fetch_papers`]: a bad
//! article is dropped, a failed search yields no rows.

use crate::affiliation::AffiliationClassifier;
use crate::article::{ArticleRecord, AuthorRecord, LiteratureSource};
use crate::error::{FetcherError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, error, info};

/// Default number of articles requested per search
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Value of the email column when no address was found
pub const NO_EMAIL: &str = "N/A";

/// Separator for the author and affiliation columns
const LIST_SEPARATOR: &str = "; ";

/// One report row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

/// Runs searches against a [`LiteratureSource`] and keeps papers with company authors
pub struct PaperFetcher<S> {
    source: S,
    classifier: AffiliationClassifier,
}

impl<S: LiteratureSource> PaperFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_classifier(source, AffiliationClassifier::default())
    }

    pub fn with_classifier(source: S, classifier: AffiliationClassifier) -> Self {
        Self { source, classifier }
    }

    /// Search once and return the rows of all qualifying papers, in source order.
    ///
    /// A failed search is logged and produces an empty list.
    pub async fn fetch_papers(&self, query: &str, max_results: usize) -> Vec<PaperRow> {
        info!(query = %query, max_results, "Fetching papers");

        let articles = match self.source.search(query, max_results).await {
            Ok(articles) => articles,
            Err(e) => {
                error!(query = %query, error = %e, "Error fetching papers");
                return Vec::new();
            }
        };

        let total = articles.len();
        let rows: Vec<PaperRow> = articles
            .iter()
            .filter_map(|article| match self.process_article(article) {
                Ok(row) => row,
                Err(e) => {
                    debug!(pmid = %article.pubmed_id, error = %e, "Error processing article");
                    None
                }
            })
            .collect();

        info!(total, kept = rows.len(), "Papers with non-academic authors");
        rows
    }

    /// Build the row for one article, or `None` if no author is company-affiliated.
    pub fn process_article(&self, article: &ArticleRecord) -> Result<Option<PaperRow>> {
        let pubmed_id = article.primary_id().trim();
        if pubmed_id.is_empty() {
            return Err(FetcherError::MalformedArticle(
                "article has no PubMed identifier".to_string(),
            ));
        }

        let company_authors: Vec<&AuthorRecord> = article
            .authors
            .iter()
            .filter(|author| self.classifier.is_company(author.affiliation()))
            .collect();

        if company_authors.is_empty() {
            debug!(pmid = %pubmed_id, "No non-academic authors");
            return Ok(None);
        }

        let (names, affiliations): (Vec<String>, Vec<&str>) = company_authors
            .iter()
            .map(|author| (author.display_name(), author.affiliation()))
            .unzip();

        let corresponding_email = corresponding_email(company_authors.iter().copied())
            .unwrap_or_else(|| NO_EMAIL.to_string());

        Ok(Some(PaperRow {
            pubmed_id: pubmed_id.to_string(),
            title: article.title.clone().unwrap_or_default(),
            publication_date: article.publication_date.to_string(),
            non_academic_authors: names.join(LIST_SEPARATOR),
            company_affiliations: affiliations.join(LIST_SEPARATOR),
            corresponding_email,
        }))
    }
}

/// First email found in an affiliation mentioning "email", scanning `authors` in order.
///
/// Callers pass only company-affiliated authors.
pub fn corresponding_email<'a, I>(authors: I) -> Option<String>
where
    I: IntoIterator<Item = &'a AuthorRecord>,
{
    authors
        .into_iter()
        .map(AuthorRecord::affiliation)
        .filter(|affiliation| affiliation.to_lowercase().contains("email"))
        .find_map(extract_email)
}

/// First `local@domain.tld` token in `text`
pub fn extract_email(text: &str) -> Option<String> {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").ok())
        .as_ref()?
        .find(text)
        .map(|m| m.as_str().to_string())
}
