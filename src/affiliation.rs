//! Company vs. academic classification of author affiliations.
//!
//! Matching is case-insensitive substring search against two keyword lists.
//! A company keyword always wins; an affiliation with no academic keyword at
//! all is also treated as a company. Only an empty affiliation is never a company.

use tracing::trace;

/// Keywords marking an academic institution
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "institute",
    "laboratory",
    "lab",
    "school",
    "academic",
];

/// Keywords marking a pharmaceutical/biotech company
pub const COMPANY_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "laboratories",
    "inc.",
    "ltd.",
    "corporation",
    "llc",
    "company",
];

/// Affiliation classifier with replaceable keyword lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationClassifier {
    academic: Vec<String>,
    company: Vec<String>,
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(ACADEMIC_KEYWORDS, COMPANY_KEYWORDS)
    }
}

impl AffiliationClassifier {
    /// Build a classifier from custom keyword lists. Keywords are lower-cased.
    pub fn new<A, C>(academic: A, company: C) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            academic: academic.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            company: company.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
        }
    }

    /// True when `affiliation` is judged to belong to a company
    pub fn is_company(&self, affiliation: &str) -> bool {
        if affiliation.is_empty() {
            return false;
        }

        let lower = affiliation.to_lowercase();
        let has_academic = self.academic.iter().any(|k| lower.contains(k.as_str()));
        let has_company = self.company.iter().any(|k| lower.contains(k.as_str()));

        trace!(has_academic, has_company, affiliation, "Classified affiliation");
        has_company || !has_academic
    }
}

/// Classify with the default keyword lists
pub fn is_company_affiliation(affiliation: &str) -> bool {
    AffiliationClassifier::default().is_company(affiliation)
}
