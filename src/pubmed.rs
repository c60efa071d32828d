//! PubMed E-utilities client.
//!
//! A search is two sequential steps:
//! - ESearch (JSON) turns the query into a bounded list of PMIDs
//! - EFetch (XML) retrieves the records for those PMIDs, in chunks of
//!   [`PubMedConfig::batch_size`]
//!
//! No retries, no rate limiting: a failed request fails the whole search.

use crate::article::{ArticleRecord, AuthorRecord, LiteratureSource, PublicationDate};
use crate::config::PubMedConfig;
use crate::error::{FetcherError, OptionExt, Result};
use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use tracing::{debug, info};

/// User agent sent with every request
const USER_AGENT: &str = concat!("pubmed-papers/", env!("CARGO_PKG_VERSION"));

/// NCBI E-utilities client
pub struct PubMedClient {
    client: reqwest::Client,
    config: PubMedConfig,
}

impl PubMedClient {
    /// Client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(PubMedConfig::default())
    }

    pub fn with_config(config: PubMedConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetcherError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Return up to `max_results` PMIDs matching `query`
    pub async fn esearch(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", max_results.to_string()),
            ("retmode", "json".to_string()),
        ];
        params.extend(self.config.identity_params());

        let body = self.get_text("esearch.fcgi", &params).await?;
        let response: ESearchResponse = serde_json::from_str(&body)?;
        let result = response
            .esearchresult
            .ok_or_parse("ESearch response has no esearchresult")?;

        let not_found = result
            .error_list
            .and_then(|e| e.phrasesnotfound.into_iter().next());
        if let Some(message) = not_found {
            debug!(phrase = %message, "ESearch phrase not found");
        }

        info!(
            query = %query,
            count = %result.count.as_deref().unwrap_or("0"),
            returned = result.idlist.len(),
            "ESearch complete"
        );
        Ok(result.idlist)
    }

    /// Fetch and parse the records for `pmids`, preserving the ESearch order
    pub async fn efetch(&self, pmids: &[String]) -> Result<Vec<ArticleRecord>> {
        let mut articles = Vec::with_capacity(pmids.len());

        for chunk in pmids.chunks(self.config.batch_size) {
            let mut params = vec![
                ("db", "pubmed".to_string()),
                ("id", chunk.join(",")),
                ("retmode", "xml".to_string()),
                ("rettype", "abstract".to_string()),
            ];
            params.extend(self.config.identity_params());

            let xml = self.get_text("efetch.fcgi", &params).await?;
            let parsed = parse_efetch_xml(&xml)?;
            debug!(requested = chunk.len(), parsed = parsed.len(), "EFetch chunk parsed");
            articles.extend(parsed);
        }

        Ok(articles)
    }

    async fn get_text(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!(url = %url, "E-utilities request");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetcherError::Api {
                code: status.as_u16() as i32,
                message: format!("{} returned {}", endpoint, status),
            });
        }

        Ok(response.text().await?)
    }
}

impl LiteratureSource for PubMedClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ArticleRecord>> {
        if query.trim().is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }

        let pmids = self.esearch(query, max_results).await?;
        if pmids.is_empty() {
            return Ok(Vec::new());
        }
        self.efetch(&pmids).await
    }
}

// === ESearch Response Types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "errorlist", default)]
    error_list: Option<ESearchErrorList>,
}

#[derive(Debug, Deserialize)]
struct ESearchErrorList {
    #[serde(default)]
    phrasesnotfound: Vec<String>,
}

// === EFetch XML Parsing ===

/// Parse an EFetch `<PubmedArticleSet>` document.
///
/// Identifier: every `<ArticleId IdType="pubmed">` in the article, newline-joined,
/// falling back to the citation `<PMID>`. Date: the `pubmed` history date when
/// complete, otherwise the journal issue date as text.
pub fn parse_efetch_xml(xml: &str) -> Result<Vec<ArticleRecord>> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<ArticleBuilder> = None;
    let mut articles = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(builder) = current.as_mut() {
                    builder.open(&name, &e, &path);
                } else if name == "PubmedArticle" {
                    current = Some(ArticleBuilder::default());
                }
                path.push(name);
            }
            Event::Text(e) => {
                if let Some(builder) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| FetcherError::Parse(format!("Bad XML text: {}", err)))?;
                    builder.text(&path, &text);
                }
            }
            Event::CData(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.text(&path, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                if name == "PubmedArticle" {
                    if let Some(builder) = current.take() {
                        articles.push(builder.finish());
                    }
                } else if let Some(builder) = current.as_mut() {
                    builder.close(&name);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(articles)
}

fn has_attr(e: &BytesStart<'_>, key: &[u8], value: &[u8]) -> bool {
    e.attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == key && attr.value.as_ref() == value)
}

fn within(path: &[String], name: &str) -> bool {
    path.iter().any(|p| p == name)
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Default)]
struct AuthorBuilder {
    last_name: String,
    first_name: String,
    affiliation: Option<String>,
    affiliation_buf: Option<String>,
}

/// Accumulates one `<PubmedArticle>` while it is being read
#[derive(Default)]
struct ArticleBuilder {
    article_ids: Vec<String>,
    id_buf: Option<String>,
    citation_pmid: String,
    title: String,
    authors: Vec<AuthorRecord>,
    author: Option<AuthorBuilder>,
    in_pubmed_history: bool,
    history: [String; 3],
    journal_date: Vec<String>,
}

impl ArticleBuilder {
    fn open(&mut self, name: &str, e: &BytesStart<'_>, path: &[String]) {
        match name {
            "ArticleId" if has_attr(e, b"IdType", b"pubmed") => self.id_buf = Some(String::new()),
            "Author" if path.last().is_some_and(|p| p == "AuthorList") => {
                self.author = Some(AuthorBuilder::default())
            }
            "Affiliation" if path.last().is_some_and(|p| p == "AffiliationInfo") => {
                if let Some(author) = self.author.as_mut() {
                    author.affiliation_buf = Some(String::new());
                }
            }
            "PubMedPubDate" => self.in_pubmed_history = has_attr(e, b"PubStatus", b"pubmed"),
            _ => {}
        }
    }

    fn text(&mut self, path: &[String], text: &str) {
        let Some(element) = path.last().map(String::as_str) else {
            return;
        };

        if within(path, "ArticleTitle") {
            self.title.push_str(text);
            return;
        }

        if let Some(author) = self.author.as_mut() {
            match element {
                "LastName" | "CollectiveName" => author.last_name.push_str(text),
                "ForeName" => author.first_name.push_str(text),
                _ => {}
            }
            if let Some(buf) = author.affiliation_buf.as_mut() {
                buf.push_str(text);
            }
            return;
        }

        match element {
            "ArticleId" => {
                if let Some(buf) = self.id_buf.as_mut() {
                    buf.push_str(text);
                }
            }
            "PMID" if path.len() >= 2 && path[path.len() - 2] == "MedlineCitation" => {
                self.citation_pmid.push_str(text)
            }
            "Year" | "Month" | "Day" if self.in_pubmed_history => {
                let slot = match element {
                    "Year" => 0,
                    "Month" => 1,
                    _ => 2,
                };
                self.history[slot].push_str(text);
            }
            "Year" | "Month" | "Day" | "Season" | "MedlineDate"
                if within(path, "JournalIssue") && within(path, "PubDate") =>
            {
                let part = text.trim();
                if !part.is_empty() {
                    self.journal_date.push(part.to_string());
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "ArticleId" => {
                if let Some(id) = self.id_buf.take().and_then(non_empty) {
                    self.article_ids.push(id);
                }
            }
            "Affiliation" => {
                if let Some(author) = self.author.as_mut() {
                    let text = author.affiliation_buf.take().and_then(non_empty);
                    if author.affiliation.is_none() {
                        author.affiliation = text;
                    }
                }
            }
            "Author" => {
                if let Some(author) = self.author.take() {
                    self.authors.push(AuthorRecord {
                        last_name: non_empty(author.last_name),
                        first_name: non_empty(author.first_name),
                        affiliation: author.affiliation,
                    });
                }
            }
            "PubMedPubDate" => self.in_pubmed_history = false,
            _ => {}
        }
    }

    fn finish(self) -> ArticleRecord {
        let pubmed_id = if self.article_ids.is_empty() {
            self.citation_pmid.trim().to_string()
        } else {
            self.article_ids.join("\n")
        };

        let [year, month, day] = &self.history;
        let publication_date = match (
            year.trim().parse::<i32>(),
            month.trim().parse::<u32>(),
            day.trim().parse::<u32>(),
        ) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d).map(PublicationDate::Date),
            _ => None,
        }
        .unwrap_or_else(|| PublicationDate::Raw(self.journal_date.join(" ")));

        ArticleRecord {
            pubmed_id,
            title: non_empty(self.title),
            publication_date,
            authors: self.authors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_XML: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38000001</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2024</Year><Month>Jan</Month></PubDate>
          </JournalIssue>
          <Title>Drug Discovery Today</Title>
        </Journal>
        <ArticleTitle>Effects of <i>E. coli</i> on &amp; growth</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo>
              <Affiliation>Acme Biotech, Boston, MA, USA. Electronic address: jdoe@acme.com.</Affiliation>
            </AffiliationInfo>
            <AffiliationInfo>
              <Affiliation>Harvard University, Cambridge, MA, USA.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <Initials>R</Initials>
          </Author>
          <Author ValidYN="Y">
            <CollectiveName>Consortium Group</CollectiveName>
          </Author>
        </AuthorList>
      </Article>
      <CommentsCorrectionsList>
        <CommentsCorrections RefType="CommentOn">
          <RefSource>Other article</RefSource>
          <PMID Version="1">11111111</PMID>
        </CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
    <PubmedData>
      <History>
        <PubMedPubDate PubStatus="received"><Year>2023</Year><Month>9</Month><Day>1</Day></PubMedPubDate>
        <PubMedPubDate PubStatus="pubmed"><Year>2024</Year><Month>1</Month><Day>15</Day></PubMedPubDate>
      </History>
      <ArticleIdList>
        <ArticleId IdType="pubmed">38000001</ArticleId>
        <ArticleId IdType="doi">10.1000/ddt.2024.1</ArticleId>
      </ArticleIdList>
      <ReferenceList>
        <Reference>
          <Citation>Some cited work.</Citation>
          <ArticleIdList><ArticleId IdType="pubmed">22222222</ArticleId></ArticleIdList>
        </Reference>
      </ReferenceList>
    </PubmedData>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">38000002</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><MedlineDate>2023 Nov-Dec</MedlineDate></PubDate></JournalIssue>
        </Journal>
        <ArticleTitle>Second article</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_full_article() {
        let articles = parse_efetch_xml(ARTICLE_XML).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.pubmed_id, "38000001\n22222222");
        assert_eq!(first.primary_id(), "38000001");
        assert_eq!(first.title.as_deref(), Some("Effects of E. coli on & growth"));
        assert_eq!(first.publication_date.to_string(), "2024-01-15");

        assert_eq!(first.authors.len(), 3);
        assert_eq!(first.authors[0].last_name.as_deref(), Some("Doe"));
        assert_eq!(first.authors[0].first_name.as_deref(), Some("Jane"));
        assert_eq!(
            first.authors[0].affiliation.as_deref(),
            Some("Acme Biotech, Boston, MA, USA. Electronic address: jdoe@acme.com.")
        );
        assert_eq!(first.authors[1].first_name, None);
        assert_eq!(first.authors[1].affiliation, None);
        assert_eq!(first.authors[2].last_name.as_deref(), Some("Consortium Group"));
    }

    #[test]
    fn test_fallbacks_for_sparse_article() {
        let articles = parse_efetch_xml(ARTICLE_XML).unwrap();
        let second = &articles[1];
        assert_eq!(second.pubmed_id, "38000002");
        assert_eq!(
            second.publication_date,
            PublicationDate::Raw("2023 Nov-Dec".to_string())
        );
        assert!(second.authors.is_empty());
    }

    #[test]
    fn test_empty_article_set() {
        let articles = parse_efetch_xml("<PubmedArticleSet></PubmedArticleSet>").unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let result =
            parse_efetch_xml("<PubmedArticleSet><PubmedArticle></Wrong></PubmedArticleSet>");
        assert!(result.is_err());
    }

    #[test]
    fn test_esearch_response_shape() {
        let body = r#"{
            "header": {"type": "esearch"},
            "esearchresult": {"count": "2", "retmax": "2", "idlist": ["1", "2"]}
        }"#;
        let response: ESearchResponse = serde_json::from_str(body).unwrap();
        let result = response.esearchresult.unwrap();
        assert_eq!(result.idlist, vec!["1", "2"]);
        assert_eq!(result.count.as_deref(), Some("2"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PubMedConfig::default().with_batch_size(0);
        assert!(PubMedClient::with_config(config).is_err());
    }
}
