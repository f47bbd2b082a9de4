use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::debug_println;
use crate::models::EntityStub;
use crate::source::{ListingSource, ResultPage, SourceError};

const BASE_URL: &str = "https://search.sunbiz.org";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Florida Division of Corporations entity search, reduced to the
/// `ListingSource` calls. Plain HTTP fetches stand in for the browser
/// automation the site sometimes warrants; stealth rendering is someone
/// else's problem and lives outside this adapter.
pub struct SunbizSource {
    client: reqwest::blocking::Client,
}

impl SunbizSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SunbizSource { client })
    }

    /// Entity-name search URL for a term, in the shape the site's forward
    /// list navigation expects.
    pub fn build_search_url(term: &str) -> String {
        let encoded = urlencoding::encode(term);
        format!(
            "{}/Inquiry/CorporationSearch/SearchResults?InquiryType=EntityName\
             &inquiryDirectionType=ForwardList&SearchTerm={}&searchNameOrder={}",
            BASE_URL, encoded, encoded
        )
    }

    fn get(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client.get(url).send()?.error_for_status()?.text()
    }
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", BASE_URL, href)
    }
}

/// Pull result rows and the "Next List" link out of a search-results page.
pub fn parse_result_page(html: &str) -> ResultPage {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("#search-results table tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let mut stubs = Vec::new();
    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() < 3 {
            continue;
        }
        let link = match cells[0].select(&link_selector).next() {
            Some(link) => link,
            None => continue,
        };
        let name = link.text().collect::<String>().trim().to_string();
        let href = link.value().attr("href").unwrap_or("").to_string();
        if name.is_empty() || href.is_empty() {
            continue;
        }
        stubs.push(EntityStub {
            name,
            document_number: cells[1].text().collect::<String>().trim().to_string(),
            detail_locator: href,
        });
    }

    let next_selector = Selector::parse(r#"a[title="Next List"]"#).unwrap();
    let next_page_token = document
        .select(&next_selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(absolute_url);

    ResultPage {
        stubs,
        next_page_token,
    }
}

/// Pull every labeled `div.detailSection` out of a detail page: the first
/// span is the label, the second the value.
pub fn parse_detail_sections(html: &str) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let section_selector = Selector::parse("div.detailSection").unwrap();
    let span_selector = Selector::parse("span").unwrap();

    let mut sections = BTreeMap::new();
    for section in document.select(&section_selector) {
        let spans: Vec<_> = section.select(&span_selector).collect();
        if spans.len() < 2 {
            continue;
        }
        let label = spans[0].text().collect::<String>().trim().to_string();
        let value = spans[1].text().collect::<String>().trim().to_string();
        if !label.is_empty() {
            sections.insert(label, value);
        }
    }
    sections
}

impl ListingSource for SunbizSource {
    fn fetch_page(&self, term: &str, page_token: Option<&str>) -> Result<ResultPage, SourceError> {
        let url = match page_token {
            Some(token) => token.to_string(),
            None => Self::build_search_url(term),
        };
        debug_println!("Fetching result page: {}", url);

        let body = self
            .get(&url)
            .map_err(|e| SourceError::SourceUnavailable(format!("{}: {}", url, e)))?;
        let page = parse_result_page(&body);
        debug_println!(
            "Parsed {} rows, next page: {}",
            page.stubs.len(),
            page.next_page_token.is_some()
        );
        Ok(page)
    }

    fn fetch_detail(&self, locator: &str) -> Result<BTreeMap<String, String>, SourceError> {
        let url = absolute_url(locator);
        debug_println!("Fetching detail page: {}", url);

        let body = self.get(&url).map_err(|e| SourceError::DetailUnavailable {
            locator: locator.to_string(),
            message: e.to_string(),
        })?;
        Ok(parse_detail_sections(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_HTML: &str = r##"
        <div id="search-results">
          <table>
            <tbody>
              <tr>
                <td><a href="/Inquiry/CorporationSearch/SearchResultDetail?id=1">ACME PLUMBING INC</a></td>
                <td>P01000046477</td>
                <td>Active</td>
              </tr>
              <tr>
                <td><a href="/Inquiry/CorporationSearch/SearchResultDetail?id=2">BAY PIPES LLC</a></td>
                <td>L25000042439</td>
                <td>INACT</td>
              </tr>
              <tr><td>malformed row</td></tr>
            </tbody>
          </table>
        </div>
        <a title="Next List" href="/Inquiry/CorporationSearch/SearchResults?page=2">Next List</a>
    "##;

    #[test]
    fn result_rows_parse_in_table_order() {
        let page = parse_result_page(RESULTS_HTML);
        assert_eq!(page.stubs.len(), 2);
        assert_eq!(page.stubs[0].name, "ACME PLUMBING INC");
        assert_eq!(page.stubs[0].document_number, "P01000046477");
        assert_eq!(
            page.stubs[0].detail_locator,
            "/Inquiry/CorporationSearch/SearchResultDetail?id=1"
        );
        assert_eq!(page.stubs[1].name, "BAY PIPES LLC");
    }

    #[test]
    fn next_list_link_becomes_an_absolute_token() {
        let page = parse_result_page(RESULTS_HTML);
        assert_eq!(
            page.next_page_token.as_deref(),
            Some("https://search.sunbiz.org/Inquiry/CorporationSearch/SearchResults?page=2")
        );
    }

    #[test]
    fn last_page_has_no_token() {
        let html = RESULTS_HTML.replace(r#"title="Next List""#, r#"title="Elsewhere""#);
        let page = parse_result_page(&html);
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn detail_sections_pair_label_and_value_spans() {
        let html = r#"
            <div class="detailSection"><span>Principal Address</span><span>100 Gulf Blvd
            Tampa, FL 33607</span></div>
            <div class="detailSection"><span>Mailing Address</span><span>PO Box 9</span></div>
            <div class="detailSection"><span>lonely</span></div>
            <div class="detailSection"><span></span><span>unlabeled</span></div>
        "#;
        let sections = parse_detail_sections(html);
        assert_eq!(sections.len(), 2);
        assert!(sections["Principal Address"].starts_with("100 Gulf Blvd"));
        assert_eq!(sections["Mailing Address"], "PO Box 9");
    }

    #[test]
    fn search_url_percent_encodes_the_term() {
        let url = SunbizSource::build_search_url("water filter");
        assert!(url.starts_with("https://search.sunbiz.org/Inquiry/CorporationSearch/SearchResults"));
        assert!(url.contains("SearchTerm=water%20filter"));
    }
}
