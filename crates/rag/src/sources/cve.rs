//! CVE document source backed by the CIRCL public API.

use crate::sources::DocumentSource;
use crate::types::RawDocument;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://cve.circl.lu/api";

/// Keep at most this many CVEs per fetch.
const MAX_CVES: usize = 7;

/// Summaries shorter than this are skipped as uninformative.
const MIN_SUMMARY_LEN: usize = 50;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches recently updated CVE records, with a static fallback set of
/// well-known vulnerabilities when the API is unreachable.
pub struct CveSource {
    client: reqwest::Client,
    base_url: String,
}

impl Default for CveSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CveSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_live(&self) -> Result<Vec<RawDocument>, reqwest::Error> {
        let url = format!("{}/last/10", self.base_url);
        let body: serde_json::Value = self.client.get(&url).send().await?.json().await?;
        Ok(parse_cve_response(&body))
    }
}

#[async_trait::async_trait]
impl DocumentSource for CveSource {
    fn name(&self) -> &str {
        "cve"
    }

    async fn fetch(&self) -> Vec<RawDocument> {
        tracing::info!("fetching recent CVE data from cve.circl.lu");

        match self.fetch_live().await {
            Ok(documents) if !documents.is_empty() => {
                tracing::info!(count = documents.len(), "loaded CVEs from API");
                documents
            }
            Ok(_) => {
                tracing::warn!("CVE API returned no usable records, using static fallback");
                fallback_cves()
            }
            Err(error) => {
                tracing::warn!(%error, "failed to fetch CVEs, using static fallback");
                fallback_cves()
            }
        }
    }
}

/// Parse a CVE 5.0 record list into documents.
///
/// Records missing an id, or whose first description is shorter than
/// `MIN_SUMMARY_LEN`, are skipped.
fn parse_cve_response(root: &serde_json::Value) -> Vec<RawDocument> {
    let Some(records) = root.as_array() else {
        return Vec::new();
    };

    let mut documents = Vec::new();

    for record in records {
        if documents.len() >= MAX_CVES {
            break;
        }

        let cve_id = record["cveMetadata"]["cveId"].as_str().unwrap_or("");

        let summary = record["containers"]["cna"]["descriptions"]
            .get(0)
            .and_then(|d| d["value"].as_str())
            .unwrap_or("");

        let severity = record["containers"]["adp"]
            .get(0)
            .and_then(|adp| adp["metrics"].get(0))
            .and_then(|m| m["cvssV3_1"]["baseScore"].as_f64())
            .map(severity_label)
            .unwrap_or("UNKNOWN");

        if cve_id.is_empty() || summary.len() <= MIN_SUMMARY_LEN {
            continue;
        }

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), cve_id.to_string());
        metadata.insert("severity".to_string(), severity.to_string());

        documents.push(RawDocument {
            content: format!("{}: {}", cve_id, summary),
            metadata,
        });
    }

    documents
}

fn severity_label(base_score: f64) -> &'static str {
    if base_score >= 9.0 {
        "CRITICAL"
    } else if base_score >= 7.0 {
        "HIGH"
    } else if base_score >= 4.0 {
        "MEDIUM"
    } else {
        "LOW"
    }
}

/// Static set of well-known CVEs used when the API is unavailable.
fn fallback_cves() -> Vec<RawDocument> {
    let entries: [(&str, &str, &str); 5] = [
        (
            "CVE-2023-44487",
            "CRITICAL",
            "The HTTP/2 protocol allows a denial of service (server resource consumption) because request cancellation can reset many streams quickly, as exploited in the wild in August through October 2023. This is known as the 'HTTP/2 Rapid Reset' attack.",
        ),
        (
            "CVE-2024-3094",
            "CRITICAL",
            "Malicious code was discovered in the upstream tarballs of xz, starting with version 5.6.0. The liblzma build process extracts a prebuilt object file from a disguised test file, which is used to modify specific functions in the liblzma code, intercepting and modifying data interaction.",
        ),
        (
            "CVE-2021-44228",
            "CRITICAL",
            "Apache Log4j2 JNDI features used in configuration, log messages, and parameters do not protect against attacker controlled LDAP and other JNDI related endpoints. An attacker who can control log messages can execute arbitrary code loaded from LDAP servers when message lookup substitution is enabled.",
        ),
        (
            "CVE-2022-22965",
            "CRITICAL",
            "A Spring MVC or Spring WebFlux application running on JDK 9+ may be vulnerable to remote code execution (RCE) via data binding. The specific exploit requires the application to run on Tomcat as a WAR deployment.",
        ),
        (
            "CVE-2023-38545",
            "HIGH",
            "This flaw makes curl overflow a heap based buffer in the SOCKS5 proxy handshake. When curl is asked to use SOCKS5, the hostname is passed to the proxy instead of being resolved by curl itself. If the hostname is longer than 255 bytes, the target buffer is too small.",
        ),
    ];

    entries
        .iter()
        .map(|(id, severity, summary)| {
            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), id.to_string());
            metadata.insert("severity".to_string(), severity.to_string());
            RawDocument {
                content: format!("{}: {}", id, summary),
                metadata,
            }
        })
        .collect()
}
