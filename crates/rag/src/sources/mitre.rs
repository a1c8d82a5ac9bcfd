//! MITRE ATT&CK technique source backed by the public STIX dataset.

use crate::sources::DocumentSource;
use crate::types::RawDocument;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_DATASET_URL: &str = "https://raw.githubusercontent.com/mitre-attack/attack-stix-data/master/enterprise-attack/enterprise-attack-15.1.json";

/// Keep at most this many techniques per fetch.
const MAX_TECHNIQUES: usize = 5;

/// Descriptions are truncated to this many bytes for indexing.
const MAX_DESCRIPTION_LEN: usize = 500;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Fetches enterprise ATT&CK techniques, with a static fallback set of
/// common techniques when the dataset is unreachable.
pub struct MitreSource {
    client: reqwest::Client,
    dataset_url: String,
}

impl Default for MitreSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MitreSource {
    pub fn new() -> Self {
        Self::with_dataset_url(DEFAULT_DATASET_URL)
    }

    pub fn with_dataset_url(dataset_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            dataset_url: dataset_url.into(),
        }
    }

    async fn fetch_live(&self) -> Result<Vec<RawDocument>, reqwest::Error> {
        let body: serde_json::Value = self
            .client
            .get(&self.dataset_url)
            .send()
            .await?
            .json()
            .await?;
        Ok(parse_mitre_response(&body))
    }
}

#[async_trait::async_trait]
impl DocumentSource for MitreSource {
    fn name(&self) -> &str {
        "mitre"
    }

    async fn fetch(&self) -> Vec<RawDocument> {
        tracing::info!("fetching MITRE ATT&CK dataset");

        match self.fetch_live().await {
            Ok(documents) if !documents.is_empty() => {
                tracing::info!(count = documents.len(), "loaded MITRE techniques");
                documents
            }
            Ok(_) => {
                tracing::warn!("ATT&CK dataset held no usable techniques, using static fallback");
                fallback_techniques()
            }
            Err(error) => {
                tracing::warn!(%error, "failed to fetch MITRE data, using static fallback");
                fallback_techniques()
            }
        }
    }
}

/// Extract attack-pattern objects from a STIX bundle.
fn parse_mitre_response(root: &serde_json::Value) -> Vec<RawDocument> {
    let Some(objects) = root["objects"].as_array() else {
        return Vec::new();
    };

    let mut documents = Vec::new();

    for object in objects {
        if documents.len() >= MAX_TECHNIQUES {
            break;
        }

        if object["type"].as_str() != Some("attack-pattern") {
            continue;
        }

        let technique_id = object["external_references"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|r| r["source_name"].as_str() == Some("mitre-attack"))
            .and_then(|r| r["external_id"].as_str())
            .unwrap_or("");

        let name = object["name"].as_str().unwrap_or("");
        let description = object["description"].as_str().unwrap_or("");

        if technique_id.is_empty() || description.is_empty() || !technique_id.starts_with('T') {
            continue;
        }

        let truncated = truncate_at_char_boundary(description, MAX_DESCRIPTION_LEN);

        let mut metadata = HashMap::new();
        metadata.insert(
            "source".to_string(),
            format!("MITRE ATT&CK {}", technique_id),
        );
        metadata.insert("type".to_string(), "technique".to_string());

        documents.push(RawDocument {
            content: format!("MITRE {} - {}: {}", technique_id, name, truncated),
            metadata,
        });
    }

    documents
}

fn truncate_at_char_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Static set of common techniques used when the dataset is unavailable.
fn fallback_techniques() -> Vec<RawDocument> {
    let entries: [(&str, &str, &str, &str); 5] = [
        (
            "T1190",
            "Exploit Public-Facing Application",
            "initial-access",
            "Adversaries may attempt to exploit weaknesses in Internet-facing applications using software vulnerabilities, configuration errors, or by leveraging specific application features to cause unintended behavior.",
        ),
        (
            "T1059",
            "Command and Scripting Interpreter",
            "execution",
            "Adversaries may abuse command and script interpreters to execute commands, scripts, or binaries. These interfaces provide ways to interact with computer systems and are common across many platforms.",
        ),
        (
            "T1566",
            "Phishing",
            "initial-access",
            "Adversaries may send phishing messages to gain access to victim systems. All forms of phishing are electronically delivered social engineering targeting users to induce them to perform specific actions.",
        ),
        (
            "T1003",
            "OS Credential Dumping",
            "credential-access",
            "Adversaries may attempt to dump credentials to obtain account login and credential material from operating system memory, credential stores, or authentication modules.",
        ),
        (
            "T1486",
            "Data Encrypted for Impact",
            "impact",
            "Adversaries may encrypt data on target systems to interrupt availability to system and network resources. The adversary may render stored data inaccessible by encrypting files or withholding access to a decryption key (ransomware).",
        ),
    ];

    entries
        .iter()
        .map(|(id, name, kind, description)| {
            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), format!("MITRE ATT&CK {}", id));
            metadata.insert("type".to_string(), kind.to_string());
            RawDocument {
                content: format!("MITRE {} - {}: {}", id, name, description),
                metadata,
            }
        })
        .collect()
}
