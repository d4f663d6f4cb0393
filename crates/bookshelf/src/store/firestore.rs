//! Profile store backed by the Firestore REST API.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::profile::{ProfileRecord, ProfileStore};
use super::{check_status, StoreError};
use crate::google::{GoogleAuth, FIREBASE_SCOPES};

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const LIST_PAGE_SIZE: u32 = 300;

#[derive(Debug, Default, Serialize, Deserialize)]
struct FieldValue {
    #[serde(rename = "stringValue", default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

impl Document {
    fn into_record(self) -> ProfileRecord {
        let mut fields = self.fields;
        let mut take = |key: &str| {
            fields
                .remove(key)
                .and_then(|v| v.string_value)
                .unwrap_or_default()
        };
        let mut record = ProfileRecord {
            name: take("name"),
            email: take("email"),
            mobile: take("mobile"),
            dob: take("dob"),
            qualification: take("qualification"),
        };
        if record.name.is_empty() {
            // Document ids are the profile name.
            record.name = self.name.rsplit('/').next().unwrap_or_default().to_string();
        }
        record
    }
}

fn record_fields(record: &ProfileRecord) -> serde_json::Value {
    let string = |v: &str| json!({ "stringValue": v });
    json!({
        "fields": {
            "name": string(&record.name),
            "email": string(&record.email),
            "mobile": string(&record.mobile),
            "dob": string(&record.dob),
            "qualification": string(&record.qualification),
        }
    })
}

/// Firestore collection of profiles, one document per name.
#[derive(Clone)]
pub struct FirestoreProfileStore {
    auth: GoogleAuth,
    http: reqwest::Client,
    collection_url: Url,
}

impl FirestoreProfileStore {
    /// Build a store for `collection` in the key's project.
    pub fn new(auth: GoogleAuth, collection: &str) -> Result<Self, StoreError> {
        let project = auth
            .project_id()
            .ok_or_else(|| StoreError::Unavailable("service account has no project_id".to_string()))?;

        let mut collection_url = Url::parse(FIRESTORE_BASE)
            .map_err(|e| StoreError::Decode(format!("firestore url: {}", e)))?;
        collection_url
            .path_segments_mut()
            .map_err(|_| StoreError::Decode("firestore url cannot be a base".to_string()))?
            .extend(["projects", project, "databases", "(default)", "documents", collection]);

        Ok(Self {
            auth,
            http: reqwest::Client::new(),
            collection_url,
        })
    }

    fn document_url(&self, name: &str) -> Result<Url, StoreError> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode("firestore url cannot be a base".to_string()))?
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn get(&self, name: &str) -> Result<Option<ProfileRecord>, StoreError> {
        let token = self.auth.token(FIREBASE_SCOPES).await?;
        let res = self
            .http
            .get(self.document_url(name)?)
            .bearer_auth(token)
            .send()
            .await?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Document = check_status(res).await?.json().await?;
        Ok(Some(document.into_record()))
    }

    async fn put(&self, record: &ProfileRecord) -> Result<(), StoreError> {
        let token = self.auth.token(FIREBASE_SCOPES).await?;
        let res = self
            .http
            .patch(self.document_url(&record.name)?)
            .bearer_auth(token)
            .json(&record_fields(record))
            .send()
            .await?;
        check_status(res).await?;

        tracing::debug!(name = %record.name, "Profile document written");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProfileRecord>, StoreError> {
        let token = self.auth.token(FIREBASE_SCOPES).await?;
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.collection_url.clone())
                .bearer_auth(&token)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let page: ListDocumentsResponse = check_status(request.send().await?).await?.json().await?;
            records.extend(page.documents.into_iter().map(Document::into_record));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = records.len(), "Profile documents listed");
        Ok(records)
    }
}
