// API client module: a blocking HTTP client for the study-materials
// backend. Worksheets live on the server; test sheets and wrong-answer notes
// are served from an in-process mock store until the backend grows those
// endpoints.

use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;
use crate::mock::MockStore;
use crate::model::{
    Document, NewWorksheet, Question, Testsheet, TestsheetDetail, Worksheet, WorksheetDetail,
    Wrongsheet, WrongsheetDetail,
};

/// Client holding the reqwest blocking client, the backend base URL and the
/// store behind the mock-backed sheet families. Clones share the store.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    mock: Arc<Mutex<MockStore>>,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::with_store(&config.base_url, config.timeout, MockStore::seeded())
    }

    pub fn with_store(base_url: &str, timeout: Duration, store: MockStore) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mock: Arc::new(Mutex::new(store)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn store(&self) -> MutexGuard<'_, MockStore> {
        // Poisoning is ignored: every store operation is a single update.
        self.mock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Send the request and turn anything outside 2xx into `ApiError::Status`.
    /// Returns the raw body on success.
    fn execute(&self, request: RequestBuilder, what: &str) -> Result<String, ApiError> {
        let res = request.send().map_err(|e| {
            warn!("{what}: request failed: {e}");
            ApiError::Network(e)
        })?;
        let status = res.status();
        debug!("{what}: HTTP {status}");
        let body = res.text()?;
        if !status.is_success() {
            warn!("{what}: server responded {status}");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| {
            warn!("{what}: decoding error: {e}");
            debug!("{what}: body was {body}");
            ApiError::Decode(e)
        })
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!("GET {url}");
        let body = self.execute(self.client.get(&url), endpoint)?;
        Self::decode(&body, endpoint)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!("POST {url}");
        let body = self.execute(self.client.post(&url).json(body), endpoint)?;
        Self::decode(&body, endpoint)
    }

    fn patch(&self, endpoint: &str) -> Result<String, ApiError> {
        let url = self.url(endpoint);
        debug!("PATCH {url}");
        self.execute(
            self.client
                .patch(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json"),
            endpoint,
        )
    }

    // Worksheets

    /// Summaries of every worksheet owned by the user.
    pub fn get_worksheets(&self, user_id: &str) -> Result<Vec<Worksheet>, ApiError> {
        let worksheets: Vec<Worksheet> = self.get_json(&format!("/api/worksheet/user/{user_id}"))?;
        debug!("decoded {} worksheets", worksheets.len());
        Ok(worksheets)
    }

    /// Text and answers of one worksheet.
    pub fn get_worksheet(&self, worksheet_id: i64) -> Result<WorksheetDetail, ApiError> {
        self.get_json(&format!("/api/worksheet/ws/{worksheet_id}"))
    }

    /// The worksheet the user opened last.
    pub fn get_most_recent_worksheet(&self, user_id: &str) -> Result<WorksheetDetail, ApiError> {
        self.get_json(&format!("/api/worksheet/recentDate/{user_id}"))
    }

    pub fn create_worksheet(&self, request: &NewWorksheet) -> Result<WorksheetDetail, ApiError> {
        self.post_json("/api/worksheet", request)
    }

    /// The server flips the flag and returns the updated summary.
    pub fn toggle_worksheet_bookmark(&self, worksheet_id: i64) -> Result<Worksheet, ApiError> {
        let endpoint = format!("/api/worksheet/{worksheet_id}");
        let body = self.patch(&endpoint)?;
        Self::decode(&body, &endpoint)
    }

    /// Mark the worksheet as used just now.
    pub fn update_worksheet_recent_date(&self, worksheet_id: i64) -> Result<(), ApiError> {
        self.patch(&format!("/api/worksheet/recentDate/{worksheet_id}"))?;
        Ok(())
    }

    pub fn delete_worksheet(&self, worksheet_id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/worksheet/{worksheet_id}"));
        debug!("DELETE {url}");
        self.execute(self.client.delete(&url), "delete worksheet")?;
        Ok(())
    }

    // Test sheets (mock-backed)

    pub fn get_testsheets(&self, user_id: &str) -> Result<Vec<Testsheet>, ApiError> {
        debug!("serving test sheets for {user_id} from mock store");
        Ok(self.store().testsheets())
    }

    pub fn get_testsheet(&self, testsheet_id: i64) -> Result<TestsheetDetail, ApiError> {
        self.store().testsheet(testsheet_id)
    }

    pub fn create_testsheet(&self, worksheet: &WorksheetDetail) -> Result<TestsheetDetail, ApiError> {
        Ok(self.store().create_testsheet(worksheet))
    }

    /// Submit answers for both question pages and get the graded sheet back.
    pub fn update_testsheet(
        &self,
        testsheet_id: i64,
        answers1: &[String],
        answers2: &[String],
    ) -> Result<TestsheetDetail, ApiError> {
        self.store().grade_testsheet(testsheet_id, answers1, answers2)
    }

    pub fn toggle_testsheet_bookmark(&self, testsheet_id: i64) -> Result<Testsheet, ApiError> {
        self.store().toggle_testsheet_bookmark(testsheet_id)
    }

    pub fn delete_testsheet(&self, testsheet_id: i64) -> Result<(), ApiError> {
        self.store().delete_testsheet(testsheet_id)
    }

    // Wrong-answer notes (mock-backed)

    pub fn get_wrongsheets(&self, user_id: &str) -> Result<Vec<Wrongsheet>, ApiError> {
        debug!("serving wrong-answer notes for {user_id} from mock store");
        Ok(self.store().wrongsheets())
    }

    pub fn get_wrongsheet(&self, wrongsheet_id: i64) -> Result<WrongsheetDetail, ApiError> {
        self.store().wrongsheet(wrongsheet_id)
    }

    pub fn create_wrongsheet(&self, category: &str, questions: Vec<Question>) -> Result<WrongsheetDetail, ApiError> {
        Ok(self.store().create_wrongsheet(category, questions))
    }

    pub fn toggle_wrongsheet_bookmark(&self, wrongsheet_id: i64) -> Result<Wrongsheet, ApiError> {
        self.store().toggle_wrongsheet_bookmark(wrongsheet_id)
    }

    pub fn delete_wrongsheet(&self, wrongsheet_id: i64) -> Result<(), ApiError> {
        self.store().delete_wrongsheet(wrongsheet_id)
    }

    // Any kind

    /// Toggle the bookmark of any document and return its updated summary.
    pub fn toggle_bookmark(&self, document: &Document) -> Result<Document, ApiError> {
        Ok(match document {
            Document::Worksheet(w) => self.toggle_worksheet_bookmark(w.id)?.into(),
            Document::Testsheet(t) => self.toggle_testsheet_bookmark(t.id)?.into(),
            Document::Wrongsheet(w) => self.toggle_wrongsheet_bookmark(w.id)?.into(),
        })
    }

    /// Rename a document. Test sheets and wrong-answer notes keep the new
    /// name in the store; worksheets have no rename endpoint, so the renamed
    /// copy is only returned to the caller.
    pub fn rename_document(&self, document: &Document, name: &str) -> Result<Document, ApiError> {
        Ok(match document {
            Document::Worksheet(w) => {
                debug!("worksheet {} renamed locally only", w.id);
                let mut renamed = document.clone();
                renamed.rename(name);
                renamed
            }
            Document::Testsheet(t) => self.store().rename_testsheet(t.id, name)?.into(),
            Document::Wrongsheet(w) => self.store().rename_wrongsheet(w.id, name)?.into(),
        })
    }

    pub fn delete_document(&self, document: &Document) -> Result<(), ApiError> {
        match document {
            Document::Worksheet(w) => self.delete_worksheet(w.id),
            Document::Testsheet(t) => self.delete_testsheet(t.id),
            Document::Wrongsheet(w) => self.delete_wrongsheet(w.id),
        }
    }

    /// Fetch all three families at once and merge them into one list:
    /// worksheets first, then test sheets, then wrong-answer notes. Fails
    /// if any of the fetches fails.
    pub fn get_documents(&self, user_id: &str) -> Result<Vec<Document>, ApiError> {
        let (worksheets, testsheets, wrongsheets) = thread::scope(|s| {
            let worksheets = s.spawn(|| self.get_worksheets(user_id));
            let testsheets = s.spawn(|| self.get_testsheets(user_id));
            let wrongsheets = s.spawn(|| self.get_wrongsheets(user_id));
            (join(worksheets), join(testsheets), join(wrongsheets))
        });

        let mut documents: Vec<Document> = Vec::new();
        documents.extend(worksheets?.into_iter().map(Document::from));
        documents.extend(testsheets?.into_iter().map(Document::from));
        documents.extend(wrongsheets?.into_iter().map(Document::from));
        debug!("loaded {} documents for {user_id}", documents.len());
        Ok(documents)
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}
