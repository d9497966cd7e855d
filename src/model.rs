// Data shapes exchanged with the study-materials backend. Field names
// mirror the JSON the server sends, so most structs rename to camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three families of study documents a user can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Worksheet,
    Testsheet,
    Wrongsheet,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Worksheet,
        DocumentKind::Testsheet,
        DocumentKind::Wrongsheet,
    ];

    /// File-type string shown in the list rows and used by the kind filter.
    pub fn file_type(self) -> &'static str {
        match self {
            DocumentKind::Worksheet => "Worksheet",
            DocumentKind::Testsheet => "Test sheet",
            DocumentKind::Wrongsheet => "Wrong-answer note",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_type())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Worksheet {
    #[serde(rename = "worksheetId")]
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(rename = "isBookmark")]
    pub is_bookmarked: bool,
    #[serde(rename = "worksheetCreateDate", with = "crate::date")]
    pub created_date: DateTime<Utc>,
}

fn default_testsheet_name() -> String {
    DocumentKind::Testsheet.file_type().to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Testsheet {
    #[serde(rename = "testsheetId")]
    pub id: i64,
    /// Older test sheets were created without a name.
    #[serde(default = "default_testsheet_name")]
    pub name: String,
    pub category: String,
    #[serde(rename = "testsheetBookmark")]
    pub is_bookmarked: bool,
    #[serde(rename = "testsheetCreateDate", with = "crate::date")]
    pub created_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wrongsheet {
    #[serde(rename = "wrongsheetId")]
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(rename = "wrongsheetBookmark")]
    pub is_bookmarked: bool,
    #[serde(
        rename = "wrongsheetCreateDate",
        alias = "wrongsheetCreate_date",
        with = "crate::date"
    )]
    pub created_date: DateTime<Utc>,
}

/// Any document shown in a list. Identity is `(kind, id)`: ids are only
/// unique within one family.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Worksheet(Worksheet),
    Testsheet(Testsheet),
    Wrongsheet(Wrongsheet),
}

macro_rules! each_variant {
    ($doc:expr, $inner:ident => $body:expr) => {
        match $doc {
            Document::Worksheet($inner) => $body,
            Document::Testsheet($inner) => $body,
            Document::Wrongsheet($inner) => $body,
        }
    };
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Worksheet(_) => DocumentKind::Worksheet,
            Document::Testsheet(_) => DocumentKind::Testsheet,
            Document::Wrongsheet(_) => DocumentKind::Wrongsheet,
        }
    }

    pub fn id(&self) -> i64 {
        each_variant!(self, d => d.id)
    }

    pub fn key(&self) -> (DocumentKind, i64) {
        (self.kind(), self.id())
    }

    pub fn name(&self) -> &str {
        each_variant!(self, d => &d.name)
    }

    pub fn category(&self) -> &str {
        each_variant!(self, d => &d.category)
    }

    pub fn is_bookmarked(&self) -> bool {
        each_variant!(self, d => d.is_bookmarked)
    }

    pub fn set_bookmarked(&mut self, bookmarked: bool) {
        each_variant!(self, d => d.is_bookmarked = bookmarked)
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        each_variant!(self, d => d.created_date)
    }

    pub fn rename(&mut self, name: &str) {
        each_variant!(self, d => d.name = name.to_string())
    }

    pub fn file_type(&self) -> &'static str {
        self.kind().file_type()
    }
}

impl From<Worksheet> for Document {
    fn from(sheet: Worksheet) -> Self {
        Document::Worksheet(sheet)
    }
}

impl From<Testsheet> for Document {
    fn from(sheet: Testsheet) -> Self {
        Document::Testsheet(sheet)
    }
}

impl From<Wrongsheet> for Document {
    fn from(sheet: Wrongsheet) -> Self {
        Document::Wrongsheet(sheet)
    }
}

/// Full worksheet: source text plus the blanks the user fills in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetDetail {
    pub worksheet_id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub answer: Vec<String>,
    #[serde(default)]
    pub is_complete_all_blanks: Vec<bool>,
    #[serde(default)]
    pub is_add_worksheet: bool,
    #[serde(default)]
    pub is_make_test_sheet: bool,
    #[serde(default, with = "crate::date::option")]
    pub recent_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub user_answer: Option<String>,
}

impl Question {
    pub fn new(question_id: i64, question: &str, answer: &str) -> Self {
        Question {
            question_id,
            question: question.to_string(),
            answer: answer.to_string(),
            user_answer: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestsheetDetail {
    pub testsheet_id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub re_extracted: bool,
    #[serde(default)]
    pub is_complete_all_blanks: Vec<bool>,
    pub questions1: Vec<Question>,
    pub questions2: Vec<Question>,
    #[serde(default)]
    pub score: Option<Vec<i64>>,
    #[serde(default)]
    pub is_correct: Option<Vec<bool>>,
}

/// Grading result; the server may omit either half.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TestsheetGrade {
    #[serde(default)]
    pub score: Option<Vec<i64>>,
    #[serde(default)]
    pub is_correct: Option<Vec<bool>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WrongsheetDetail {
    pub wrongsheet_id: i64,
    pub name: String,
    pub category: String,
    pub questions: Vec<Question>,
}

/// Body of `POST /api/worksheet`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewWorksheet {
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_worksheet_list_entry() {
        let sheet: Worksheet = serde_json::from_value(json!({
            "worksheetId": 7,
            "name": "Cell biology",
            "category": "Science",
            "isBookmark": true,
            "worksheetCreateDate": "2024-07-01T09:00:00.000000"
        }))
        .unwrap();
        assert_eq!(sheet.id, 7);
        assert!(sheet.is_bookmarked);
        assert_eq!(sheet.category, "Science");
    }

    #[test]
    fn testsheet_name_defaults_to_kind_label() {
        let sheet: Testsheet = serde_json::from_value(json!({
            "testsheetId": 3,
            "category": "Math",
            "testsheetBookmark": false,
            "testsheetCreateDate": "2024-07-01T09:00:00"
        }))
        .unwrap();
        assert_eq!(sheet.name, "Test sheet");
    }

    #[test]
    fn wrongsheet_accepts_legacy_date_key() {
        let sheet: Wrongsheet = serde_json::from_value(json!({
            "wrongsheetId": 1,
            "name": "Mistakes",
            "category": "History",
            "wrongsheetBookmark": true,
            "wrongsheetCreate_date": "2024-07-01T09:00:00.5Z"
        }))
        .unwrap();
        assert_eq!(sheet.id, 1);
    }

    #[test]
    fn bad_dates_fail_decoding() {
        let err = serde_json::from_value::<Worksheet>(json!({
            "worksheetId": 1,
            "name": "n",
            "category": "c",
            "isBookmark": false,
            "worksheetCreateDate": "yesterday"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("does not match any known format"));
    }

    #[test]
    fn document_accessors_dispatch_per_variant() {
        let sheet: Testsheet = serde_json::from_value(json!({
            "testsheetId": 2,
            "name": "Quiz",
            "category": "Math",
            "testsheetBookmark": false,
            "testsheetCreateDate": "2024-07-01T09:00:00"
        }))
        .unwrap();
        let mut doc = Document::from(sheet);
        assert_eq!(doc.key(), (DocumentKind::Testsheet, 2));
        assert_eq!(doc.file_type(), "Test sheet");

        doc.set_bookmarked(true);
        doc.rename("Quiz 2");
        assert!(doc.is_bookmarked());
        assert_eq!(doc.name(), "Quiz 2");
    }

    #[test]
    fn testsheet_detail_tolerates_missing_grade() {
        let detail: TestsheetDetail = serde_json::from_value(json!({
            "testsheetId": 1,
            "name": "Quiz",
            "category": "Math",
            "reExtracted": false,
            "isCompleteAllBlanks": [false],
            "questions1": [{"questionId": 1, "question": "1+1", "answer": "2"}],
            "questions2": []
        }))
        .unwrap();
        assert!(detail.score.is_none());
        assert_eq!(detail.questions1[0].user_answer, None);

        let grade: TestsheetGrade = serde_json::from_value(json!({"score": [3, 1]})).unwrap();
        assert_eq!(grade.score, Some(vec![3, 1]));
        assert!(grade.is_correct.is_none());
    }
}
