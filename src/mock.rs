// In-memory backend for test sheets and wrong-answer notes. The server
// does not expose these families yet, so the client serves them from here.
// Changes are kept for the lifetime of the store.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::model::{
    DocumentKind, Question, Testsheet, TestsheetDetail, Wrongsheet, WrongsheetDetail,
    WorksheetDetail,
};

#[derive(Debug, Clone)]
pub struct MockStore {
    testsheets: Vec<Testsheet>,
    testsheet_details: BTreeMap<i64, TestsheetDetail>,
    wrongsheets: Vec<Wrongsheet>,
    wrongsheet_details: BTreeMap<i64, WrongsheetDetail>,
}

const SEED: [(i64, &str, bool); 3] = [(1, "Math", true), (2, "Science", false), (3, "History", true)];

impl Default for MockStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MockStore {
    /// Empty store, mostly useful in tests.
    pub fn empty() -> Self {
        MockStore {
            testsheets: Vec::new(),
            testsheet_details: BTreeMap::new(),
            wrongsheets: Vec::new(),
            wrongsheet_details: BTreeMap::new(),
        }
    }

    /// Store preloaded with three test sheets and three wrong-answer notes.
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        let now = Utc::now();
        for (id, category, bookmarked) in SEED {
            store.testsheets.push(Testsheet {
                id,
                name: format!("Testsheet {id}"),
                category: category.to_string(),
                is_bookmarked: bookmarked,
                created_date: now,
            });
            store.testsheet_details.insert(id, seed_testsheet_detail(id, category));

            store.wrongsheets.push(Wrongsheet {
                id,
                name: format!("Wrongsheet {id}"),
                category: category.to_string(),
                is_bookmarked: bookmarked,
                created_date: now,
            });
            store.wrongsheet_details.insert(
                id,
                WrongsheetDetail {
                    wrongsheet_id: id,
                    name: format!("Wrongsheet {id}"),
                    category: category.to_string(),
                    questions: vec![
                        Question::new(1, "Question 1", "Answer 1"),
                        Question::new(2, "Question 2", "Answer 2"),
                    ],
                },
            );
        }
        store
    }

    pub fn testsheets(&self) -> Vec<Testsheet> {
        self.testsheets.clone()
    }

    pub fn testsheet(&self, id: i64) -> Result<TestsheetDetail, ApiError> {
        self.testsheet_details
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound { kind: DocumentKind::Testsheet, id })
    }

    /// Build a test sheet out of a worksheet's blanks: each blank becomes a
    /// question, the first half on page one and the rest on page two.
    pub fn create_testsheet(&mut self, source: &WorksheetDetail) -> TestsheetDetail {
        let id = next_id(self.testsheets.iter().map(|s| s.id));
        let questions: Vec<Question> = source
            .answer
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                let number = i as i64 + 1;
                Question::new(number, &format!("Blank {number} of {}", source.name), answer)
            })
            .collect();
        let split = questions.len().div_ceil(2);
        let (first, second) = questions.split_at(split);

        let detail = TestsheetDetail {
            testsheet_id: id,
            name: source.name.clone(),
            category: source.category.clone(),
            re_extracted: false,
            is_complete_all_blanks: vec![false; 2],
            questions1: first.to_vec(),
            questions2: second.to_vec(),
            score: None,
            is_correct: None,
        };
        self.testsheets.push(Testsheet {
            id,
            name: detail.name.clone(),
            category: detail.category.clone(),
            is_bookmarked: false,
            created_date: Utc::now(),
        });
        self.testsheet_details.insert(id, detail.clone());
        detail
    }

    /// Record the user's answers and grade them.
    pub fn grade_testsheet(
        &mut self,
        id: i64,
        answers1: &[String],
        answers2: &[String],
    ) -> Result<TestsheetDetail, ApiError> {
        let detail = self
            .testsheet_details
            .get_mut(&id)
            .ok_or(ApiError::NotFound { kind: DocumentKind::Testsheet, id })?;

        let score1 = record_answers(&mut detail.questions1, answers1);
        let score2 = record_answers(&mut detail.questions2, answers2);
        detail.is_correct = Some(
            detail
                .questions1
                .iter()
                .chain(detail.questions2.iter())
                .map(is_correct)
                .collect(),
        );
        detail.score = Some(vec![score1, score2]);
        detail.is_complete_all_blanks = vec![true; 2];
        Ok(detail.clone())
    }

    pub fn toggle_testsheet_bookmark(&mut self, id: i64) -> Result<Testsheet, ApiError> {
        let sheet = self
            .testsheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ApiError::NotFound { kind: DocumentKind::Testsheet, id })?;
        sheet.is_bookmarked = !sheet.is_bookmarked;
        Ok(sheet.clone())
    }

    pub fn delete_testsheet(&mut self, id: i64) -> Result<(), ApiError> {
        let before = self.testsheets.len();
        self.testsheets.retain(|s| s.id != id);
        self.testsheet_details.remove(&id);
        if self.testsheets.len() == before {
            return Err(ApiError::NotFound { kind: DocumentKind::Testsheet, id });
        }
        Ok(())
    }

    pub fn rename_testsheet(&mut self, id: i64, name: &str) -> Result<Testsheet, ApiError> {
        let sheet = self
            .testsheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ApiError::NotFound { kind: DocumentKind::Testsheet, id })?;
        sheet.name = name.to_string();
        if let Some(detail) = self.testsheet_details.get_mut(&id) {
            detail.name = name.to_string();
        }
        Ok(sheet.clone())
    }

    pub fn wrongsheets(&self) -> Vec<Wrongsheet> {
        self.wrongsheets.clone()
    }

    pub fn wrongsheet(&self, id: i64) -> Result<WrongsheetDetail, ApiError> {
        self.wrongsheet_details
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound { kind: DocumentKind::Wrongsheet, id })
    }

    pub fn create_wrongsheet(&mut self, category: &str, questions: Vec<Question>) -> WrongsheetDetail {
        let id = next_id(self.wrongsheets.iter().map(|s| s.id));
        let name = format!("Wrongsheet {id}");
        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| Question {
                question_id: i as i64 + 1,
                user_answer: None,
                ..q
            })
            .collect();

        let detail = WrongsheetDetail {
            wrongsheet_id: id,
            name: name.clone(),
            category: category.to_string(),
            questions,
        };
        self.wrongsheets.push(Wrongsheet {
            id,
            name,
            category: category.to_string(),
            is_bookmarked: false,
            created_date: Utc::now(),
        });
        self.wrongsheet_details.insert(id, detail.clone());
        detail
    }

    pub fn toggle_wrongsheet_bookmark(&mut self, id: i64) -> Result<Wrongsheet, ApiError> {
        let sheet = self
            .wrongsheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ApiError::NotFound { kind: DocumentKind::Wrongsheet, id })?;
        sheet.is_bookmarked = !sheet.is_bookmarked;
        Ok(sheet.clone())
    }

    pub fn rename_wrongsheet(&mut self, id: i64, name: &str) -> Result<Wrongsheet, ApiError> {
        let sheet = self
            .wrongsheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ApiError::NotFound { kind: DocumentKind::Wrongsheet, id })?;
        sheet.name = name.to_string();
        if let Some(detail) = self.wrongsheet_details.get_mut(&id) {
            detail.name = name.to_string();
        }
        Ok(sheet.clone())
    }

    pub fn delete_wrongsheet(&mut self, id: i64) -> Result<(), ApiError> {
        let before = self.wrongsheets.len();
        self.wrongsheets.retain(|s| s.id != id);
        self.wrongsheet_details.remove(&id);
        if self.wrongsheets.len() == before {
            return Err(ApiError::NotFound { kind: DocumentKind::Wrongsheet, id });
        }
        Ok(())
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

fn seed_testsheet_detail(id: i64, category: &str) -> TestsheetDetail {
    let answers = ["Answer 1", "Answer 2", "Answer 1", "Answer 2", "Answer 1", "Answer 2"];
    let questions1 = answers
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let n = i as i64 + 1;
            Question::new(n, &format!("Question {n}"), a)
        })
        .collect();
    let questions2 = ["Answer 3", "Answer 4", "Answer 1", "Answer 2"]
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let n = i as i64 + 7;
            Question::new(n, &format!("Question {n}"), a)
        })
        .collect();

    TestsheetDetail {
        testsheet_id: id,
        name: format!("Testsheet {id}"),
        category: category.to_string(),
        re_extracted: false,
        is_complete_all_blanks: vec![false; 2],
        questions1,
        questions2,
        score: None,
        is_correct: None,
    }
}

/// Missing answers count as wrong.
fn record_answers(questions: &mut [Question], answers: &[String]) -> i64 {
    for (i, question) in questions.iter_mut().enumerate() {
        question.user_answer = answers.get(i).map(|a| a.trim().to_string());
    }
    questions.iter().filter(|q| is_correct(q)).count() as i64
}

fn is_correct(question: &Question) -> bool {
    question
        .user_answer
        .as_deref()
        .map(|a| a == question.answer.trim())
        .unwrap_or(false)
}
