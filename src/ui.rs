// UI layer: interactive menus built on `dialoguer`. Each screen is a small
// synchronous function; list state lives in `library` so these functions
// only prompt, call the API and print.

use crate::api::ApiClient;
use crate::config::Config;
use crate::library::{BookmarkList, CategoryFilter, DisplayType, DocumentList, ALL_CATEGORIES};
use crate::model::{Document, NewWorksheet, Question, TestsheetDetail, WorksheetDetail};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::time::Duration;

/// Everything a running session needs.
pub struct Session {
    api: ApiClient,
    config: Config,
    documents: DocumentList,
    bookmarks: BookmarkList,
}

impl Session {
    pub fn new(api: ApiClient, config: Config) -> Self {
        Session {
            api,
            config,
            documents: DocumentList::new(),
            bookmarks: BookmarkList::new(),
        }
    }
}

/// Main interactive menu. Runs a select loop until the user chooses "Exit".
pub fn main_menu(mut session: Session) -> Result<()> {
    if session.config.user_id.is_none() {
        handle_switch_user(&mut session)?;
    }

    loop {
        let user = session.config.user_id.clone().unwrap_or_default();
        println!();
        println!("{} {}", "Signed in as".dim(), user.as_str().bold());
        let items = vec![
            "Documents",
            "Bookmarks",
            "Continue most recent worksheet",
            "Create worksheet",
            "Switch user",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        let outcome = match selection {
            0 => documents_screen(&mut session),
            1 => bookmarks_screen(&mut session),
            2 => handle_recent_worksheet(&session),
            3 => handle_create_worksheet(&mut session),
            4 => handle_switch_user(&mut session),
            _ => break,
        };
        // A failed action should not end the session.
        if let Err(e) = outcome {
            error!("{e:#}");
            println!("{} {e:#}", "Error:".red());
        }
    }
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Run `f` behind a spinner.
fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = spinner(message);
    let result = f();
    spinner.finish_and_clear();
    result
}

fn user_id(session: &Session) -> Result<String> {
    session
        .config
        .user_id
        .clone()
        .context("no user selected, choose \"Switch user\" first")
}

/// Plain one-line description of a document, used as a menu item.
pub fn row_label(document: &Document) -> String {
    let star = if document.is_bookmarked() { "★" } else { "☆" };
    format!(
        "{star} {:<28} {:<12} {:<18} {}",
        document.name(),
        document.category(),
        document.file_type(),
        document.created_date().format("%Y-%m-%d")
    )
}

fn print_rows(documents: &[&Document]) {
    if documents.is_empty() {
        println!("{}", "(no documents)".dim());
        return;
    }
    for document in documents {
        let label = row_label(document);
        if document.is_bookmarked() {
            println!("{}", label.yellow());
        } else {
            println!("{label}");
        }
    }
}

/// Pick one document from `documents`, or `None` if the user backs out.
fn pick<'a>(prompt: &str, documents: &[&'a Document]) -> Result<Option<&'a Document>> {
    if documents.is_empty() {
        println!("Nothing to choose from.");
        return Ok(None);
    }
    let mut items: Vec<String> = documents.iter().map(|d| row_label(d)).collect();
    items.push("Back".into());
    let selection = Select::new().with_prompt(prompt).items(&items).default(0).interact()?;
    Ok(documents.get(selection).copied())
}

fn reload(session: &mut Session) -> Result<()> {
    let user = user_id(session)?;
    let documents = with_spinner("Loading documents...", || session.api.get_documents(&user))
        .context("Failed to load documents")?;
    info!("loaded {} documents", documents.len());
    let category = session.documents.category().clone();
    let display = session.documents.display();
    session.documents.set_documents(documents, category, display);
    // Built from the list so local renames carry over.
    session.bookmarks.set_documents(session.documents.documents().to_vec());
    Ok(())
}

fn documents_screen(session: &mut Session) -> Result<()> {
    reload(session)?;
    loop {
        println!();
        println!(
            "{} {} / {}",
            "Showing".dim(),
            session.documents.category().label().bold(),
            session.documents.display().label().bold()
        );
        print_rows(&session.documents.visible());

        let items = vec![
            "Filter by category",
            "Filter by type",
            "Open",
            "Toggle bookmark",
            "Rename",
            "Delete",
            "Refresh",
            "Back",
        ];
        let selection = Select::new().items(&items).default(2).interact()?;
        match selection {
            0 => choose_category(&mut session.documents)?,
            1 => {
                let display = choose_display()?;
                session.documents.set_display(display);
            }
            2 => {
                let visible = session.documents.visible();
                if let Some(document) = pick("Open which document?", &visible)? {
                    let document = document.clone();
                    session.documents.save_state();
                    open_document(session, &document)?;
                    reload(session)?;
                    session.documents.restore_state();
                }
            }
            3 => {
                let visible = session.documents.visible();
                if let Some(document) = pick("Bookmark which document?", &visible)? {
                    let document = document.clone();
                    toggle_bookmark(session, &document)?;
                }
            }
            4 => {
                let visible = session.documents.visible();
                if let Some(document) = pick("Rename which document?", &visible)? {
                    let document = document.clone();
                    rename_document(session, &document)?;
                }
            }
            5 => delete_documents(session)?,
            6 => reload(session)?,
            _ => break,
        }
    }
    Ok(())
}

fn bookmarks_screen(session: &mut Session) -> Result<()> {
    reload(session)?;
    loop {
        println!();
        println!("{} {}", "Bookmarks:".dim(), session.bookmarks.display().label().bold());
        print_rows(&session.bookmarks.visible());

        let items = vec!["Filter by type", "Open", "Remove bookmark", "Back"];
        let selection = Select::new().items(&items).default(1).interact()?;
        match selection {
            0 => {
                let display = choose_display()?;
                session.bookmarks.set_display(display);
            }
            1 => {
                let visible = session.bookmarks.visible();
                if let Some(document) = pick("Open which document?", &visible)? {
                    let document = document.clone();
                    open_document(session, &document)?;
                }
            }
            2 => {
                let visible = session.bookmarks.visible();
                if let Some(document) = pick("Remove which bookmark?", &visible)? {
                    let document = document.clone();
                    toggle_bookmark(session, &document)?;
                }
            }
            _ => break,
        }
    }
    Ok(())
}

fn choose_category(list: &mut DocumentList) -> Result<()> {
    let categories: Vec<String> = list.categories().map(str::to_string).collect();
    let mut items = vec![ALL_CATEGORIES.to_string()];
    items.extend(categories.iter().cloned());
    // Index 0 is the "show everything" entry, even if a category shares its label.
    let current = match list.category() {
        CategoryFilter::All => 0,
        CategoryFilter::Named(name) => categories.iter().position(|c| c == name).map_or(0, |i| i + 1),
    };
    let selection = Select::new()
        .with_prompt("Category")
        .items(&items)
        .default(current)
        .interact()?;
    match selection.checked_sub(1).and_then(|i| categories.get(i)) {
        Some(name) => {
            list.select_category(name);
        }
        None => list.reset_filter(),
    }
    Ok(())
}

fn choose_display() -> Result<DisplayType> {
    let items: Vec<&str> = DisplayType::ALL.iter().map(|d| d.label()).collect();
    let selection = Select::new().with_prompt("Type").items(&items).default(0).interact()?;
    Ok(DisplayType::ALL[selection])
}

fn toggle_bookmark(session: &mut Session, document: &Document) -> Result<()> {
    let updated = with_spinner("Updating bookmark...", || session.api.toggle_bookmark(document))
        .context("Failed to toggle bookmark")?;
    let state = if updated.is_bookmarked() { "bookmarked" } else { "unbookmarked" };
    println!("{} is now {state}.", updated.name());
    session.bookmarks.apply_update(updated.clone());
    if let Err(e) = session.documents.apply_update(updated) {
        warn!("bookmark changed for a document outside the list: {e}");
    }
    Ok(())
}

fn rename_document(session: &mut Session, document: &Document) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("New name")
        .with_initial_text(document.name())
        .interact_text()?;
    let name = name.trim();
    if name.is_empty() {
        println!("Rename failed: the new name is empty");
        return Ok(());
    }
    let renamed = session
        .api
        .rename_document(document, name)
        .context("Failed to rename document")?;
    session.documents.rename(renamed.kind(), renamed.id(), renamed.name())?;
    session.bookmarks.rename(renamed.kind(), renamed.id(), renamed.name());
    info!("renamed {} {} to {name:?}", document.kind(), document.id());
    println!("Renamed to {name}.");
    Ok(())
}

/// Tick any number of rows, confirm once, delete them all.
fn delete_documents(session: &mut Session) -> Result<()> {
    let candidates: Vec<Document> = session.documents.visible().into_iter().cloned().collect();
    if candidates.is_empty() {
        println!("Nothing to delete.");
        return Ok(());
    }
    let items: Vec<String> = candidates.iter().map(row_label).collect();
    let chosen = MultiSelect::new()
        .with_prompt("Delete which documents? (space to select, enter to confirm)")
        .items(&items)
        .interact()?;
    if chosen.is_empty() {
        return Ok(());
    }
    let confirmed = Confirm::new()
        .with_prompt(format!("Delete {} documents?", chosen.len()))
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(());
    }

    let mut deleted = Vec::new();
    for document in chosen.iter().filter_map(|&i| candidates.get(i)) {
        match with_spinner("Deleting...", || session.api.delete_document(document)) {
            Ok(()) => deleted.push(document.key()),
            Err(e) => {
                warn!("delete {} {} failed: {e}", document.kind(), document.id());
                println!("Could not delete {}: {e}", document.name());
            }
        }
    }
    for (kind, id) in &deleted {
        session.bookmarks.remove(*kind, *id);
    }
    let removed = session.documents.remove_all(&deleted);
    println!("Deleted {} documents.", removed.len());
    Ok(())
}

fn open_document(session: &mut Session, document: &Document) -> Result<()> {
    match document {
        Document::Worksheet(sheet) => {
            let detail = with_spinner("Loading worksheet...", || session.api.get_worksheet(sheet.id))
                .context("Failed to load worksheet")?;
            if let Err(e) = session.api.update_worksheet_recent_date(sheet.id) {
                warn!("could not update recent date for worksheet {}: {e}", sheet.id);
            }
            show_worksheet(&detail);
            let make_test = Confirm::new()
                .with_prompt("Make a test sheet from this worksheet?")
                .default(false)
                .interact()?;
            if make_test {
                let test = session.api.create_testsheet(&detail)?;
                let count = test.questions1.len() + test.questions2.len();
                println!("Created test sheet \"{}\" with {count} questions.", test.name);
            }
        }
        Document::Testsheet(sheet) => {
            let detail = session.api.get_testsheet(sheet.id).context("Failed to load test sheet")?;
            take_test(session, detail)?;
        }
        Document::Wrongsheet(sheet) => {
            let detail = session.api.get_wrongsheet(sheet.id).context("Failed to load wrong-answer note")?;
            println!();
            println!("{} ({})", detail.name.as_str().bold(), detail.category);
            for question in &detail.questions {
                println!("  Q{}. {}", question.question_id, question.question);
                println!("      {} {}", "answer:".dim(), question.answer);
            }
        }
    }
    Ok(())
}

fn show_worksheet(detail: &WorksheetDetail) {
    println!();
    println!("{} ({})", detail.name.as_str().bold(), detail.category);
    println!("{}", detail.content);
    if !detail.answer.is_empty() {
        println!("{} {}", "Blanks:".dim(), detail.answer.len());
    }
    let done = detail.is_complete_all_blanks.iter().filter(|c| **c).count();
    println!("{} {done}/{}", "Completed passes:".dim(), detail.is_complete_all_blanks.len());
}

fn ask_answers(questions: &[Question]) -> Result<Vec<String>> {
    let mut answers = Vec::with_capacity(questions.len());
    for question in questions {
        let answer: String = Input::new()
            .with_prompt(format!("Q{}. {}", question.question_id, question.question))
            .allow_empty(true)
            .interact_text()?;
        answers.push(answer);
    }
    Ok(answers)
}

fn take_test(session: &mut Session, detail: TestsheetDetail) -> Result<()> {
    println!();
    println!("{} ({})", detail.name.as_str().bold(), detail.category);
    if let Some(score) = &detail.score {
        println!("{} {score:?}", "Last score:".dim());
    }
    let start = Confirm::new().with_prompt("Take the test now?").default(true).interact()?;
    if !start {
        return Ok(());
    }

    let answers1 = ask_answers(&detail.questions1)?;
    let answers2 = ask_answers(&detail.questions2)?;
    let graded = session
        .api
        .update_testsheet(detail.testsheet_id, &answers1, &answers2)
        .context("Failed to submit answers")?;

    let total = graded.questions1.len() + graded.questions2.len();
    let correct: i64 = graded.score.iter().flatten().sum();
    println!("Score: {correct}/{total}");

    let wrong = wrong_answers(&graded);
    if wrong.is_empty() {
        println!("{}", "All correct!".green());
        return Ok(());
    }
    let save = Confirm::new()
        .with_prompt(format!("Save {} wrong answers to a note?", wrong.len()))
        .default(true)
        .interact()?;
    if save {
        let note = session.api.create_wrongsheet(&graded.category, wrong)?;
        println!("Saved \"{}\".", note.name);
    }
    Ok(())
}

/// Questions the user got wrong, in page order.
pub fn wrong_answers(graded: &TestsheetDetail) -> Vec<Question> {
    let Some(flags) = &graded.is_correct else {
        return Vec::new();
    };
    graded
        .questions1
        .iter()
        .chain(graded.questions2.iter())
        .zip(flags.iter())
        .filter(|(_, correct)| !**correct)
        .map(|(q, _)| q.clone())
        .collect()
}

fn handle_recent_worksheet(session: &Session) -> Result<()> {
    let user = user_id(session)?;
    let detail = with_spinner("Loading...", || session.api.get_most_recent_worksheet(&user))
        .context("Failed to load most recent worksheet")?;
    show_worksheet(&detail);
    Ok(())
}

/// Collect the fields of a new worksheet and POST it.
fn handle_create_worksheet(session: &mut Session) -> Result<()> {
    let user = user_id(session)?;
    let name: String = Input::new().with_prompt("Name").interact_text()?;
    let category: String = Input::new().with_prompt("Category").interact_text()?;
    let content: String = Input::new().with_prompt("Content").interact_text()?;
    let request = NewWorksheet {
        user_id: user,
        name,
        category,
        content,
    };
    let detail = with_spinner("Creating worksheet...", || session.api.create_worksheet(&request))
        .context("Failed to create worksheet")?;
    println!("Created \"{}\" in {}.", detail.name, detail.category);
    Ok(())
}

fn handle_switch_user(session: &mut Session) -> Result<()> {
    let mut input = Input::<String>::new();
    input.with_prompt("User id");
    if let Some(current) = &session.config.user_id {
        input.with_initial_text(current.as_str());
    }
    let id = input.interact_text()?;
    let id = id.trim();
    if id.is_empty() {
        println!("User id cannot be empty.");
        return Ok(());
    }
    // Keep going with the new id even if it could not be saved.
    if let Err(e) = session.config.persist_user_id(id) {
        warn!("{e}");
        session.config.user_id = Some(id.to_string());
    }
    session.documents = DocumentList::new();
    session.bookmarks = BookmarkList::new();
    Ok(())
}
