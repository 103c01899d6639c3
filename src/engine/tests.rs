//! End-to-end session flows against a scripted completion service.

use super::*;
use crate::assistant::tests::ScriptedService;
use crate::assistant::{ApplyError, AssistantState, PanelView, SuggestionBatch, SuggestionFile};
use crate::llm::LlmError;
use crate::preview::SandboxedFrame;
use crate::workspace::{CatalogError, FileKind, TemplateCatalog};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const ALT_TEXT_ANSWER: &str = r#"[
    {"file": "HTML", "suggestion": "Add alt text", "explanation": "Screen readers need it.", "suggestedCode": "<div>...</div>"},
    {"file": "CSS", "suggestion": "Check contrast", "explanation": "Cyan on slate is faint."}
]"#;

fn playground(responses: Vec<Result<String, LlmError>>) -> (Arc<SandboxedFrame>, Arc<ScriptedService>, Playground) {
    let catalog = Arc::new(TemplateCatalog::builtin().unwrap());
    let frame = Arc::new(SandboxedFrame::new());
    let service = ScriptedService::new(responses);
    let playground = Playground::new(catalog, frame.clone(), service.clone(), "gemini-2.5-flash");
    (frame, service, playground)
}

#[tokio::test(start_paused = true)]
async fn new_session_previews_default_template() {
    let (frame, _, pg) = playground(vec![]);
    assert_eq!(pg.buffer().active_template_id(), "welcome");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let doc = frame.current().document.unwrap();
    assert!(doc.html.contains("Bienvenido a Clientex"));
}

#[tokio::test(start_paused = true)]
async fn analyze_then_apply_replaces_markup_exactly() {
    let (frame, service, mut pg) = playground(vec![Ok(ALT_TEXT_ANSWER.into())]);
    let style = pg.buffer().style().to_string();
    let script = pg.buffer().script().to_string();

    let batch = pg.analyze().await.unwrap().clone();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.get(0).unwrap().title, "Add alt text");
    assert_eq!(service.requests().len(), 1);
    assert!(service.requests()[0].prompt.contains("myButton"));

    let applied = pg.apply_at(0).unwrap();
    assert_eq!(applied, FileKind::Html);
    assert_eq!(pg.buffer().markup(), "<div>...</div>");
    assert_eq!(pg.buffer().style(), style);
    assert_eq!(pg.buffer().script(), script);
    assert!(!pg.panel().is_open());
    assert_eq!(pg.panel().view(), PanelView::Hidden);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let doc = frame.current().document.unwrap();
    assert!(doc.html.contains("<body><div>...</div></body>"));
}

#[tokio::test(start_paused = true)]
async fn conceptual_and_error_cards_cannot_be_applied() {
    let (_, _, mut pg) = playground(vec![
        Ok(ALT_TEXT_ANSWER.into()),
        Err(LlmError::Timeout),
    ]);
    pg.analyze().await;
    let before = pg.buffer().clone();

    assert_eq!(pg.apply_at(1), Err(ApplyError::NoReplacement));
    assert_eq!(pg.apply_at(7), Err(ApplyError::NoSuchSuggestion(7)));

    let batch = pg.analyze().await.unwrap().clone();
    assert!(batch.is_failure());
    let card = batch.get(0).unwrap();
    assert_eq!(card.file, SuggestionFile::Error);
    assert!(card.explanation.contains("timeout"));

    assert_eq!(pg.apply_at(0), Err(ApplyError::NotApplicable));
    assert_eq!(pg.buffer(), &before);
    assert!(pg.panel().is_open());
}

#[tokio::test(start_paused = true)]
async fn trigger_is_disabled_while_loading() {
    let (_, service, mut pg) = playground(vec![Ok("[]".into())]);

    let pending = pg.begin_analysis().unwrap();
    assert!(pg.panel().state().is_loading());
    assert!(pg.panel().batch().is_none());
    assert!(pg.begin_analysis().is_none());

    assert!(!pg.settle_abandoned_analysis());
    assert!(!pg.finish_analysis(Uuid::new_v4(), SuggestionBatch::failure("stale")));
    assert!(pg.panel().state().is_loading());

    let (id, batch) = pending.run().await;
    assert!(pg.finish_analysis(id, batch));
    assert_eq!(pg.panel().state(), &AssistantState::Ready(SuggestionBatch::default()));
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_analysis_clears_previous_batch_immediately() {
    let (_, _, mut pg) = playground(vec![Ok(ALT_TEXT_ANSWER.into()), Ok("[]".into())]);
    pg.analyze().await;
    assert!(pg.panel().batch().is_some());

    let pending = pg.begin_analysis().unwrap();
    assert!(pg.panel().batch().is_none());
    assert_eq!(pg.panel().view(), PanelView::Loading);

    let (id, batch) = pending.run().await;
    pg.finish_analysis(id, batch);
    assert_eq!(pg.panel().batch().map(|b| b.len()), Some(0));
}

#[tokio::test(start_paused = true)]
async fn template_selection_overwrites_edits() {
    let (frame, _, mut pg) = playground(vec![]);
    pg.edit(FileKind::Css, "* { outline: 1px solid red; }");
    pg.edit(FileKind::JavaScript, "throw new Error('x');");
    assert!(pg.buffer().is_edited());

    pg.select_template("blank").unwrap();
    let blank = pg.catalog().find_by_id("blank").unwrap().clone();
    assert_eq!(pg.buffer().markup(), blank.html);
    assert_eq!(pg.buffer().style(), blank.css);
    assert_eq!(pg.buffer().script(), blank.js);
    assert_eq!(pg.buffer().active_template_id(), "blank");

    assert!(matches!(
        pg.select_template("missing"),
        Err(CatalogError::UnknownTemplate(_))
    ));
    assert_eq!(pg.buffer().active_template_id(), "blank");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(frame.reloads(), 1);
    assert!(frame.current().document.unwrap().html.contains("Comienza a escribir tu HTML"));
}

#[tokio::test(start_paused = true)]
async fn rapid_script_edits_render_once() {
    let (frame, _, mut pg) = playground(vec![]);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(frame.reloads(), 1);

    for i in 0..5 {
        pg.edit(FileKind::JavaScript, format!("console.log('edit {}');", i));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(frame.reloads(), 2);
    let html = frame.current().document.unwrap().html;
    assert!(html.contains("console.log('edit 4');"));
    assert!(!html.contains("edit 3"));
}

#[tokio::test(start_paused = true)]
async fn prompt_submission_is_accepted_and_discarded() {
    let (_, service, pg) = playground(vec![]);
    let before = pg.buffer().clone();

    assert!(pg.submit_prompt("make the button red"));
    assert!(!pg.submit_prompt("   "));
    assert_eq!(pg.buffer(), &before);
    assert!(service.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn flush_renders_immediately() {
    let (frame, _, mut pg) = playground(vec![]);
    pg.edit(FileKind::Html, "<main>now</main>");
    let doc = pg.flush_preview().await.unwrap();

    assert_eq!(frame.reloads(), 1);
    assert!(doc.html.contains("<main>now</main>"));
    assert!(!pg.preview().is_pending());
}

#[tokio::test(start_paused = true)]
async fn dropped_analysis_leaves_an_error_card_and_a_live_trigger() {
    let (_, service, mut pg) = playground(vec![Ok(ALT_TEXT_ANSWER.into())]);

    drop(pg.begin_analysis().unwrap());
    assert!(pg.panel().state().is_loading());

    assert!(pg.settle_abandoned_analysis());
    let batch = pg.panel().batch().unwrap();
    assert!(batch.is_failure());
    assert_eq!(batch.get(0).unwrap().explanation, ABANDONED_ANALYSIS);
    assert!(!pg.settle_abandoned_analysis());

    drop(pg.begin_analysis().unwrap());
    let batch = pg.analyze().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(service.requests().len(), 1);
}
