use crate::assistant::PanelView;
use crate::engine::Playground;
use crate::preview::PreviewDocument;
use crate::workspace::{FileKind, TemplateSummary};
use tokio::sync::Mutex;

// Global state: the one editor session shown by the host UI
pub struct AppState {
    pub playground: Mutex<Playground>,
}

impl AppState {
    pub fn new(playground: Playground) -> Self {
        Self {
            playground: Mutex::new(playground),
        }
    }
}

/* ---------- 1.  SOURCES ---------- */

pub async fn list_templates(state: &AppState) -> Result<Vec<TemplateSummary>, String> {
    Ok(state.playground.lock().await.catalog().summaries())
}

pub async fn select_template(id: String, state: &AppState) -> Result<String, String> {
    state
        .playground
        .lock()
        .await
        .select_template(&id)
        .map_err(|e| e.to_string())?;
    Ok(format!("Template {} loaded", id))
}

pub async fn update_source(
    file: String,
    content: String,
    state: &AppState,
) -> Result<String, String> {
    let kind: FileKind = file.parse()?;
    state.playground.lock().await.edit(kind, content);
    Ok(format!("{} updated", kind))
}

pub async fn render_preview(state: &AppState) -> Result<PreviewDocument, String> {
    state
        .playground
        .lock()
        .await
        .flush_preview()
        .await
        .map_err(|e| e.to_string())
}

/* ---------- 2.  ASSISTANT ---------- */

pub async fn analyze_code(state: &AppState) -> Result<PanelView, String> {
    // 1. Start under the lock
    let pending = state
        .playground
        .lock()
        .await
        .begin_analysis()
        .ok_or_else(|| "Analysis already in progress".to_string())?;

    // 2. Talk to the service with the session unlocked
    let (request_id, batch) = pending.run().await;

    // 3. Store the result unless a newer request replaced it; `pending` stays
    // alive until here so the request is not mistaken for abandoned
    let mut playground = state.playground.lock().await;
    playground.finish_analysis(request_id, batch);
    drop(pending);
    Ok(playground.panel().view())
}

pub async fn assistant_view(state: &AppState) -> Result<PanelView, String> {
    let mut playground = state.playground.lock().await;
    playground.settle_abandoned_analysis();
    Ok(playground.panel().view())
}

pub async fn apply_suggestion(index: usize, state: &AppState) -> Result<String, String> {
    let kind = state
        .playground
        .lock()
        .await
        .apply_at(index)
        .map_err(|e| e.to_string())?;
    Ok(format!("Suggestion applied to {}", kind))
}

pub async fn close_assistant(state: &AppState) -> Result<String, String> {
    state.playground.lock().await.close_assistant();
    Ok("Assistant closed".to_string())
}

pub async fn submit_prompt(prompt: String, state: &AppState) -> Result<String, String> {
    if state.playground.lock().await.submit_prompt(&prompt) {
        Ok("Prompt received".to_string())
    } else {
        Err("Prompt is empty".to_string())
    }
}
