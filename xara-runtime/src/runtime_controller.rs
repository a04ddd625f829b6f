use std::sync::Arc;

use xara_core::config::WidgetConfig;
use xara_engine::controller::WidgetController;
use xara_engine::traits::SpeechRecognizer;

use crate::agent::HttpAgent;

/// Build a widget controller talking to the configured agent over HTTP.
///
/// `speech` is optional; without it the voice control stays disabled.
pub fn build_controller_from_config(
    cfg: WidgetConfig,
    speech: Option<Arc<dyn SpeechRecognizer>>,
) -> anyhow::Result<WidgetController> {
    let agent = Arc::new(HttpAgent::new(&cfg.agent)?);
    log::info!(
        "agent at {}",
        if agent.base_url().is_empty() {
            "<same origin>"
        } else {
            agent.base_url()
        }
    );

    let ctrl = WidgetController::new(cfg, agent);
    Ok(match speech {
        Some(rec) => ctrl.with_speech(rec),
        None => ctrl,
    })
}
