use xara_core::config::WidgetConfig;

/// Agent origin used by the terminal front end when nothing else is configured.
pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000";

pub fn default_agent_url() -> String {
    DEFAULT_AGENT_URL.to_string()
}

/// Defaults for a standalone widget, which has no same-origin agent to fall back on.
pub fn default_standalone_config() -> WidgetConfig {
    let mut cfg = WidgetConfig::default();
    cfg.agent.base_url = Some(default_agent_url());
    cfg
}
