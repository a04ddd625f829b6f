use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt};
use xara_core::config::WidgetConfig;
use xara_core::feedback::QueryResolved;
use xara_core::text::render_content;
use xara_core::types::{Role, Thumb};
use xara_engine::controller::WidgetController;
use xara_engine::session::{SurveyPhase, WidgetSnapshot};
use xara_engine::testing::ScriptedRecognizer;
use xara_runtime::config_store::ConfigStore;
use xara_runtime::defaults::default_standalone_config;
use xara_runtime::runtime_controller::build_controller_from_config;

const HELP: &str = "\
commands:
  /open | /close | /refresh        show, end or replace the session
  /phone <number> [email]          identify yourself
  /suggest <n>                     click suggestion chip n
  /up <n> | /down <n>              thumbs feedback on message n
  /say <text>                      speak <text> through the simulated microphone
  /resolved yes|neutral|no         answer the survey
  /rate <1-5>                      rate the session
  /submit-feedback | /skip         send or dismiss the survey
  /help | /quit
anything else is sent as a chat message";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config() -> anyhow::Result<WidgetConfig> {
    let mut cfg = match std::env::var("XARA_CONFIG") {
        Ok(path) => ConfigStore::at_path(path).load_or_default()?,
        Err(_) => default_standalone_config(),
    };

    if let Ok(url) = std::env::var("XARA_AGENT_URL") {
        cfg.agent.base_url = Some(url);
        cfg.validate().context("XARA_AGENT_URL")?;
    }
    Ok(cfg)
}

/// Prints what changed since the last call.
#[derive(Default)]
struct Printer {
    session: Option<String>,
    shown: usize,
    last_survey_phase: Option<SurveyPhase>,
}

impl Printer {
    fn print(&mut self, snap: &WidgetSnapshot) {
        let session = snap.session_id.to_string();
        if self.session.as_deref() != Some(session.as_str()) {
            if self.session.is_some() {
                println!("-- new session --");
            }
            self.session = Some(session);
            self.shown = 0;
        }

        for (i, msg) in snap.transcript.iter().enumerate().skip(self.shown) {
            let who = match msg.role {
                Role::User => "you",
                Role::Bot => "xara",
            };
            for (n, line) in render_content(&msg.content).iter().enumerate() {
                if n == 0 {
                    println!("[{i}] {who}: {line}");
                } else {
                    println!("      {line}");
                }
            }
            if snap.thumbs_available.contains(&i) {
                println!("      (helpful? /up {i} or /down {i})");
            }
        }
        self.shown = snap.transcript.len();

        if !snap.suggestions.is_empty() {
            let chips: Vec<String> = snap
                .suggestions
                .iter()
                .enumerate()
                .map(|(n, s)| format!("[{n}] {s}"))
                .collect();
            println!("   suggestions: {}", chips.join("  "));
        }
        if snap.is_open && snap.shows_phone_form() {
            println!("   please share your phone number: /phone <number> [email]");
        }
        if snap.typing {
            println!("   xara is typing...");
        }
        if let Some(hint) = &snap.input_hint {
            println!("   mic: {}", hint.text);
        }
        if let Some(notice) = &snap.notice {
            println!("   ! {notice}");
        }

        let phase = snap.survey.as_ref().map(|s| s.phase);
        if phase != self.last_survey_phase {
            match phase {
                Some(SurveyPhase::Open) => println!(
                    "   How was your chat? /resolved yes|neutral|no, /rate 1-5, then /submit-feedback (or /skip)"
                ),
                Some(SurveyPhase::Handled) => println!("   Thank you for your feedback!"),
                _ => {}
            }
            self.last_survey_phase = phase;
        }
    }
}

fn parse_index(arg: &str) -> Option<usize> {
    arg.trim().parse().ok()
}

async fn say(ctrl: &WidgetController, rec: &ScriptedRecognizer, text: &str) -> anyhow::Result<()> {
    rec.push_utterance(text);
    ctrl.start_recording().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    ctrl.stop_recording().await;

    let grace = ctrl.config().timings.final_result_grace();
    tokio::time::sleep(grace + Duration::from_millis(100)).await;
    // The submit runs on the timer task; wait for the reply to land.
    while ctrl.snapshot().await.typing {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Ok(())
}

/// Runs one command line. Returns false on /quit.
async fn handle(
    ctrl: &WidgetController,
    rec: &ScriptedRecognizer,
    line: &str,
) -> anyhow::Result<bool> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(true);
    }
    if !line.starts_with('/') {
        ctrl.set_input(line).await;
        ctrl.submit().await?;
        return Ok(true);
    }

    let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();
    match cmd {
        "/quit" | "/exit" => return Ok(false),
        "/help" => println!("{HELP}"),
        "/open" => ctrl.open().await,
        "/close" => {
            ctrl.close().await;
            let delay = ctrl.config().timings.survey_open_delay();
            tokio::time::sleep(delay + Duration::from_millis(50)).await;
        }
        "/refresh" => ctrl.refresh_session().await,
        "/phone" => {
            let (phone, email) = arg.split_once(' ').unwrap_or((arg, ""));
            ctrl.submit_identity(phone, email).await?;
        }
        "/suggest" => {
            let n = parse_index(arg).context("usage: /suggest <n>")?;
            ctrl.select_suggestion(n).await?;
        }
        "/up" | "/down" => {
            let n = parse_index(arg).context("usage: /up <n> or /down <n>")?;
            let thumb = if cmd == "/up" { Thumb::Up } else { Thumb::Down };
            if !ctrl.thumbs(n, thumb).await {
                println!("   message {n} does not take feedback");
            }
        }
        "/say" => say(ctrl, rec, arg).await?,
        "/resolved" => {
            let resolved = match arg.to_ascii_lowercase().as_str() {
                "yes" => QueryResolved::Yes,
                "neutral" => QueryResolved::Neutral,
                "no" => QueryResolved::No,
                _ => anyhow::bail!("usage: /resolved yes|neutral|no"),
            };
            ctrl.choose_resolution(resolved).await?;
        }
        "/rate" => {
            let stars: u8 = arg.parse().context("usage: /rate <1-5>")?;
            ctrl.choose_rating(stars).await?;
        }
        "/submit-feedback" => ctrl.submit_survey().await?,
        "/skip" => ctrl.skip_survey().await?,
        other => println!("unknown command {other}; try /help"),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cfg = load_config()?;
    log::debug!("widget config: {cfg:?}");
    let rec = Arc::new(ScriptedRecognizer::new());
    let ctrl = build_controller_from_config(cfg, Some(rec.clone()))?;

    println!("{HELP}\n");
    ctrl.open().await;

    let mut printer = Printer::default();
    printer.print(&ctrl.snapshot().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        match handle(&ctrl, &rec, &line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("   ! {e:#}"),
        }
        printer.print(&ctrl.snapshot().await);
    }

    ctrl.shutdown().await;
    Ok(())
}
