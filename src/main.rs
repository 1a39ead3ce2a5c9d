use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quizr::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, ExpiryPolicy, FileConfigStore},
    loader::HttpQuizLoader,
    logging,
    runtime::{spawn_terminal_reader, ChannelEventSource, FixedTicker, Runner},
    ui::screen::draw,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::{mpsc, Arc},
    time::Duration,
};
use tracing::{error, info};

const POLL_INTERVAL_MS: u64 = 250;

/// take a timed multiple-choice quiz in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Fetches a quiz set from the quiz service and walks through it one timed question at a time, then shows your score."
)]
pub struct Cli {
    /// quiz set to open right away; without it a menu of quiz sets is shown
    quiz_set: Option<String>,

    /// quiz service endpoint; the quiz set name is appended as a path segment
    #[clap(short = 'u', long)]
    base_url: Option<String>,

    /// seconds allowed per question
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    seconds: Option<u32>,

    /// what to do when a question's time runs out
    #[clap(long, value_enum)]
    on_expiry: Option<ExpiryPolicy>,

    /// add a quiz set to the menu (repeatable)
    #[clap(short = 'c', long = "card")]
    cards: Vec<String>,

    /// request timeout in seconds
    #[clap(long)]
    timeout: Option<u64>,

    /// write debug output to the log file
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.seconds {
            config.seconds_per_question = secs;
        }
        if let Some(policy) = self.on_expiry {
            config.on_expiry = policy;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        config.quiz_sets.extend(self.cards.iter().cloned());
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        // the quiz runs without a log
        if let Err(e) = logging::init(&log_path, cli.verbose) {
            eprintln!("quizr: logging disabled ({}): {e}", log_path.display());
        }
    }

    let config = cli.apply(FileConfigStore::new().load());
    if cli.quiz_set.is_none() && config.quiz_sets.is_empty() {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "no quiz set given and none configured; pass QUIZ_SET or --card",
        )
        .exit();
    }

    let loader = match HttpQuizLoader::new(&config.base_url, config.request_timeout()) {
        Ok(loader) => loader,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };

    info!(base_url = %config.base_url, "starting");

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(config, Arc::new(loader), tx.clone());
    if let Some(quiz_set) = &cli.quiz_set {
        app.open_quiz_set(quiz_set);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    spawn_terminal_reader(tx);
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(POLL_INTERVAL_MS)),
    );
    let result = run(&mut terminal, &mut app, &runner);

    // tear down timers and in-flight loads before giving the terminal back
    app.close_session();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }
    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<ChannelEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| draw(app, f))?;

    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        let size = terminal.size()?;
        let viewport = Rect::new(0, 0, size.width, size.height);
        if app.handle_event(event, viewport) == Control::Quit {
            break;
        }

        terminal.draw(|f| draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["quizr"]);

        assert_eq!(cli.quiz_set, None);
        assert_eq!(cli.base_url, None);
        assert_eq!(cli.seconds, None);
        assert_eq!(cli.on_expiry, None);
        assert!(cli.cards.is_empty());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_quiz_set_positional() {
        let cli = Cli::parse_from(["quizr", "geography"]);
        assert_eq!(cli.quiz_set, Some("geography".to_string()));
    }

    #[test]
    fn test_cli_seconds() {
        let cli = Cli::parse_from(["quizr", "-s", "30"]);
        assert_eq!(cli.seconds, Some(30));

        let cli = Cli::parse_from(["quizr", "--seconds", "90"]);
        assert_eq!(cli.seconds, Some(90));

        assert!(Cli::try_parse_from(["quizr", "-s", "0"]).is_err());
    }

    #[test]
    fn test_cli_on_expiry() {
        let cli = Cli::parse_from(["quizr", "--on-expiry", "lock"]);
        assert_eq!(cli.on_expiry, Some(ExpiryPolicy::Lock));

        let cli = Cli::parse_from(["quizr", "--on-expiry", "advance"]);
        assert_eq!(cli.on_expiry, Some(ExpiryPolicy::Advance));

        assert!(Cli::try_parse_from(["quizr", "--on-expiry", "skip"]).is_err());
    }

    #[test]
    fn test_cli_repeated_cards() {
        let cli = Cli::parse_from(["quizr", "-c", "geo", "--card", "rust"]);
        assert_eq!(cli.cards, vec!["geo".to_string(), "rust".to_string()]);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "quizr",
            "-u",
            "http://quiz.local/sets",
            "-s",
            "20",
            "--on-expiry",
            "lock",
            "--timeout",
            "3",
            "-c",
            "extra",
        ]);
        let base = Config {
            quiz_sets: vec!["stored".into()],
            ..Config::default()
        };

        let config = cli.apply(base);

        assert_eq!(config.base_url, "http://quiz.local/sets");
        assert_eq!(config.seconds_per_question, 20);
        assert_eq!(config.on_expiry, ExpiryPolicy::Lock);
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.quiz_sets, vec!["stored".to_string(), "extra".to_string()]);
    }

    #[test]
    fn test_cli_without_overrides_keeps_config() {
        let cli = Cli::parse_from(["quizr"]);
        let stored = Config {
            seconds_per_question: 45,
            ..Config::default()
        };
        assert_eq!(cli.apply(stored.clone()), stored);
    }
}
