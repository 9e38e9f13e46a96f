//! Cyber Academy: security-awareness training in the terminal
//!
//! Read the briefing, take the quiz, then work timed incident drills
//! through simulated SOC consoles.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cyber_academy::logging::init_logging;
use cyber_academy::tui::App;
use cyber_academy::{Academy, Catalog, Settings};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout, Stdout};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cyber-academy", version, about = "Gamified cybersecurity awareness trainer")]
struct Args {
    /// Settings file (YAML)
    #[arg(short, long, env = "CYBER_ACADEMY_CONFIG")]
    config: Option<PathBuf>,

    /// Content pack replacing the built-in courses (YAML)
    #[arg(long, env = "CYBER_ACADEMY_CONTENT")]
    content: Option<PathBuf>,

    /// Write logs to this file. Without it logs are discarded.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate settings and content, print a summary and exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.log_file.as_deref()).context("failed to open log file")?;

    let settings = Settings::resolve(args.config.as_deref()).context("failed to load settings")?;
    let catalog = match &args.content {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load content pack {}", path.display()))?,
        None => Catalog::builtin(),
    };
    info!(
        courses = catalog.courses.len(),
        scenarios = catalog.scenarios.len(),
        questions = catalog.quiz.len(),
        "Content ready"
    );

    if args.check {
        print_summary(&catalog, &settings);
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Academy::new(catalog, settings));
    let result = run(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  Thanks for training with Cyber Academy!               ║");
    println!("║                                                        ║");
    println!("║  Think before you click.                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    let mut last = Instant::now();
    while app.running {
        // Draw
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        // Handle input
        if !app.handle_input()? {
            break;
        }

        let now = Instant::now();
        app.on_tick(now - last);
        last = now;
    }
    Ok(())
}

fn print_summary(catalog: &Catalog, settings: &Settings) {
    println!("Cyber Academy {}", cyber_academy::VERSION);
    println!("Briefing: {}", catalog.briefing.title);
    println!("Quiz: {} questions", catalog.quiz.len());
    for course in &catalog.courses {
        println!("Course {} ({})", course.title, course.id);
        for id in &course.scenarios {
            let Ok(scenario) = catalog.scenario(id) else {
                continue;
            };
            let steps = catalog.steps_for(id).len();
            let minutes = scenario.time_limit_minutes.unwrap_or(settings.scenario_minutes);
            if steps == 0 {
                println!("  [{}] {} (reading)", scenario.priority.label(), scenario.title);
            } else {
                println!(
                    "  [{}] {} ({} steps, {} min)",
                    scenario.priority.label(),
                    scenario.title,
                    steps,
                    minutes
                );
            }
        }
    }
    println!(
        "Settle delay {} ms, tiers {}/{}, wrong tool: {:?}",
        settings.settle_delay_ms, settings.tiers.high, settings.tiers.medium, settings.wrong_tool
    );
}
