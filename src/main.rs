use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use tracing::{error, info};

use keyway::app::App;
use keyway::bus::Bus;
use keyway::capture::DemoSource;
use keyway::config::{Config, LayoutName};
use keyway::event::EventHandler;
use keyway::host::TerminalHost;
use keyway::logging;
use keyway::overlay::OverlayThread;
use keyway::overlay::layout::LayoutStrategy;
use keyway::overlay::widget::OverlayPanel;
use keyway::ui::components::settings_panel::SettingsPanel;
use keyway::ui::layout::{AppLayout, centered_rect};
use keyway::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "keyway", version, about = "Terminal keystroke visualizer")]
struct Cli {
    #[arg(short, long, value_enum, help = "Overlay layout strategy")]
    layout: Option<LayoutName>,

    #[arg(long, help = "Groups per row for the wrap-grid layout")]
    wrap_columns: Option<u16>,

    #[arg(long, help = "Event poll interval in milliseconds")]
    tick_ms: Option<u64>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Write logs to this file")]
    log_file: Option<PathBuf>,

    #[arg(long, help = "Verbose logging (honours RUST_LOG)")]
    debug: bool,

    #[arg(long, help = "Feed the overlay synthetic keystrokes")]
    demo: bool,

    #[arg(long, help = "Seed for --demo")]
    seed: Option<u64>,

    #[arg(short, long, help = "Config file (default: <config_dir>/keyway/config.toml)")]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(columns) = self.wrap_columns {
            config.wrap_columns = columns;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(theme) = &self.theme {
            config.theme = Some(theme.clone());
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        if self.debug {
            config.debug = true;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    logging::init(config.debug, config.log_file.as_deref());

    let theme = config
        .theme
        .as_deref()
        .and_then(Theme::load)
        .unwrap_or_default();
    let layout = config.layout_strategy();
    let demo = cli.demo.then(|| DemoSource::new(cli.seed));

    let bus = Bus::new();
    let host = TerminalHost::new(config.cell_metrics());
    let mut app = App::new(bus.clone(), host.clone(), theme, demo);

    // settings must be listening before the overlay asks for a snapshot
    app.start();
    let overlay = OverlayThread::spawn(bus, host, layout, config.tick())?;
    info!(layout = layout.name(), "keyway started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(config.tick());

    let result = run_app(&mut terminal, &mut app, &events, layout);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = overlay.shutdown() {
        error!(error = %err, "overlay did not shut down cleanly");
    }
    app.stop();

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    layout: LayoutStrategy,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app, layout))?;

        let event = events.next()?;
        app.handle_event(event, Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App, layout: LayoutStrategy) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let app_layout = AppLayout::new(area);

    let size = app
        .host
        .size()
        .map(|s| format!("{}x{}px", s.width, s.height))
        .unwrap_or_else(|| "waiting".to_string());
    let header = Paragraph::new(Line::from(Span::styled(
        format!(
            " keyway | layout {} | {} groups | overlay {}",
            layout.name(),
            app.capture.frame().group_count(),
            size,
        ),
        Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    let panel_area = centered_rect(70, 100, app_layout.main);
    frame.render_widget(
        SettingsPanel::new(app.settings.state(), &app.form, &app.theme),
        panel_area,
    );

    let timeout = Duration::from_millis(u64::from(app.capture.behavior().timeout_ms));
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" frame clears after {}ms idle | Ctrl+C quits", timeout.as_millis()),
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(footer, app_layout.footer);

    if let (Some(view), Some(rect)) = (app.host.view(), app.host.placement(area)) {
        frame.render_widget(Clear, rect);
        frame.render_widget(OverlayPanel::new(&view, colors.bg), rect);
    }
}
