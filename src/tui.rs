//! Terminal window for the extractor: a form, start/stop actions and a
//! scrolling log fed by the background job.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use lead_extractor_lib::input_loader::parse_target_count;
use lead_extractor_lib::{logger, AppPaths, JobEvent, JobHandle, JobManager, LeadRequest};
use log::{info, LevelFilter};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::error::Error;
use std::io;
use std::path::Path;
use std::time::Duration;

const LOG_FILE: &str = "lead_extractor.log";
const TICK: Duration = Duration::from_millis(100);

const TITLE: usize = 0;
const AREA: usize = 1;
const PROVIDER: usize = 2;
const COUNT: usize = 3;

struct Field {
    label: &'static str,
    value: String,
}

struct App {
    manager: JobManager,
    fields: [Field; 4],
    focus: usize,
    log: Vec<String>,
    scroll_back: usize,
    job: Option<JobHandle>,
    found: usize,
    target: usize,
    should_quit: bool,
}

impl App {
    fn new(manager: JobManager) -> Self {
        App {
            manager,
            fields: [
                Field { label: "Job Title:", value: "realtor".into() },
                Field { label: "Area/City:", value: "Phoenix".into() },
                Field { label: "Email Provider:", value: "gmail.com".into() },
                Field { label: "Number to Extract:", value: "10".into() },
            ],
            focus: TITLE,
            log: Vec::new(),
            scroll_back: 0,
            job: None,
            found: 0,
            target: 0,
            should_quit: false,
        }
    }

    fn is_running(&self) -> bool {
        self.job.is_some()
    }

    fn push_log(&mut self, message: &str) {
        for line in message.split('\n') {
            self.log.push(line.to_string());
        }
        self.scroll_back = 0;
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Enter | KeyCode::F(5) => self.start(),
            KeyCode::F(6) => self.stop(),
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % self.fields.len(),
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len()
            }
            KeyCode::PageUp => self.scroll_back = (self.scroll_back + 5).min(self.log.len()),
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(5),
            KeyCode::Backspace if !self.is_running() => {
                self.fields[self.focus].value.pop();
            }
            KeyCode::Char(c) if !self.is_running() => self.fields[self.focus].value.push(c),
            _ => {}
        }
    }

    fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.log.clear();
        self.scroll_back = 0;

        let Some(target_count) = parse_target_count(&self.fields[COUNT].value) else {
            self.push_log("Invalid input: please enter a valid number for 'Number to Extract'.");
            return;
        };

        let request = LeadRequest {
            title: self.fields[TITLE].value.trim().to_string(),
            area: self.fields[AREA].value.trim().to_string(),
            target_count,
            email_provider: self.fields[PROVIDER].value.trim().to_string(),
        };
        self.found = 0;
        self.target = target_count;
        self.job = Some(self.manager.start_job(request));
    }

    fn stop(&mut self) {
        let Some(job) = &self.job else { return };
        if job.is_stopping() {
            return;
        }
        job.stop();
        self.push_log("Stop signal sent. Finishing current task...");
    }

    /// Stops a running job and waits for it, so contacts found so far are
    /// saved before the window closes.
    fn quit(&mut self) {
        if let Some(job) = self.job.take() {
            job.stop();
            info!("Waiting for the extraction job before quitting");
            for event in job.join() {
                self.apply(event);
            }
        }
        self.should_quit = true;
    }

    /// Pulls whatever the worker sent since the last tick.
    fn pump(&mut self) {
        let Some(job) = &self.job else { return };
        let events = job.drain();
        let worker_done = job.is_finished();

        let mut finished = worker_done;
        for event in events {
            finished |= self.apply(event);
        }

        if finished {
            // Pick up anything sent between the drain and the thread exiting.
            if let Some(job) = self.job.take() {
                for event in job.join() {
                    self.apply(event);
                }
            }
        }
    }

    /// Updates the form state for one worker event. Returns true once the
    /// worker has nothing more to do.
    fn apply(&mut self, event: JobEvent) -> bool {
        match event {
            JobEvent::Log(line) => self.push_log(&line),
            JobEvent::LeadFound(_) => self.found += 1,
            JobEvent::Finished(summary) => {
                info!("Job finished: {:?}", summary);
                return true;
            }
            JobEvent::Failed(message) => {
                self.push_log(&message);
                if message.contains("config") {
                    self.push_log("Please run `lead-extractor` once to configure the API keys.");
                }
                return true;
            }
        }
        false
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    let form: Vec<Line> = app
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == app.focus && !app.is_running();
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<20}", field.label), label_style),
                Span::raw(format!("{}{}", field.value, cursor)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(form).block(
            Block::default()
                .title(" LinkedIn Lead Extractor ")
                .borders(Borders::ALL),
        ),
        chunks[0],
    );

    let height = chunks[1].height.saturating_sub(2) as usize;
    let end = app.log.len().saturating_sub(app.scroll_back);
    let start = end.saturating_sub(height);
    let lines: Vec<Line> = app.log[start..end].iter().map(|l| Line::from(l.as_str())).collect();
    let log_title = if app.is_running() {
        format!(" Log ({}/{} found) ", app.found, app.target)
    } else {
        " Log ".to_string()
    };
    f.render_widget(
        Paragraph::new(lines).block(Block::default().title(log_title).borders(Borders::ALL)),
        chunks[1],
    );

    let enabled = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);
    let (start_style, stop_style) = if app.is_running() {
        (disabled, enabled)
    } else {
        (enabled, disabled)
    };
    let buttons = Line::from(vec![
        Span::styled("[F5/Enter] Start Extraction", start_style),
        Span::raw("   "),
        Span::styled("[F6] Stop", stop_style),
        Span::raw("   "),
        Span::raw("[Tab] Next field  [PgUp/PgDn] Scroll  [Esc] Quit"),
    ]);
    f.render_widget(
        Paragraph::new(buttons).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        app.pump();
        terminal.draw(|f| draw(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key);
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init_to_file(Path::new(LOG_FILE), LevelFilter::Info)?;
    let mut app = App::new(JobManager::new(AppPaths::from_env()));

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map_err(Into::into)
}
