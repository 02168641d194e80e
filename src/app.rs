use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, parse_key};
use crate::system::collector::Collector;
use crate::system::platform;
use crate::system::sampler::{Sampler, TickReport};
use crate::system::source::{CounterSource, ProcFs};
use crate::ui::theme::{ColorSupport, HeatOverrides, Theme, resolve_color_support};

/// Rows moved by PageUp/PageDown before the first frame reports the table height.
const DEFAULT_PAGE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub help: KeyCode,
    pub refresh: KeyCode,
    pub cycle_theme: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
        }
    }

    /// Returns (key_label, description) pairs for all keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.help), "Toggle help"),
            (key_label(self.refresh), "Sample now"),
            (key_label(self.cycle_theme), "Cycle theme"),
            ("↑↓".to_string(), "Scroll processes"),
            ("PgUp/PgDn".to_string(), "Scroll one page"),
            ("Home".to_string(), "Back to top"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub collector: Collector<Box<dyn CounterSource>>,
    pub sampler: Sampler,
    pub report: Option<TickReport>,
    pub cpu_model: String,
    pub input_mode: InputMode,
    pub scroll: usize,
    pub table_rows: u16,
    pub theme: Theme,
    pub color_support: ColorSupport,
    pub status_message: Option<(String, Instant)>,
    pub keybinds: ResolvedKeybinds,
    heat_overrides: HeatOverrides,
    page_size_kb: f64,
    max_rows: usize,
}

impl App {
    pub fn new(config: Config) -> Self {
        let source: Box<dyn CounterSource> = Box::new(ProcFs::new(&config.general.proc_root));
        Self::with_collector(config, Collector::new(source))
    }

    pub fn with_collector(config: Config, collector: Collector<Box<dyn CounterSource>>) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        let heat_overrides = HeatOverrides::from_config(&config.colors);
        let theme = Theme::from_config(&config.colors.theme, &heat_overrides, color_support);
        let cpu_model = collector.cpu_model();

        let mut app = App {
            running: true,
            collector,
            sampler: Sampler::Priming,
            report: None,
            cpu_model,
            input_mode: InputMode::Normal,
            scroll: 0,
            table_rows: 0,
            theme,
            color_support,
            status_message: None,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            heat_overrides,
            page_size_kb: platform::page_size_kb(),
            max_rows: config.general.max_rows,
        };
        app.refresh_data();
        app
    }

    /// Run one sampling tick: collect, account against the previous tick, rotate.
    pub fn refresh_data(&mut self) {
        match self.collector.collect() {
            Ok(sample) => {
                let sampler = std::mem::take(&mut self.sampler);
                let (sampler, report) = sampler.advance(sample, self.page_size_kb);
                self.sampler = sampler;

                if let Some(mut report) = report {
                    if self.max_rows > 0 {
                        report.processes.truncate(self.max_rows);
                    }
                    self.report = Some(report);
                    self.clamp_scroll();
                }
            }
            Err(err) => {
                // The baseline is left untouched so the next tick diffs against it.
                tracing::error!("sampling tick failed: {err}");
                self.status_message = Some((format!("Sampling failed: {err}"), Instant::now()));
                return;
            }
        }

        // Clear expired status messages (older than 3 seconds)
        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= 3
        {
            self.status_message = None;
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Scrolling keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::ScrollUp,
            KeyCode::Down => return Action::ScrollDown,
            KeyCode::PageUp => return Action::PageUp,
            KeyCode::PageDown => return Action::PageDown,
            KeyCode::Home => return Action::ScrollTop,
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollDown => {
                self.scroll += 1;
                self.clamp_scroll();
            }
            Action::PageUp => self.scroll = self.scroll.saturating_sub(self.page_rows()),
            Action::PageDown => {
                self.scroll += self.page_rows();
                self.clamp_scroll();
            }
            Action::ScrollTop => self.scroll = 0,
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::CycleTheme => {
                self.theme = self.theme.next(&self.heat_overrides, self.color_support);
            }
            Action::Refresh => self.refresh_data(),
            Action::None => {}
        }
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    pub fn process_count(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.processes.len())
    }

    fn page_rows(&self) -> usize {
        if self.table_rows == 0 {
            DEFAULT_PAGE_ROWS
        } else {
            self.table_rows as usize
        }
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.process_count().saturating_sub(1));
    }
}
