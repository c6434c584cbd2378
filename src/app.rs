use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::action::Action;
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::{MetricsSource, ProcessEntry, process::filter_entries};
use crate::ui::theme::Theme;
use crate::watch::{Interval, RefreshEvent, SessionState, Watcher};

const STATUS_TTL_SECS: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Picker,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub pick: KeyCode,
    pub export: KeyCode,
    pub cycle_theme: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            pick: parse_key(&kb.pick).unwrap_or(KeyCode::Char('o')),
            export: parse_key(&kb.export).unwrap_or(KeyCode::Char('e')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.pick), "Choose process"),
            (key_label(self.export), "Export CSV"),
            (key_label(self.cycle_theme), "Cycle theme"),
            (key_label(self.help), "Toggle help"),
            ("Tab".to_string(), "Picker: cycle interval"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        _ => "?".to_string(),
    }
}

/// Process picker state: a filtered process list plus the interval to use.
#[derive(Debug, Clone, Default)]
pub struct Picker {
    pub entries: Vec<ProcessEntry>,
    pub filter: String,
    pub selected: usize,
    pub interval_index: usize,
}

impl Picker {
    pub fn visible(&self) -> Vec<&ProcessEntry> {
        filter_entries(&self.entries, &self.filter)
    }

    pub fn selected_entry(&self) -> Option<&ProcessEntry> {
        self.visible().get(self.selected).copied()
    }

    pub fn interval(&self) -> Interval {
        Interval::PRESETS[self.interval_index % Interval::PRESETS.len()]
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }
}

pub struct App {
    pub running: bool,
    pub watcher: Watcher,
    source: Arc<dyn MetricsSource>,
    pub input_mode: InputMode,
    pub picker: Picker,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    pub export_dir: PathBuf,
    /// Interval used by `Action::Watch`, e.g. from the command line.
    pub default_interval: Interval,
    pub status_message: Option<StatusMessage>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

impl App {
    pub fn new(
        config: &Config,
        watcher: Watcher,
        source: Arc<dyn MetricsSource>,
        export_dir: PathBuf,
        default_interval: Interval,
    ) -> Self {
        let picker = Picker {
            interval_index: default_interval.preset_index().unwrap_or(0),
            ..Picker::default()
        };
        App {
            running: true,
            watcher,
            source,
            input_mode: InputMode::Normal,
            picker,
            theme: Theme::from_config(&config.colors.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            export_dir,
            default_interval,
            status_message: None,
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Picker => self.map_key_picker(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.pick {
            return Action::OpenPicker;
        }
        if code == kb.export {
            return Action::Export;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_picker(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClosePicker,
            KeyCode::Enter => Action::PickerConfirm,
            KeyCode::Tab => Action::PickerCycleInterval,
            KeyCode::Up => Action::PickerMove(-1),
            KeyCode::Down => Action::PickerMove(1),
            KeyCode::PageUp => Action::PickerMove(-10),
            KeyCode::PageDown => Action::PickerMove(10),
            KeyCode::Backspace => {
                let mut text = self.picker.filter.clone();
                text.pop();
                Action::UpdateFilter(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.picker.filter.clone();
                text.push(c);
                Action::UpdateFilter(text)
            }
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Watch(pid) => {
                self.watch(pid, self.default_interval);
            }
            Action::OpenPicker => {
                self.picker.entries = self.source.list_processes();
                self.picker.filter.clear();
                self.picker.selected = 0;
                self.input_mode = InputMode::Picker;
            }
            Action::ClosePicker => self.input_mode = InputMode::Normal,
            Action::PickerMove(delta) => self.picker.move_selection(delta),
            Action::PickerCycleInterval => {
                self.picker.interval_index =
                    (self.picker.interval_index + 1) % Interval::PRESETS.len();
            }
            Action::UpdateFilter(text) => {
                self.picker.filter = text;
                self.picker.selected = 0;
            }
            Action::PickerConfirm => {
                let Some(pid) = self.picker.selected_entry().map(|e| e.pid) else {
                    return;
                };
                if self.watch(pid, self.picker.interval()) {
                    self.input_mode = InputMode::Normal;
                }
            }
            Action::Export => self.export(),
            Action::CycleTheme => self.theme = self.theme.next(),
            Action::ToggleHelp => {
                self.input_mode = match self.input_mode {
                    InputMode::Help => InputMode::Normal,
                    _ => InputMode::Help,
                };
            }
            Action::Sampler(event) => self.on_sampler_event(event),
            Action::None => {}
        }
    }

    /// Clears status messages older than a few seconds.
    pub fn on_tick(&mut self) {
        if let Some(msg) = &self.status_message
            && msg.created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    /// `"<name> [<pid>] (T=<interval>)"` for the active session.
    pub fn session_title(&self) -> Option<String> {
        self.watcher
            .session_info()
            .map(|s| format!("{} [{}] (T={})", s.name, s.pid, s.interval))
    }

    fn watch(&mut self, pid: u32, interval: Interval) -> bool {
        match self.watcher.retarget(pid, interval) {
            Ok(info) => {
                self.set_status(
                    format!("Watching {} [{}] every {}", info.name, info.pid, info.interval),
                    false,
                );
                true
            }
            Err(err) => {
                warn!(pid, error = %err, "retarget failed");
                self.set_status(err.to_string(), true);
                false
            }
        }
    }

    fn export(&mut self) {
        match self.watcher.export_to(&self.export_dir) {
            Ok(name) => self.set_status(format!("Created file {name}"), false),
            Err(err) => {
                warn!(error = %err, "export failed");
                self.set_status(format!("Export failed: {err}"), true);
            }
        }
    }

    fn on_sampler_event(&mut self, event: RefreshEvent) {
        let RefreshEvent::Finished { session, state } = event else {
            return;
        };
        let Some(info) = self.watcher.session_info() else {
            return;
        };
        if info.id == session && state != SessionState::Cancelled {
            self.set_status(
                format!("{} [{}]: {}", info.name, info.pid, state.label()),
                true,
            );
        }
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text,
            is_error,
            created: Instant::now(),
        });
    }
}
