use tracing::{debug, error, info};

use crate::loader::LoadError;
use crate::model::CertificateRecord;
use crate::prefs::{self, PreferenceError, PreferenceStore, Theme};
use crate::transform::{self, SortKey};

const LOAD_ERROR_PREFIX: &str = "Error al cargar los certificados.";

/// Message shown in place of the gallery when the document cannot be loaded.
pub fn load_error_message(source_name: Option<&str>) -> String {
    match source_name {
        Some(name) => format!(
            "{LOAD_ERROR_PREFIX} Por favor, verifica que '{name}' exista y sea accesible."
        ),
        None => LOAD_ERROR_PREFIX.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Loaded,
    Empty,
    Failed(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Expansion {
    #[default]
    AllCollapsedExceptFirst,
    AllExpanded,
}

impl Expansion {
    pub fn toggled(self) -> Self {
        match self {
            Self::AllCollapsedExceptFirst => Self::AllExpanded,
            Self::AllExpanded => Self::AllCollapsedExceptFirst,
        }
    }

    /// Whether the section at `index` (in rendered order) is open.
    pub fn is_open(self, index: usize) -> bool {
        match self {
            Self::AllExpanded => true,
            Self::AllCollapsedExceptFirst => index == 0,
        }
    }

    /// Label of the expand/collapse-all control.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::AllExpanded => "Contraer Todos",
            Self::AllCollapsedExceptFirst => "Ver Todos",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub phase: LoadPhase,
    pub records: Vec<CertificateRecord>,
    pub sort_key: SortKey,
    pub expansion: Expansion,
    pub theme: Theme,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Loading,
            records: Vec::new(),
            sort_key: SortKey::Date,
            expansion: Expansion::AllCollapsedExceptFirst,
            theme: Theme::Light,
        }
    }
}

/// Single owner and writer of [`AppState`].
///
/// Every mutating call returns whether the visible output changed, so the
/// host knows when to rebuild the view.
pub struct Controller {
    state: AppState,
    store: Box<dyn PreferenceStore>,
}

impl Controller {
    /// Creates a controller in the loading phase, with the theme read from
    /// `store`. An unreadable store falls back to the light theme.
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        let theme = match prefs::load_theme(store.as_ref()) {
            Ok(theme) => theme,
            Err(e) => {
                error!("{e}");
                Theme::Light
            }
        };
        Self {
            state: AppState {
                theme,
                ..AppState::default()
            },
            store,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies the outcome of the one-time load.
    pub fn finish_load(&mut self, outcome: Result<Vec<CertificateRecord>, LoadError>) {
        match outcome {
            Ok(records) if records.is_empty() => {
                info!("document contains no certificates");
                self.state.records.clear();
                self.state.phase = LoadPhase::Empty;
            }
            Ok(mut records) => {
                transform::sort_records(&mut records, self.state.sort_key);
                info!(count = records.len(), "certificates loaded");
                self.state.records = records;
                self.state.phase = LoadPhase::Loaded;
            }
            Err(e) => {
                error!("Error al cargar certificados: {e}");
                self.state.records.clear();
                self.state.phase = LoadPhase::Failed(load_error_message(e.source_name()));
            }
        }
    }

    /// Re-sorts the whole collection by `key`. Selecting the active key is a
    /// no-op and returns `false`.
    pub fn select_sort(&mut self, key: SortKey) -> bool {
        if self.state.sort_key == key {
            return false;
        }
        self.state.sort_key = key;
        transform::sort_records(&mut self.state.records, key);
        debug!(%key, "records re-sorted");
        true
    }

    pub fn toggle_expansion(&mut self) -> Expansion {
        self.state.expansion = self.state.expansion.toggled();
        debug!(expansion = ?self.state.expansion, "expansion toggled");
        self.state.expansion
    }

    /// Flips the theme and persists it. The in-session theme changes even if
    /// the store cannot be written.
    pub fn toggle_theme(&mut self) -> Result<Theme, PreferenceError> {
        self.set_theme(self.state.theme.toggled())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme, PreferenceError> {
        self.state.theme = theme;
        prefs::save_theme(self.store.as_mut(), theme)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;

    fn record(title: &str, date: &str, category: &str) -> CertificateRecord {
        CertificateRecord {
            title: title.to_string(),
            institution: format!("{title} inst"),
            date: Some(date.to_string()),
            category: Some(category.to_string()),
            image_url: None,
            link_url: String::new(),
        }
    }

    fn controller() -> Controller {
        Controller::new(Box::new(MemoryPreferenceStore::new()))
    }

    #[test]
    fn starts_loading_with_defaults() {
        let c = controller();
        assert_eq!(c.state().phase, LoadPhase::Loading);
        assert_eq!(c.state().sort_key, SortKey::Date);
        assert_eq!(c.state().expansion, Expansion::AllCollapsedExceptFirst);
    }

    #[test]
    fn reads_saved_theme() {
        let mut store = MemoryPreferenceStore::new();
        store.set(prefs::THEME_KEY, "dark").unwrap();
        let c = Controller::new(Box::new(store));
        assert_eq!(c.state().theme, Theme::Dark);
    }

    #[test]
    fn load_sorts_by_date_initially() {
        let mut c = controller();
        c.finish_load(Ok(vec![
            record("old", "2020-01-01", "A"),
            record("new", "2024-01-01", "A"),
        ]));
        assert_eq!(c.state().phase, LoadPhase::Loaded);
        assert_eq!(c.state().records[0].title, "new");
    }

    #[test]
    fn empty_load_is_not_an_error() {
        let mut c = controller();
        c.finish_load(Ok(Vec::new()));
        assert_eq!(c.state().phase, LoadPhase::Empty);
    }

    #[test]
    fn selecting_active_key_is_noop() {
        let mut c = controller();
        c.finish_load(Ok(vec![record("b", "2020-01-01", "A"), record("a", "2024-01-01", "A")]));
        assert!(!c.select_sort(SortKey::Date));
        assert!(c.select_sort(SortKey::Title));
        let snapshot = c.state().records.clone();
        assert!(!c.select_sort(SortKey::Title));
        assert_eq!(c.state().records, snapshot);
    }

    #[test]
    fn expansion_survives_resort() {
        let mut c = controller();
        c.finish_load(Ok(vec![record("a", "2024-01-01", "A")]));
        c.toggle_expansion();
        c.select_sort(SortKey::Institution);
        assert_eq!(c.state().expansion, Expansion::AllExpanded);
    }

    #[test]
    fn expansion_open_sections() {
        assert!(Expansion::AllCollapsedExceptFirst.is_open(0));
        assert!(!Expansion::AllCollapsedExceptFirst.is_open(1));
        assert!(Expansion::AllExpanded.is_open(7));
    }

    #[test]
    fn failed_load_names_the_requested_source() {
        let mut c = controller();
        c.finish_load(Ok(vec![record("a", "2024-01-01", "A")]));
        let err = crate::loader::parse_records("https://example.com/certs.json", b"{").unwrap_err();
        c.finish_load(Err(err));

        assert!(c.state().records.is_empty());
        let LoadPhase::Failed(message) = &c.state().phase else {
            panic!("expected failed phase");
        };
        assert!(message.starts_with("Error al cargar los certificados."));
        assert!(message.contains("'https://example.com/certs.json'"));
        assert!(!message.contains("data/certificados.json"));
    }

    #[test]
    fn theme_toggle_flips() {
        let mut c = controller();
        assert_eq!(c.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(c.toggle_theme().unwrap(), Theme::Light);
    }
}
