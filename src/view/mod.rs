//! Declarative description of the gallery.
//!
//! [`build_view`] maps an [`AppState`] to a [`ViewTree`] without side effects;
//! renderers in [`crate::output`] turn the tree into bytes.

use serde::Serialize;

use crate::model::CertificateRecord;
use crate::prefs::Theme;
use crate::state::{AppState, LoadPhase};
use crate::transform::{self, collate, dates, SortKey};

pub const PLACEHOLDER_GLYPH: &str = "bi-file-earmark-pdf-fill";
pub const VIEW_CERTIFICATE_LABEL: &str = "Ver certificado";
pub const EMPTY_MESSAGE: &str = "No hay certificados disponibles";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewTree {
    pub theme: Theme,
    pub body: ViewBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewBody {
    Loading,
    Error { message: String },
    Empty { message: String },
    Gallery(GalleryView),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    pub total: usize,
    pub sort_controls: Vec<SortControl>,
    pub toggle_label: String,
    pub all_expanded: bool,
    pub sections: Vec<SectionView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortControl {
    pub key: SortKey,
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub open: bool,
    pub cards: Vec<CardView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub title: String,
    pub institution: String,
    pub date_label: String,
    pub image: ImageView,
    pub link: String,
    pub sort_keys: CardSortKeys,
}

/// Values a page can re-sort cards by without the host.
///
/// `date` is the parsed instant in epoch milliseconds. The ranks are
/// positions in collation order; equal strings share a rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CardSortKeys {
    pub date: Option<i64>,
    pub institution: usize,
    pub title: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageView {
    Image { src: String, alt: String },
    Placeholder { glyph: String },
}

impl ImageView {
    pub fn placeholder() -> Self {
        Self::Placeholder {
            glyph: PLACEHOLDER_GLYPH.to_string(),
        }
    }
}

struct CollationRanks<'a> {
    institutions: Vec<&'a str>,
    titles: Vec<&'a str>,
}

fn distinct_in_collation_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut ordered: Vec<&str> = values.collect();
    ordered.sort_by(|a, b| collate::compare(a, b));
    ordered.dedup();
    ordered
}

fn rank_of(ordered: &[&str], value: &str) -> usize {
    ordered
        .binary_search_by(|candidate| collate::compare(candidate, value))
        .unwrap_or_else(|i| i)
}

impl<'a> CollationRanks<'a> {
    fn new(records: &'a [CertificateRecord]) -> Self {
        Self {
            institutions: distinct_in_collation_order(records.iter().map(|r| r.institution.as_str())),
            titles: distinct_in_collation_order(records.iter().map(|r| r.title.as_str())),
        }
    }

    fn keys_for(&self, record: &CertificateRecord) -> CardSortKeys {
        CardSortKeys {
            date: record
                .date_text()
                .and_then(dates::parse_date)
                .map(|d| d.instant.timestamp_millis()),
            institution: rank_of(&self.institutions, &record.institution),
            title: rank_of(&self.titles, &record.title),
        }
    }
}

fn card(record: &CertificateRecord, ranks: &CollationRanks<'_>) -> CardView {
    let image = match record.image() {
        Some(src) => ImageView::Image {
            src: src.to_string(),
            alt: record.title.clone(),
        },
        None => ImageView::placeholder(),
    };
    CardView {
        title: record.title.clone(),
        institution: record.institution.clone(),
        date_label: dates::date_label(record.date_text()),
        image,
        link: record.link_url.clone(),
        sort_keys: ranks.keys_for(record),
    }
}

fn gallery(state: &AppState) -> GalleryView {
    let ranks = CollationRanks::new(&state.records);
    let sections = transform::grouped_for_display(&state.records)
        .into_iter()
        .enumerate()
        .map(|(index, group)| SectionView {
            id: format!("category-{index}"),
            name: group.name.to_string(),
            count: group.records.len(),
            open: state.expansion.is_open(index),
            cards: group
                .records
                .into_iter()
                .map(|record| card(record, &ranks))
                .collect(),
        })
        .collect();

    GalleryView {
        total: state.records.len(),
        sort_controls: SortKey::ALL
            .iter()
            .map(|key| SortControl {
                key: *key,
                label: key.label().to_string(),
                active: *key == state.sort_key,
            })
            .collect(),
        toggle_label: state.expansion.toggle_label().to_string(),
        all_expanded: state.expansion == crate::state::Expansion::AllExpanded,
        sections,
    }
}

/// Builds the full view for `state`. Same state, same tree.
pub fn build_view(state: &AppState) -> ViewTree {
    let body = match &state.phase {
        LoadPhase::Loading => ViewBody::Loading,
        LoadPhase::Failed(message) => ViewBody::Error {
            message: message.clone(),
        },
        LoadPhase::Empty => ViewBody::Empty {
            message: EMPTY_MESSAGE.to_string(),
        },
        LoadPhase::Loaded => ViewBody::Gallery(gallery(state)),
    };
    ViewTree {
        theme: state.theme,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Expansion;

    fn record(title: &str, category: &str, image: Option<&str>) -> CertificateRecord {
        CertificateRecord {
            title: title.to_string(),
            institution: "Inst".to_string(),
            date: Some("2024-06-15".to_string()),
            category: Some(category.to_string()),
            image_url: image.map(str::to_string),
            link_url: format!("https://example.com/{title}"),
        }
    }

    fn loaded(records: Vec<CertificateRecord>) -> AppState {
        AppState {
            phase: LoadPhase::Loaded,
            records,
            ..AppState::default()
        }
    }

    fn gallery_of(tree: &ViewTree) -> &GalleryView {
        match &tree.body {
            ViewBody::Gallery(g) => g,
            other => panic!("expected gallery, got {other:?}"),
        }
    }

    #[test]
    fn only_first_section_open_by_default() {
        let state = loaded(vec![
            record("a", "Security", None),
            record("b", "AI", None),
            record("c", "Cloud", None),
        ]);
        let tree = build_view(&state);
        let g = gallery_of(&tree);
        let names: Vec<_> = g.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["AI", "Cloud", "Security"]);
        let open: Vec<_> = g.sections.iter().map(|s| s.open).collect();
        assert_eq!(open, [true, false, false]);
        assert_eq!(g.toggle_label, "Ver Todos");
        assert_eq!(g.sections[2].id, "category-2");
    }

    #[test]
    fn all_sections_open_when_expanded() {
        let mut state = loaded(vec![record("a", "X", None), record("b", "Y", None)]);
        state.expansion = Expansion::AllExpanded;
        let tree = build_view(&state);
        let g = gallery_of(&tree);
        assert!(g.sections.iter().all(|s| s.open));
        assert_eq!(g.toggle_label, "Contraer Todos");
    }

    #[test]
    fn missing_image_renders_placeholder() {
        let state = loaded(vec![record("a", "X", None), record("b", "X", Some(""))]);
        let tree = build_view(&state);
        let g = gallery_of(&tree);
        assert!(g.sections[0]
            .cards
            .iter()
            .all(|c| c.image == ImageView::placeholder()));
    }

    #[test]
    fn card_carries_formatted_date_and_link() {
        let state = loaded(vec![record("a", "X", Some("img/a.png"))]);
        let tree = build_view(&state);
        let card = &gallery_of(&tree).sections[0].cards[0];
        assert_eq!(card.date_label, "15 de junio de 2024");
        assert_eq!(card.link, "https://example.com/a");
        assert_eq!(
            card.image,
            ImageView::Image {
                src: "img/a.png".to_string(),
                alt: "a".to_string()
            }
        );
    }

    #[test]
    fn cards_carry_page_sort_keys() {
        let mut older = record("Zeta", "X", None);
        older.institution = "Ávila".to_string();
        older.date = Some("2020-01-01".to_string());
        let mut undated = record("alfa", "X", None);
        undated.institution = "Bilbao".to_string();
        undated.date = None;
        let mut twin = record("Beta", "X", None);
        twin.institution = "Bilbao".to_string();

        let tree = build_view(&loaded(vec![older, undated, twin]));
        let keys: Vec<_> = gallery_of(&tree).sections[0]
            .cards
            .iter()
            .map(|c| c.sort_keys)
            .collect();

        assert_eq!(keys[0].date, Some(1_577_836_800_000));
        assert_eq!(keys[1].date, None);
        assert_eq!(keys[0].institution, 0);
        assert_eq!(keys[1].institution, keys[2].institution);
        let titles: Vec<_> = keys.iter().map(|k| k.title).collect();
        assert_eq!(titles, [2, 0, 1]);
    }

    #[test]
    fn exactly_one_sort_control_active() {
        let mut state = loaded(vec![record("a", "X", None)]);
        state.sort_key = SortKey::Title;
        let tree = build_view(&state);
        let active: Vec<_> = gallery_of(&tree)
            .sort_controls
            .iter()
            .filter(|c| c.active)
            .map(|c| c.key)
            .collect();
        assert_eq!(active, [SortKey::Title]);
    }

    #[test]
    fn phases_map_to_bodies() {
        assert_eq!(build_view(&AppState::default()).body, ViewBody::Loading);
        let empty = AppState {
            phase: LoadPhase::Empty,
            ..AppState::default()
        };
        assert!(matches!(build_view(&empty).body, ViewBody::Empty { .. }));
        let failed = AppState {
            phase: LoadPhase::Failed("boom".to_string()),
            ..AppState::default()
        };
        assert_eq!(
            build_view(&failed).body,
            ViewBody::Error {
                message: "boom".to_string()
            }
        );
    }
}
