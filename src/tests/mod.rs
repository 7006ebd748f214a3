use std::collections::HashSet;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::loader::{LoadError, LoaderOptions, Source};
use crate::model::CertificateRecord;
use crate::prefs::MemoryPreferenceStore;
use crate::runner::{Options, Runner};
use crate::state::{self, AppState, Controller, Expansion, LoadPhase};
use crate::transform::{self, SortKey};
use crate::view::{self, ViewBody};

fn cert(title: &str, institution: &str, date: Option<&str>, category: &str) -> CertificateRecord {
    CertificateRecord {
        title: title.to_string(),
        institution: institution.to_string(),
        date: date.map(str::to_string),
        category: Some(category.to_string()),
        image_url: None,
        link_url: format!("https://example.com/{title}.pdf"),
    }
}

fn sample() -> Vec<CertificateRecord> {
    vec![
        cert("Ethical Hacking", "EC-Council", Some("2023-01-01"), "Security"),
        cert("Machine Learning", "Stanford", Some("2024-06-15"), "AI"),
        cert("AWS Practitioner", "Amazon", Some("2022-12-31"), "Cloud"),
        cert("Ñandú Studies", "Universidad", None, "AI"),
        cert("azure fundamentals", "Microsoft", Some("2021-03-03"), "Cloud"),
        cert("Deep Learning", "deeplearning.ai", Some("bogus"), "AI"),
    ]
}

fn gallery_state(records: Vec<CertificateRecord>) -> Controller {
    let mut controller = Controller::new(Box::new(MemoryPreferenceStore::new()));
    controller.finish_load(Ok(records));
    controller
}

#[test]
fn grouping_partitions_input_exactly() {
    let records = sample();
    let groups = transform::group_by_category(&records);

    let total: usize = groups.iter().map(|g| g.records.len()).sum();
    assert_eq!(total, records.len());

    let seen: HashSet<*const CertificateRecord> = groups
        .iter()
        .flat_map(|g| g.records.iter().map(|r| *r as *const CertificateRecord))
        .collect();
    assert_eq!(seen.len(), records.len());

    for group in &groups {
        assert!(group.records.iter().all(|r| r.category_key() == group.name));
    }
}

#[test]
fn text_sorts_are_idempotent() {
    for key in [SortKey::Institution, SortKey::Title] {
        let once = transform::sorted(&sample(), key);
        let twice = transform::sorted(&once, key);
        assert_eq!(once, twice, "sorting by {key} twice changed the order");
    }
}

#[test]
fn date_sort_orders_newest_first() {
    let records = vec![
        cert("a", "x", Some("2023-01-01"), "X"),
        cert("b", "x", Some("2024-06-15"), "X"),
        cert("c", "x", Some("2022-12-31"), "X"),
    ];
    let out = transform::sorted(&records, SortKey::Date);
    let dates: Vec<_> = out.iter().filter_map(|r| r.date.as_deref()).collect();
    assert_eq!(dates, ["2024-06-15", "2023-01-01", "2022-12-31"]);
}

#[test]
fn category_order_ignores_record_sort_key() {
    let mut controller = gallery_state(vec![
        cert("1", "x", Some("2020-01-01"), "Security"),
        cert("2", "x", Some("2021-01-01"), "AI"),
        cert("3", "x", Some("2022-01-01"), "Cloud"),
    ]);
    for key in [SortKey::Title, SortKey::Institution, SortKey::Date] {
        controller.select_sort(key);
        let tree = view::build_view(controller.state());
        let ViewBody::Gallery(gallery) = tree.body else {
            panic!("expected a gallery view");
        };
        let names: Vec<_> = gallery.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["AI", "Cloud", "Security"]);
    }
}

#[test]
fn zero_records_yield_empty_state() {
    let controller = gallery_state(Vec::new());
    let tree = view::build_view(controller.state());
    assert!(matches!(tree.body, ViewBody::Empty { .. }));
}

#[test]
fn missing_image_always_uses_placeholder() {
    let mut records = sample();
    records[0].image_url = Some(String::new());
    records[1].image_url = Some("img/ml.png".to_string());
    let controller = gallery_state(records);
    let tree = view::build_view(controller.state());
    let ViewBody::Gallery(gallery) = tree.body else {
        panic!("expected a gallery view");
    };
    for card in gallery.sections.iter().flat_map(|s| s.cards.iter()) {
        match &card.image {
            view::ImageView::Image { src, .. } => assert!(!src.trim().is_empty()),
            view::ImageView::Placeholder { glyph } => assert_eq!(glyph, view::PLACEHOLDER_GLYPH),
        }
    }
}

#[test]
fn double_toggle_restores_first_open_only() {
    let mut controller = gallery_state(sample());
    let initial = view::build_view(controller.state());

    controller.toggle_expansion();
    assert_eq!(controller.state().expansion, Expansion::AllExpanded);
    controller.toggle_expansion();

    let restored = view::build_view(controller.state());
    assert_eq!(initial, restored);
    let ViewBody::Gallery(gallery) = restored.body else {
        panic!("expected a gallery view");
    };
    let open: Vec<_> = gallery.sections.iter().map(|s| s.open).collect();
    assert_eq!(open, [true, false, false]);
}

#[test]
fn view_is_pure_for_equal_state() {
    let state = AppState {
        phase: LoadPhase::Loaded,
        records: sample(),
        ..AppState::default()
    };
    assert_eq!(view::build_view(&state), view::build_view(&state.clone()));
}

async fn failed_view_for(server: &MockServer, route: &str) -> (AppState, LoadError, String) {
    let url = format!("{}{}", server.uri(), route);
    let err = crate::loader::load(&Source::Url(url.clone()), &LoaderOptions::default())
        .await
        .unwrap_err();

    let runner = Runner::new(Options {
        source: url.clone(),
        ..Options::default()
    })
    .unwrap();
    let controller = runner
        .run(Box::new(MemoryPreferenceStore::new()))
        .await
        .unwrap();
    (controller.state().clone(), err, url)
}

#[tokio::test]
async fn fetch_and_parse_failures_share_error_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{\"titulo\": "))
        .mount(&server)
        .await;

    let (fetch_state, fetch_err, fetch_url) = failed_view_for(&server, "/missing.json").await;
    let (parse_state, parse_err, parse_url) = failed_view_for(&server, "/broken.json").await;

    assert!(matches!(fetch_err, LoadError::Status { status: 404, .. }));
    assert!(matches!(parse_err, LoadError::Parse { .. }));

    for (state, url) in [(&fetch_state, &fetch_url), (&parse_state, &parse_url)] {
        assert!(state.records.is_empty());
        assert_eq!(
            view::build_view(state).body,
            ViewBody::Error {
                message: state::load_error_message(Some(url.as_str()))
            }
        );
    }
}

#[tokio::test]
async fn loads_records_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/certificados.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[
                {"titulo":"Old","institucion":"A","fecha":"2020-01-01","categoria":"X","url":"o"},
                {"titulo":"New","institucion":"B","fecha":"2024-01-01","categoria":"X","url":"n","imagen":""}
            ]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let runner = Runner::new(Options {
        source: format!("{}/data/certificados.json", server.uri()),
        ..Options::default()
    })
    .unwrap();
    let controller = runner
        .run(Box::new(MemoryPreferenceStore::new()))
        .await
        .unwrap();

    let state = controller.state();
    assert_eq!(state.phase, LoadPhase::Loaded);
    let titles: Vec<_> = state.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["New", "Old"]);
}

#[tokio::test]
async fn empty_document_over_http_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let runner = Runner::new(Options {
        source: format!("{}/empty.json", server.uri()),
        ..Options::default()
    })
    .unwrap();
    let controller = runner
        .run(Box::new(MemoryPreferenceStore::new()))
        .await
        .unwrap();
    assert_eq!(controller.state().phase, LoadPhase::Empty);
}
