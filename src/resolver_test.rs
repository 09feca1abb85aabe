// Unit tests for fallback-chain resolution

use super::*;
use crate::fake_page::{FakeElement, FakePage};
use crate::locator::LocatorCandidate;
use tempfile::TempDir;

const BUDGET: Duration = Duration::from_millis(60);

fn search_chain() -> LocatorChain {
    LocatorChain::new("search box", LocatorCandidate::css("[data-test-id='search-box-input']"))
        .then(LocatorCandidate::attribute("name", "searchBoxInput"))
        .then(LocatorCandidate::placeholder("Search|Rechercher"))
}

fn artifacts(dir: &TempDir) -> ArtifactManager {
    ArtifactManager::new(dir.path().join("screenshots"), dir.path().join("videos"))
}

#[tokio::test]
async fn test_first_visible_candidate_wins() {
    let dir = TempDir::new().unwrap();
    let artifacts = artifacts(&dir);
    let page = FakePage::new(
        "about:blank",
        vec![
            FakeElement::new("[data-test-id='search-box-input']"),
            FakeElement::new("[name='searchBoxInput']"),
        ],
    );

    let element = ElementResolver::new(&page, &artifacts)
        .resolve(&search_chain(), BUDGET)
        .await
        .unwrap();

    assert_eq!(element, 0);
    // Later candidates are never evaluated after a hit
    assert_eq!(page.located().len(), 1);
    assert_eq!(page.screenshots(), 0);
}

#[tokio::test]
async fn test_hidden_primary_falls_back_to_next_candidate() {
    let dir = TempDir::new().unwrap();
    let artifacts = artifacts(&dir);
    let page = FakePage::new(
        "about:blank",
        vec![
            FakeElement::new("[data-test-id='search-box-input']").hidden(),
            FakeElement::new("[name='searchBoxInput']"),
            FakeElement::new("[placeholder]").with_attr("placeholder", "Search"),
        ],
    );

    let element = ElementResolver::new(&page, &artifacts)
        .resolve(&search_chain(), BUDGET)
        .await
        .unwrap();

    assert_eq!(element, 1);
    assert!(
        page.located()
            .iter()
            .all(|c| *c != LocatorCandidate::placeholder("Search|Rechercher"))
    );
}

#[tokio::test]
async fn test_pattern_candidate_as_last_resort() {
    let dir = TempDir::new().unwrap();
    let artifacts = artifacts(&dir);
    let page = FakePage::new(
        "about:blank",
        vec![
            FakeElement::new("[placeholder]").with_attr("placeholder", "Email"),
            FakeElement::new("[placeholder]").with_attr("placeholder", "Rechercher des idées"),
        ],
    );

    let element = ElementResolver::new(&page, &artifacts)
        .resolve(&search_chain(), BUDGET)
        .await
        .unwrap();

    assert_eq!(element, 1);
}

#[tokio::test]
async fn test_exhausted_chain_fails_with_one_screenshot() {
    let dir = TempDir::new().unwrap();
    let artifacts = artifacts(&dir);
    let page = FakePage::new(
        "about:blank",
        vec![FakeElement::new("[data-test-id='search-box-input']").hidden()],
    );

    let err = ElementResolver::new(&page, &artifacts)
        .resolve(&search_chain(), BUDGET)
        .await
        .unwrap_err();

    match err {
        ProbeError::ElementNotFound {
            element,
            timeout_ms,
            attempted,
        } => {
            assert_eq!(element, "search box");
            assert_eq!(timeout_ms, 60);
            assert!(attempted.contains("searchBoxInput"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(page.screenshots(), 1);

    let shots: Vec<_> = std::fs::read_dir(artifacts.screenshot_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(shots.len(), 1);
    assert!(shots[0].starts_with("search_box_missing"));
}

#[tokio::test]
async fn test_screenshot_failure_does_not_mask_not_found() {
    let dir = TempDir::new().unwrap();
    let artifacts = artifacts(&dir);
    let page = FakePage::new("about:blank", vec![]).with_failing_screenshots();

    let err = ElementResolver::new(&page, &artifacts)
        .resolve(&search_chain(), BUDGET)
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::ElementNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(page.screenshots(), 1);
}

#[tokio::test]
async fn test_each_candidate_gets_its_own_budget() {
    let dir = TempDir::new().unwrap();
    let artifacts = artifacts(&dir);
    // Appears while the second candidate is being waited on
    let page = FakePage::new(
        "about:blank",
        vec![FakeElement::new("[name='searchBoxInput']").appearing_after(Duration::from_millis(90))],
    );

    let start = std::time::Instant::now();
    let element = ElementResolver::new(&page, &artifacts)
        .resolve(&search_chain(), BUDGET)
        .await
        .unwrap();

    assert_eq!(element, 0);
    assert!(start.elapsed() >= Duration::from_millis(60));
}
