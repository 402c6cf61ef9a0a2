//! Tests for CatalogService and CatalogSession against on-disk catalogs

use std::path::PathBuf;
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use breedpath::application::{
    ApplicationError, CatalogService, CatalogSession, SearchQuery,
};
use breedpath::domain::{BreedingRecord, BreedingStep, CancelFlag, DomainError};
use breedpath::infrastructure::traits::RealFileSystem;
use breedpath::util::testing;

/// Helper to create a catalog file for testing
fn create_catalog(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write catalog");
    path
}

#[fixture]
fn service() -> CatalogService {
    testing::init_test_setup();
    CatalogService::new(Arc::new(RealFileSystem))
}

#[rstest]
fn given_two_step_chain_when_searching_then_returns_single_path(service: CatalogService) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nC+D=E\n");

    // Act
    let outcome = service
        .search(&path, &SearchQuery::new("A", "E").with_max_depth(5))
        .unwrap();

    // Assert
    assert_eq!(
        outcome.paths,
        vec![vec![
            BreedingStep::new("A", "B", "C"),
            BreedingStep::new("C", "D", "E"),
        ]]
    );
    assert_eq!(outcome.depth(), Some(2));
}

#[rstest]
fn given_two_recipes_for_same_child_when_searching_then_both_paths_in_file_order(
    service: CatalogService,
) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nA+D=C\nC+X=Y\n");

    // Act
    let outcome = service
        .search(&path, &SearchQuery::new("A", "Y").with_max_depth(5))
        .unwrap();

    // Assert
    assert_eq!(
        outcome.paths,
        vec![
            vec![
                BreedingStep::new("A", "B", "C"),
                BreedingStep::new("C", "X", "Y"),
            ],
            vec![
                BreedingStep::new("A", "D", "C"),
                BreedingStep::new("C", "X", "Y"),
            ],
        ]
    );
}

#[rstest]
#[case("A+B=C\nB+A=D\n")]
#[case("B+A=D\n\nA+B=C\n")]
fn given_conflicting_catalog_when_loading_then_conflicting_parentage(
    service: CatalogService,
    #[case] content: &str,
) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", content);

    let result = service.load(&path);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(
            DomainError::ConflictingParentage { .. }
        ))
    ));
}

#[rstest]
#[case("Nobody", "E")]
#[case("A", "Nobody")]
fn given_unknown_name_when_searching_then_rejected(
    service: CatalogService,
    #[case] start: &str,
    #[case] goal: &str,
) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nC+D=E\n");

    let result = service.search(&path, &SearchQuery::new(start, goal));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::UnknownEntityName(name))) if name == "Nobody"
    ));
}

#[rstest]
fn given_unreachable_goal_when_searching_then_empty_outcome_not_error(service: CatalogService) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nX+Y=Z\n");

    let outcome = service.search(&path, &SearchQuery::new("A", "Z")).unwrap();

    assert!(outcome.is_empty());
    assert_eq!(outcome.depth(), None);
}

#[rstest]
fn given_goal_beyond_max_depth_when_searching_then_empty(service: CatalogService) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nC+D=E\nE+F=G\n");

    let shallow = service
        .search(&path, &SearchQuery::new("A", "G").with_max_depth(2))
        .unwrap();
    let deep = service
        .search(&path, &SearchQuery::new("A", "G").with_max_depth(3))
        .unwrap();

    assert!(shallow.is_empty());
    assert_eq!(deep.depth(), Some(3));
}

#[rstest]
fn given_padded_query_names_when_searching_then_trimmed(service: CatalogService) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A + B = C\n");

    let outcome = service.search(&path, &SearchQuery::new(" A ", "C  ")).unwrap();

    assert_eq!(outcome.paths, vec![vec![BreedingStep::new("A", "B", "C")]]);
}

#[rstest]
fn given_malformed_lines_when_loading_then_report_lists_them(service: CatalogService) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nA+B\n\nB+A=C\n");

    let catalog = service.load(&path).unwrap();

    assert_eq!(catalog.records, vec![BreedingRecord::new("A", "B", "C")]);
    assert_eq!(catalog.report.skipped.len(), 1);
    assert_eq!(catalog.report.skipped[0].line, 2);
    assert_eq!(catalog.report.collapsed.len(), 1);
    assert_eq!(catalog.report.collapsed[0].line, 4);
}

#[rstest]
fn given_strict_service_when_loading_malformed_catalog_then_errors() {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nA+B\n");
    let service = CatalogService::new(Arc::new(RealFileSystem)).with_strict(true);

    let result = service.load(&path);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MalformedLine { line: 2, .. }))
    ));
}

#[rstest]
fn given_missing_catalog_when_loading_then_not_found(service: CatalogService) {
    let temp = TempDir::new().unwrap();

    let result = service.load(&temp.path().join("nope.txt"));

    assert!(matches!(result, Err(ApplicationError::CatalogNotFound(_))));
}

#[rstest]
fn given_new_formula_when_appending_then_file_and_catalog_updated(service: CatalogService) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C");
    let record = service.formula("C", "D", "E").unwrap();

    // Act
    let catalog = service.append(&path, &record).unwrap();

    // Assert
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "A+B=C\nC+D=E");
    assert_eq!(catalog.records.len(), 2);
    let outcome = service.search(&path, &SearchQuery::new("A", "E")).unwrap();
    assert_eq!(outcome.depth(), Some(2));
}

#[rstest]
fn given_conflicting_formula_when_appending_then_line_stays_and_loads_fail(
    service: CatalogService,
) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\n");

    let result = service.append(&path, &BreedingRecord::new("B", "A", "D"));

    assert!(result.is_err());
    assert!(std::fs::read_to_string(&path).unwrap().ends_with("\nB+A=D"));
    assert!(service.load(&path).is_err());
}

#[rstest]
fn given_session_when_reload_fails_then_keeps_previous_graph(service: CatalogService) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\n");
    let mut session = CatalogSession::open(&service, &path).unwrap();

    std::fs::remove_file(&path).unwrap();
    let result = session.reload(&service);

    assert!(matches!(result, Err(ApplicationError::CatalogNotFound(_))));
    let current = session.current().expect("previous catalog kept");
    assert!(current.graph.contains("C"));
}

#[rstest]
fn given_cancelled_flag_when_searching_loaded_catalog_then_cancelled(service: CatalogService) {
    let temp = TempDir::new().unwrap();
    let path = create_catalog(&temp, "catalog.txt", "A+B=C\nC+D=E\n");
    let catalog = service.load(&path).unwrap();
    let flag = CancelFlag::new();
    flag.cancel();

    let result = service.search_in(&catalog, &SearchQuery::new("A", "E"), Some(flag));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::SearchCancelled { .. }))
    ));
}
