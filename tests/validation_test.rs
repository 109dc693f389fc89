//! Validation and export-gating integration tests

use meterbox::adapters::store::{DocumentStore, MemoryStore};
use meterbox::config::MeterboxConfig;
use meterbox::core::ProcessingEngine;
use meterbox::domain::{
    DeclarantInfo, Document, DocumentId, FlagCategory, FlagOrigin, FlagSeverity, ProjectId,
    ProjectSettings, ReportingPeriod, ValidationFlag,
};
use std::sync::Arc;

fn complete_settings() -> ProjectSettings {
    ProjectSettings {
        reporting_period: Some(ReportingPeriod::Q1),
        reporting_year: Some("2024".to_string()),
        declarant: Some(DeclarantInfo {
            name: Some("Acme Steel GmbH".to_string()),
            identification_number: Some("DE1234567".to_string()),
            address: Some("Industriestrasse 1".to_string()),
        }),
        ..Default::default()
    }
}

async fn seed_and_process(
    engine: &ProcessingEngine,
    store: &MemoryStore,
    project: &ProjectId,
    doc_id: &str,
) -> DocumentId {
    let document = Document::new(
        DocumentId::new(doc_id).unwrap(),
        project.clone(),
        format!("{doc_id}.pdf"),
        "bill.pdf",
        None,
    );
    let id = document.id.clone();
    store
        .insert_document(document, b"%PDF-1.4".to_vec())
        .await
        .unwrap();
    engine.process_document(&id).await.unwrap();
    id
}

#[tokio::test]
async fn test_empty_project_is_blocked() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();

    let (flags, can_export) = engine.validate_project(&project).await.unwrap();
    assert!(!can_export);

    let codes: Vec<&str> = flags.iter().map(|f| f.code).collect();
    assert!(codes.contains(&"MISSING_CONSUMPTION"));
    assert!(codes.contains(&"MISSING_DECLARANT"));
    assert!(codes.contains(&"MISSING_REPORTING_PERIOD"));
}

#[tokio::test]
async fn test_complete_project_exports() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    store
        .set_project_settings(project.clone(), complete_settings())
        .await;
    seed_and_process(&engine, &store, &project, "doc-1").await;

    let (flags, can_export) = engine.validate_project(&project).await.unwrap();
    assert!(can_export, "unexpected blocking flags: {flags:?}");
}

#[tokio::test]
async fn test_acknowledge_unblocks_export_immediately() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    store
        .set_project_settings(project.clone(), complete_settings())
        .await;

    // No documents: one blocker, missing consumption.
    let (flags, can_export) = engine.validate_project(&project).await.unwrap();
    assert!(!can_export);
    let blockers: Vec<_> = flags.iter().filter(|f| f.blocks_export()).collect();
    assert_eq!(blockers.len(), 1);

    engine
        .acknowledge_flag(&blockers[0].id, Some("entered offline".to_string()))
        .await
        .unwrap();

    let (flags, can_export) = engine.validate_project(&project).await.unwrap();
    assert!(can_export);
    let flag = flags
        .iter()
        .find(|f| f.code == "MISSING_CONSUMPTION")
        .unwrap();
    assert!(flag.is_acknowledged);
    assert!(!flag.is_resolved);
    assert_eq!(flag.resolution_note.as_deref(), Some("entered offline"));
}

#[tokio::test]
async fn test_resolve_and_acknowledge_are_independent() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();

    let (flags, _) = engine.validate_project(&project).await.unwrap();
    let blocker = flags.iter().find(|f| f.blocks_export()).unwrap();

    let resolved = engine
        .resolve_flag(&blocker.id, Some("bills uploaded".to_string()))
        .await
        .unwrap();
    assert!(resolved.is_resolved);
    assert!(!resolved.is_acknowledged);
    assert!(!resolved.blocks_export());
}

#[tokio::test]
async fn test_document_flags_survive_project_revalidation() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    store
        .set_project_settings(project.clone(), complete_settings())
        .await;
    // Stub extraction is complete, so the pipeline's document-level run
    // produces no flags; project validation produces none either.
    seed_and_process(&engine, &store, &project, "doc-1").await;

    let (first, _) = engine.validate_project(&project).await.unwrap();
    let (second, _) = engine.validate_project(&project).await.unwrap();
    let first_codes: Vec<&str> = first.iter().map(|f| f.code).collect();
    let second_codes: Vec<&str> = second.iter().map(|f| f.code).collect();
    assert_eq!(first_codes, second_codes);
}

#[tokio::test]
async fn test_deleting_document_drops_its_blocking_flags() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    store
        .set_project_settings(project.clone(), complete_settings())
        .await;
    seed_and_process(&engine, &store, &project, "doc-good").await;

    let bad = Document::new(
        DocumentId::new("doc-bad").unwrap(),
        project.clone(),
        "doc-bad.pdf",
        "scan.pdf",
        None,
    );
    let bad_id = bad.id.clone();
    store.insert_document(bad, vec![]).await.unwrap();
    let blocking = ValidationFlag::builder(
        project.clone(),
        FlagOrigin::DocumentValidation,
        "MISSING_TOTAL_CONSUMPTION",
        FlagCategory::MissingRequired,
        FlagSeverity::Blocking,
        "Bill has no total consumption",
    )
    .document(bad_id.clone())
    .build();
    store
        .replace_flags(
            &project,
            FlagOrigin::DocumentValidation,
            Some(&bad_id),
            vec![blocking],
        )
        .await
        .unwrap();

    let (_, can_export) = engine.validate_project(&project).await.unwrap();
    assert!(!can_export);

    store.delete_document(&bad_id).await.unwrap();

    let (flags, can_export) = engine.validate_project(&project).await.unwrap();
    assert!(can_export, "leftover flags: {flags:?}");
    assert!(flags.iter().all(|f| f.document_id.as_ref() != Some(&bad_id)));
}

#[tokio::test]
async fn test_blocking_severity_is_reported() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();

    let (flags, _) = engine.validate_project(&project).await.unwrap();
    let missing = flags
        .iter()
        .find(|f| f.code == "MISSING_CONSUMPTION")
        .unwrap();
    assert_eq!(missing.severity, FlagSeverity::Blocking);
    assert!(missing.suggestion.is_some());
}
