//! End-to-end pipeline tests over the engine facade with stub providers

use meterbox::adapters::store::{DocumentStore, MemoryStore};
use meterbox::config::MeterboxConfig;
use meterbox::core::ProcessingEngine;
use meterbox::domain::{
    Document, DocumentId, DocumentStatus, FieldStatus, ProjectId, ProjectSettings,
};
use std::sync::Arc;

async fn seed_document(store: &MemoryStore, project: &ProjectId, doc_id: &str) -> DocumentId {
    let document = Document::new(
        DocumentId::new(doc_id).unwrap(),
        project.clone(),
        format!("{doc_id}.pdf"),
        "january-bill.pdf",
        Some(2048),
    );
    let id = document.id.clone();
    store
        .insert_document(document, b"%PDF-1.4 sample bill".to_vec())
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn test_process_document_end_to_end() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    store
        .set_project_settings(project.clone(), ProjectSettings::default())
        .await;
    let doc_id = seed_document(&store, &project, "doc-1").await;

    let document = engine.process_document(&doc_id).await.unwrap();
    assert_eq!(document.status, DocumentStatus::Extracted);
    assert_eq!(document.current_extraction_version, Some(1));

    // Stub bill: 1,250 kWh normalized to 1.25 MWh.
    let extraction = store.current_extraction(&doc_id).await.unwrap().unwrap();
    assert_eq!(extraction.version, 1);
    assert!((extraction.record.total_mwh - 1.25).abs() < 1e-9);

    let fields = store.extraction_fields(&extraction.id).await.unwrap();
    assert!(fields.iter().all(|f| f.status == FieldStatus::Unconfirmed));
    assert!(fields.iter().any(|f| f.name == "total_consumption"));

    let aggregate = engine.aggregate(&project).await.unwrap();
    assert!((aggregate.total_mwh - 1.25).abs() < 1e-9);
    // Default commission emission factor 0.4 tCO2/MWh.
    let emissions = aggregate.indirect_emissions.unwrap();
    assert!((emissions.emissions_tco2 - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_multiple_documents_aggregate_in_order() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();

    let first = seed_document(&store, &project, "doc-1").await;
    let second = seed_document(&store, &project, "doc-2").await;
    engine.process_document(&first).await.unwrap();
    engine.process_document(&second).await.unwrap();

    let aggregate = engine.aggregate(&project).await.unwrap();
    assert_eq!(aggregate.bills.len(), 2);
    assert!((aggregate.total_mwh - 2.5).abs() < 1e-9);
    assert_eq!(aggregate.bills[0].document_id, first);
    assert_eq!(aggregate.bills[1].document_id, second);
}

#[tokio::test]
async fn test_concurrent_processing_converges() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();

    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(seed_document(&store, &project, &format!("doc-{i}")).await);
    }

    let documents = engine.process_documents(&ids, 4).await.unwrap();
    assert_eq!(documents.len(), 4);
    assert!(documents
        .iter()
        .all(|d| d.status == DocumentStatus::Extracted));

    // Last-writer-wins over full recomputes converges to the same value.
    let aggregate = engine.aggregate(&project).await.unwrap();
    assert_eq!(aggregate.bills.len(), 4);
    assert!((aggregate.total_mwh - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_reprocess_creates_next_version() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    let doc_id = seed_document(&store, &project, "doc-1").await;

    engine.process_document(&doc_id).await.unwrap();
    let document = engine.reprocess_document(&doc_id).await.unwrap();

    assert_eq!(document.status, DocumentStatus::Extracted);
    assert_eq!(document.current_extraction_version, Some(2));

    // Reprocessing supersedes but never rewrites the aggregate total.
    let aggregate = engine.aggregate(&project).await.unwrap();
    assert_eq!(aggregate.bills.len(), 1);
    assert!((aggregate.total_mwh - 1.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_aggregate_is_deterministic() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    let doc_id = seed_document(&store, &project, "doc-1").await;
    engine.process_document(&doc_id).await.unwrap();

    let first = engine.aggregate(&project).await.unwrap();
    let second = engine.aggregate(&project).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_confirm_all_fields_marks_reviewed() {
    let store = Arc::new(MemoryStore::new());
    let engine =
        ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store.clone()).unwrap();
    let project = ProjectId::new("proj-1").unwrap();
    let doc_id = seed_document(&store, &project, "doc-1").await;
    engine.process_document(&doc_id).await.unwrap();

    let confirmed = engine.confirm_all_fields(&doc_id).await.unwrap();
    assert!(confirmed > 0);

    let document = store.document(&doc_id).await.unwrap();
    assert_eq!(document.status, DocumentStatus::Reviewed);

    // A reviewed document still contributes to the aggregate.
    let aggregate = engine.aggregate(&project).await.unwrap();
    assert!((aggregate.total_mwh - 1.25).abs() < 1e-9);
}
