//! HTTP 接口测试 (直接调用 handler)

use axum::body::to_bytes;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::Response;
use doc_pairing_rust::api::{self, PairBatchResponse, PairBatchesRequest, PairBatchesResponse};
use doc_pairing_rust::{BatchContext, ConciliationStatus, PairingEngine};
use serde::de::DeserializeOwned;
use std::sync::Arc;

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn batch(id: &str, invoice_amount: &str, slip_amount: &str) -> BatchContext {
    let json = format!(
        r#"{{
            "batch_id": "{id}",
            "email_date": "2025-03-10T12:00:00Z",
            "documents": [
                {{"kind": "invoice", "source_filename": "nf.pdf", "invoice_number": "2025/119", "amount": "{invoice_amount}"}},
                {{"kind": "payment_slip", "source_filename": "boleto.pdf", "document_number": "2025.119", "amount": "{slip_amount}", "due_date": "20/03/2025"}}
            ]
        }}"#
    );
    serde_json::from_str(&json).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    assert_eq!(api::health_check().await, "OK");
}

#[tokio::test]
async fn test_pair_batch_endpoint() {
    let engine = Arc::new(PairingEngine::default());
    let response = api::pair_batch(State(engine), Json(batch("API1", "9290.71", "9290.71"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PairBatchResponse = read_json(response).await;
    assert!(body.success);
    assert_eq!(body.pairs.len(), 1);
    assert_eq!(body.pairs[0].status, ConciliationStatus::Conciliado);
    assert_eq!(body.summaries[0].date, "10/03/2025");
    assert_eq!(body.summaries[0].due_date, "20/03/2025");
}

#[tokio::test]
async fn test_pair_batches_endpoint_keeps_order() {
    let engine = Arc::new(PairingEngine::default());
    let request = PairBatchesRequest {
        batches: vec![
            batch("API1", "100.00", "100.00"),
            batch("API2", "100.00", "150.00"),
            batch("API3", "0", "630.00"),
        ],
    };
    let response = api::pair_batches(State(engine), Json(request)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PairBatchesResponse = read_json(response).await;
    assert!(body.success);
    let ids: Vec<&str> = body.results.iter().map(|r| r.batch_id.as_str()).collect();
    assert_eq!(ids, vec!["API1", "API2", "API3"]);

    let statuses: Vec<ConciliationStatus> = body
        .results
        .iter()
        .map(|r| r.pairs[0].status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            ConciliationStatus::Conciliado,
            ConciliationStatus::Divergente,
            ConciliationStatus::PareadoForcado,
        ]
    );
}
