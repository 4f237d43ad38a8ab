use crate::models::{BatchContext, DocumentPair, PairSummary};
use crate::service::PairingEngine;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 多个批次
#[derive(Debug, Deserialize)]
pub struct PairBatchesRequest {
    pub batches: Vec<BatchContext>,
}

/// 单批次响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct PairBatchResponse {
    pub success: bool,
    pub message: String,
    pub pairs: Vec<DocumentPair>,
    pub summaries: Vec<PairSummary>,
}

/// 单个批次的配对结果
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub pairs: Vec<DocumentPair>,
    pub summaries: Vec<PairSummary>,
}

/// 多批次响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct PairBatchesResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<BatchResult>,
}

fn summaries(pairs: &[DocumentPair]) -> Vec<PairSummary> {
    pairs.iter().map(DocumentPair::summary).collect()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 单批次配对接口
pub async fn pair_batch(
    State(engine): State<Arc<PairingEngine>>,
    Json(batch): Json<BatchContext>,
) -> Response {
    let pairs = engine.pair(&batch);
    let response = PairBatchResponse {
        success: true,
        message: format!("Batch {} produced {} pairs", batch.batch_id, pairs.len()),
        summaries: summaries(&pairs),
        pairs,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 多批次配对接口 (rayon 并行, 放到阻塞线程池执行)
pub async fn pair_batches(
    State(engine): State<Arc<PairingEngine>>,
    Json(req): Json<PairBatchesRequest>,
) -> Response {
    let batch_count = req.batches.len();
    let joined = tokio::task::spawn_blocking(move || {
        let results = engine.pair_batches(&req.batches);
        req.batches
            .iter()
            .zip(results)
            .map(|(batch, pairs)| BatchResult {
                batch_id: batch.batch_id.clone(),
                summaries: summaries(&pairs),
                pairs,
            })
            .collect::<Vec<_>>()
    })
    .await;

    match joined {
        Ok(results) => {
            let total_pairs: usize = results.iter().map(|r| r.pairs.len()).sum();
            let response = PairBatchesResponse {
                success: true,
                message: format!(
                    "Successfully paired {} batches, {} pairs",
                    batch_count, total_pairs
                ),
                results,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("[API] 批量配对任务失败: {}", e);
            let response = PairBatchesResponse {
                success: false,
                message: format!("Error: {}", e),
                results: Vec::new(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
