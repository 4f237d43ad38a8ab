use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RawDocument;

/// 一次导入事件 (通常是一封邮件) 的文档批次
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchContext {
    pub batch_id: String,
    pub email_subject: Option<String>,
    pub email_sender: Option<String>,
    pub email_date: Option<DateTime<Utc>>,
    pub source_folder: Option<String>,
    pub documents: Vec<RawDocument>,
    /// 关联备注, 由上游写入行政类警告标记
    pub correlation_notes: Option<String>,
    /// 提取层报告的错误数
    pub extraction_errors: usize,
}

impl BatchContext {
    pub fn new(batch_id: impl Into<String>, documents: Vec<RawDocument>) -> Self {
        Self {
            batch_id: batch_id.into(),
            documents,
            ..Default::default()
        }
    }
}
