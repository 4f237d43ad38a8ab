use bigdecimal::BigDecimal;
use std::fmt;

use super::{DocumentFields, RawDocument};

/// 分组键 - 编号键与金额合成键分开, 避免二者冲突
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Identifier(String),
    /// 无编号时按金额合成, ordinal 区分同金额的不同分组
    Value { amount: String, ordinal: usize },
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Identifier(id) => write!(f, "{}", id),
            GroupKey::Value { amount, ordinal: 0 } => write!(f, "value_{}", amount),
            GroupKey::Value { amount, ordinal } => write!(f, "value_{}#{}", amount, ordinal),
        }
    }
}

/// 同一张发票/付款单的重复附件合并后的分组
#[derive(Debug, Clone)]
pub struct DocumentGroup<'a> {
    pub key: GroupKey,
    pub canonical_value: BigDecimal,
    pub representative_identifier: String,
    pub normalized_identifier: String,
    pub documents: Vec<&'a RawDocument>,
    pub payment_barcode_digits: Option<String>,
}

impl<'a> DocumentGroup<'a> {
    pub fn new(
        key: GroupKey,
        identifier: Option<&str>,
        normalized: &str,
        value: BigDecimal,
        doc: &'a RawDocument,
    ) -> Self {
        Self {
            key,
            canonical_value: value,
            representative_identifier: identifier.unwrap_or_default().to_string(),
            normalized_identifier: normalized.to_string(),
            documents: vec![doc],
            payment_barcode_digits: None,
        }
    }

    pub fn filenames(&self) -> Vec<String> {
        self.documents
            .iter()
            .map(|d| d.source_filename().to_string())
            .collect()
    }
}
