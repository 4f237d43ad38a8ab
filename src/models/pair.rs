use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 对账状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConciliationStatus {
    Conciliado,
    Divergente,
    Conferir,
    PareadoForcado,
    DivergenteValor,
}

impl fmt::Display for ConciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conciliado => write!(f, "CONCILIADO"),
            Self::Divergente => write!(f, "DIVERGENTE"),
            Self::Conferir => write!(f, "CONFERIR"),
            Self::PareadoForcado => write!(f, "PAREADO_FORCADO"),
            Self::DivergenteValor => write!(f, "DIVERGENTE_VALOR"),
        }
    }
}

/// 按文档类型统计的数量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounts {
    pub invoices: usize,
    pub slips: usize,
    pub auxiliary: usize,
    pub admin_warnings: usize,
    pub extraction_errors: usize,
}

impl fmt::Display for DocumentCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NF: {} | BOLETO: {} | OUTROS: {}",
            self.invoices, self.slips, self.auxiliary
        )?;
        if self.admin_warnings > 0 {
            write!(f, " | AVISOS: {}", self.admin_warnings)?;
        }
        if self.extraction_errors > 0 {
            write!(f, " | ERROS: {}", self.extraction_errors)?;
        }
        Ok(())
    }
}

/// 配对结果 - 创建后不可变, 供汇总/导出层消费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPair {
    pub pair_id: String,
    pub batch_id: String,
    pub invoice_number: String,
    pub invoice_value: BigDecimal,
    pub slip_value: BigDecimal,
    pub due_date: Option<String>,
    pub supplier: Option<String>,
    pub tax_id: Option<String>,
    pub issue_date: Option<String>,
    pub company_code: Option<String>,
    pub status: ConciliationStatus,
    pub divergence_text: String,
    pub difference: BigDecimal,
    pub invoice_documents: Vec<String>,
    pub slip_documents: Vec<String>,
    pub forced: bool,
    pub counts: DocumentCounts,
    pub email_date: Option<DateTime<Utc>>,
    pub email_subject: Option<String>,
    pub email_sender: Option<String>,
    pub source_folder: Option<String>,
}

/// 扁平化汇总视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    pub id: String,
    /// 邮件日期 (非处理日期)
    pub date: String,
    pub status: ConciliationStatus,
    pub divergence_text: String,
    pub difference: BigDecimal,
    pub supplier: String,
    pub due_date: String,
    pub invoice_number: String,
    pub purchase_value: BigDecimal,
    pub slip_value: BigDecimal,
    pub document_counts: String,
    pub email_subject: String,
    pub email_sender: String,
    pub company_code: String,
    pub source_folder: String,
}

impl DocumentPair {
    /// 采购金额: 发票金额优先, 否则取付款单金额
    pub fn purchase_value(&self) -> BigDecimal {
        if self.invoice_value > BigDecimal::zero() {
            self.invoice_value.clone()
        } else if self.slip_value > BigDecimal::zero() {
            self.slip_value.clone()
        } else {
            BigDecimal::zero()
        }
    }

    pub fn document_count(&self) -> usize {
        self.invoice_documents.len() + self.slip_documents.len()
    }

    pub fn summary(&self) -> PairSummary {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        PairSummary {
            id: self.pair_id.clone(),
            date: self
                .email_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            status: self.status,
            divergence_text: self.divergence_text.clone(),
            difference: self.difference.clone(),
            supplier: text(&self.supplier),
            due_date: text(&self.due_date),
            invoice_number: self.invoice_number.clone(),
            purchase_value: self.purchase_value(),
            slip_value: self.slip_value.clone(),
            document_counts: self.counts.to_string(),
            email_subject: text(&self.email_subject),
            email_sender: text(&self.email_sender),
            company_code: text(&self.company_code),
            source_folder: text(&self.source_folder),
        }
    }
}
