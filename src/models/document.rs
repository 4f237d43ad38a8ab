use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 文档字段访问能力 - 每种文档类型显式实现, 缺失字段返回 None / 0
pub trait DocumentFields {
    fn source_filename(&self) -> &str;
    /// 金额 (缺失时为 0)
    fn amount(&self) -> BigDecimal;
    /// 发票号 / 单据号 / 文件名中提取的编号
    fn identifier(&self) -> Option<&str>;
    fn supplier_name(&self) -> Option<&str>;
    fn tax_id(&self) -> Option<&str>;
    fn due_date(&self) -> Option<&str>;
    fn issue_date(&self) -> Option<&str>;
    fn company_code(&self) -> Option<&str>;
    fn raw_text_snippet(&self) -> Option<&str>;
    /// 付款条码 (linha digitável), 仅付款单有
    fn payment_barcode(&self) -> Option<&str> {
        None
    }
}

/// 发票 (nota fiscal)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDocument {
    pub source_filename: String,
    pub invoice_number: Option<String>,
    pub amount: Option<BigDecimal>,
    pub supplier_name: Option<String>,
    pub tax_id: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub company_code: Option<String>,
    pub raw_text_snippet: Option<String>,
}

/// 付款单 (boleto)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSlipDocument {
    pub source_filename: String,
    pub document_number: Option<String>,
    pub amount: Option<BigDecimal>,
    /// 收款方 (beneficiário)
    pub beneficiary: Option<String>,
    pub tax_id: Option<String>,
    pub due_date: Option<String>,
    pub issue_date: Option<String>,
    pub company_code: Option<String>,
    pub payment_barcode: Option<String>,
    pub raw_text_snippet: Option<String>,
}

/// 其他附件 - 由分类规则决定是否参与配对
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherDocument {
    pub source_filename: String,
    pub filename_number: Option<String>,
    pub amount: Option<BigDecimal>,
    pub supplier_name: Option<String>,
    pub tax_id: Option<String>,
    pub due_date: Option<String>,
    pub issue_date: Option<String>,
    pub company_code: Option<String>,
    pub raw_text_snippet: Option<String>,
}

/// 提取层产出的原始文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawDocument {
    Invoice(InvoiceDocument),
    PaymentSlip(PaymentSlipDocument),
    Other(OtherDocument),
}

/// 空字符串视为缺失
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn amount_or_zero(value: &Option<BigDecimal>) -> BigDecimal {
    value.clone().unwrap_or_else(BigDecimal::zero)
}

impl DocumentFields for InvoiceDocument {
    fn source_filename(&self) -> &str {
        &self.source_filename
    }
    fn amount(&self) -> BigDecimal {
        amount_or_zero(&self.amount)
    }
    fn identifier(&self) -> Option<&str> {
        present(&self.invoice_number)
    }
    fn supplier_name(&self) -> Option<&str> {
        present(&self.supplier_name)
    }
    fn tax_id(&self) -> Option<&str> {
        present(&self.tax_id)
    }
    fn due_date(&self) -> Option<&str> {
        present(&self.due_date)
    }
    fn issue_date(&self) -> Option<&str> {
        present(&self.issue_date)
    }
    fn company_code(&self) -> Option<&str> {
        present(&self.company_code)
    }
    fn raw_text_snippet(&self) -> Option<&str> {
        present(&self.raw_text_snippet)
    }
}

impl DocumentFields for PaymentSlipDocument {
    fn source_filename(&self) -> &str {
        &self.source_filename
    }
    fn amount(&self) -> BigDecimal {
        amount_or_zero(&self.amount)
    }
    fn identifier(&self) -> Option<&str> {
        present(&self.document_number)
    }
    fn supplier_name(&self) -> Option<&str> {
        present(&self.beneficiary)
    }
    fn tax_id(&self) -> Option<&str> {
        present(&self.tax_id)
    }
    fn due_date(&self) -> Option<&str> {
        present(&self.due_date)
    }
    fn issue_date(&self) -> Option<&str> {
        present(&self.issue_date)
    }
    fn company_code(&self) -> Option<&str> {
        present(&self.company_code)
    }
    fn raw_text_snippet(&self) -> Option<&str> {
        present(&self.raw_text_snippet)
    }
    fn payment_barcode(&self) -> Option<&str> {
        present(&self.payment_barcode)
    }
}

impl DocumentFields for OtherDocument {
    fn source_filename(&self) -> &str {
        &self.source_filename
    }
    fn amount(&self) -> BigDecimal {
        amount_or_zero(&self.amount)
    }
    fn identifier(&self) -> Option<&str> {
        present(&self.filename_number)
    }
    fn supplier_name(&self) -> Option<&str> {
        present(&self.supplier_name)
    }
    fn tax_id(&self) -> Option<&str> {
        present(&self.tax_id)
    }
    fn due_date(&self) -> Option<&str> {
        present(&self.due_date)
    }
    fn issue_date(&self) -> Option<&str> {
        present(&self.issue_date)
    }
    fn company_code(&self) -> Option<&str> {
        present(&self.company_code)
    }
    fn raw_text_snippet(&self) -> Option<&str> {
        present(&self.raw_text_snippet)
    }
}

impl RawDocument {
    fn fields(&self) -> &dyn DocumentFields {
        match self {
            RawDocument::Invoice(doc) => doc,
            RawDocument::PaymentSlip(doc) => doc,
            RawDocument::Other(doc) => doc,
        }
    }
}

impl DocumentFields for RawDocument {
    fn source_filename(&self) -> &str {
        self.fields().source_filename()
    }
    fn amount(&self) -> BigDecimal {
        self.fields().amount()
    }
    fn identifier(&self) -> Option<&str> {
        self.fields().identifier()
    }
    fn supplier_name(&self) -> Option<&str> {
        self.fields().supplier_name()
    }
    fn tax_id(&self) -> Option<&str> {
        self.fields().tax_id()
    }
    fn due_date(&self) -> Option<&str> {
        self.fields().due_date()
    }
    fn issue_date(&self) -> Option<&str> {
        self.fields().issue_date()
    }
    fn company_code(&self) -> Option<&str> {
        self.fields().company_code()
    }
    fn raw_text_snippet(&self) -> Option<&str> {
        self.fields().raw_text_snippet()
    }
    fn payment_barcode(&self) -> Option<&str> {
        self.fields().payment_barcode()
    }
}
