use bigdecimal::{BigDecimal, Zero};
use super::classifier::DocumentTag;
use super::matcher::GroupMatch;
use super::status::evaluate;
use crate::models::{
    BatchContext, DocumentCounts, DocumentFields, DocumentGroup, DocumentPair, RawDocument,
};

/// 未找到到期日时追加的固定警告
pub const DUE_DATE_MISSING_WARNING: &str = "Due date not found in documents";

/// 空批次或全部为辅助文档时的说明
pub const EMPTY_BATCH_NOTE: &str = "No invoice or payment slip found in batch";

/// 实体名称规范化 (外部协作者)
pub trait EntityNameNormalizer: Send + Sync {
    fn normalize(&self, name: &str) -> String;
}

/// 默认实现: 合并空白并转大写
#[derive(Debug, Clone, Default)]
pub struct DefaultNameNormalizer;

impl EntityNameNormalizer for DefaultNameNormalizer {
    fn normalize(&self, name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }
}

/// 组装前的候选配对
#[derive(Debug, Clone)]
pub struct PairCandidate<'a> {
    pub invoice_number: String,
    pub invoice_value: BigDecimal,
    pub slip_value: BigDecimal,
    pub invoice_docs: Vec<&'a RawDocument>,
    pub slip_docs: Vec<&'a RawDocument>,
    pub forced: bool,
    /// 附加在差异说明前的备注
    pub note: Option<String>,
}

impl<'a> PairCandidate<'a> {
    pub fn from_match(m: GroupMatch<'a>) -> Self {
        let (slip_value, slip_docs) = match m.slip {
            Some(slip) => (slip.canonical_value, slip.documents),
            None => (BigDecimal::zero(), Vec::new()),
        };
        Self {
            invoice_number: m.invoice.representative_identifier,
            invoice_value: m.invoice.canonical_value,
            slip_value,
            invoice_docs: m.invoice.documents,
            slip_docs,
            forced: false,
            note: None,
        }
    }

    pub fn orphan_slip(slip: DocumentGroup<'a>) -> Self {
        Self {
            invoice_number: String::new(),
            invoice_value: BigDecimal::zero(),
            slip_value: slip.canonical_value,
            invoice_docs: Vec::new(),
            slip_docs: slip.documents,
            forced: false,
            note: None,
        }
    }

    pub fn forced(
        invoice_number: String,
        slip_value: BigDecimal,
        invoice_docs: Vec<&'a RawDocument>,
        slip_docs: Vec<&'a RawDocument>,
    ) -> Self {
        Self {
            invoice_number,
            invoice_value: BigDecimal::zero(),
            slip_value,
            invoice_docs,
            slip_docs,
            forced: true,
            note: None,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            invoice_number: String::new(),
            invoice_value: BigDecimal::zero(),
            slip_value: BigDecimal::zero(),
            invoice_docs: Vec::new(),
            slip_docs: Vec::new(),
            forced: false,
            note: Some(EMPTY_BATCH_NOTE.to_string()),
        }
    }

    /// 全部候选合并为一个配对: 两侧金额分别求和, 编号用 ", " 连接
    pub fn bundle(candidates: Vec<PairCandidate<'a>>) -> Self {
        let count = candidates.len();
        let mut numbers: Vec<String> = Vec::new();
        let mut bundled = Self {
            invoice_number: String::new(),
            invoice_value: BigDecimal::zero(),
            slip_value: BigDecimal::zero(),
            invoice_docs: Vec::new(),
            slip_docs: Vec::new(),
            forced: false,
            note: Some(format!(
                "No document matched; {} unmatched groups bundled into a single pair",
                count
            )),
        };

        for c in candidates {
            if !c.invoice_number.is_empty() && !numbers.contains(&c.invoice_number) {
                numbers.push(c.invoice_number);
            }
            bundled.invoice_value += c.invoice_value;
            bundled.slip_value += c.slip_value;
            bundled.invoice_docs.extend(c.invoice_docs);
            bundled.slip_docs.extend(c.slip_docs);
        }
        bundled.invoice_number = numbers.join(", ");
        bundled
    }

    pub fn is_two_sided(&self) -> bool {
        !self.invoice_docs.is_empty() && !self.slip_docs.is_empty()
    }

    /// 强制配对以付款单字段为主, 其余以发票为主
    fn ordered_docs(&self) -> impl Iterator<Item = &&'a RawDocument> {
        let (first, second) = if self.forced {
            (&self.slip_docs, &self.invoice_docs)
        } else {
            (&self.invoice_docs, &self.slip_docs)
        };
        first.iter().chain(second.iter())
    }
}

/// 批次级统计 (分类结果 + 上游计数)
#[derive(Debug, Clone, Default)]
pub struct BatchTally<'a> {
    pub classified: Vec<(DocumentTag, &'a RawDocument)>,
    pub admin_warnings: Vec<String>,
    pub extraction_errors: usize,
}

impl BatchTally<'_> {
    fn count(&self, tag: DocumentTag) -> usize {
        self.classified.iter().filter(|(t, _)| *t == tag).count()
    }

    fn batch_counts(&self) -> DocumentCounts {
        DocumentCounts {
            invoices: self.count(DocumentTag::Invoice),
            slips: self.count(DocumentTag::PaymentSlip),
            auxiliary: self.count(DocumentTag::Auxiliary),
            admin_warnings: self.admin_warnings.len(),
            extraction_errors: self.extraction_errors,
        }
    }

    /// 按文档本身 (而非文件名) 归属统计单个配对的文档数
    fn pair_counts(&self, candidate: &PairCandidate<'_>) -> DocumentCounts {
        let in_pair = |doc: &RawDocument| {
            candidate
                .invoice_docs
                .iter()
                .chain(candidate.slip_docs.iter())
                .any(|d| std::ptr::eq(*d, doc))
        };
        let count = |tag: DocumentTag| {
            self.classified
                .iter()
                .filter(|(t, d)| *t == tag && in_pair(*d))
                .count()
        };
        DocumentCounts {
            invoices: count(DocumentTag::Invoice),
            slips: count(DocumentTag::PaymentSlip),
            ..Default::default()
        }
    }
}

/// 从关联备注中提取含行政警告标记的片段 (忽略大小写, 去重)
pub fn extract_admin_warnings(notes: Option<&str>, markers: &[String]) -> Vec<String> {
    let Some(notes) = notes else {
        return Vec::new();
    };
    let markers: Vec<String> = markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect();

    let mut warnings: Vec<String> = Vec::new();
    for segment in notes.split(['\n', ';', '|']).map(str::trim) {
        if segment.is_empty() {
            continue;
        }
        let lower = segment.to_lowercase();
        if markers.iter().any(|m| lower.contains(m.as_str()))
            && !warnings.iter().any(|w| w.contains(segment))
        {
            warnings.push(segment.to_string());
        }
    }
    warnings
}

/// 追加说明, 已包含则跳过
fn append_text(text: &mut String, addition: &str) {
    if addition.is_empty() || text.contains(addition) {
        return;
    }
    if !text.is_empty() {
        text.push_str(" | ");
    }
    text.push_str(addition);
}

/// 组装最终配对记录
pub struct PairAssembler<'e> {
    name_normalizer: &'e dyn EntityNameNormalizer,
}

impl<'e> PairAssembler<'e> {
    pub fn new(name_normalizer: &'e dyn EntityNameNormalizer) -> Self {
        Self { name_normalizer }
    }

    /// 逐字段独立扫描, 取第一个非空值
    fn first_field<'a>(
        candidate: &PairCandidate<'a>,
        field: impl Fn(&'a RawDocument) -> Option<&'a str>,
    ) -> Option<String> {
        candidate
            .ordered_docs()
            .find_map(|d| field(*d))
            .map(str::to_string)
    }

    pub fn assemble(
        &self,
        batch: &BatchContext,
        candidates: Vec<PairCandidate<'_>>,
        tally: &BatchTally<'_>,
    ) -> Vec<DocumentPair> {
        let total = candidates.len();
        let mut pairs = Vec::with_capacity(total);

        for (idx, candidate) in candidates.into_iter().enumerate() {
            let counts = if total == 1 {
                tally.batch_counts()
            } else if idx == 0 {
                DocumentCounts {
                    auxiliary: tally.count(DocumentTag::Auxiliary),
                    admin_warnings: tally.admin_warnings.len(),
                    extraction_errors: tally.extraction_errors,
                    ..tally.pair_counts(&candidate)
                }
            } else {
                tally.pair_counts(&candidate)
            };

            let pair_id = if total == 1 {
                batch.batch_id.clone()
            } else if candidate.invoice_number.is_empty() {
                format!("{}_{}", batch.batch_id, idx + 1)
            } else {
                format!("{}_{}", batch.batch_id, candidate.invoice_number)
            };

            pairs.push(self.build(batch, candidate, pair_id, counts, &tally.admin_warnings));
        }

        pairs
    }

    fn build(
        &self,
        batch: &BatchContext,
        candidate: PairCandidate<'_>,
        pair_id: String,
        counts: DocumentCounts,
        admin_warnings: &[String],
    ) -> DocumentPair {
        let supplier = Self::first_field(&candidate, |d| d.supplier_name())
            .map(|name| self.name_normalizer.normalize(&name))
            .filter(|name| !name.is_empty());
        let tax_id = Self::first_field(&candidate, |d| d.tax_id());
        let due_date = Self::first_field(&candidate, |d| d.due_date());
        let issue_date = Self::first_field(&candidate, |d| d.issue_date());
        let company_code = Self::first_field(&candidate, |d| d.company_code());

        let verdict = evaluate(&candidate.invoice_value, &candidate.slip_value, candidate.forced);

        let mut divergence_text = String::new();
        if let Some(note) = &candidate.note {
            append_text(&mut divergence_text, note);
        }
        append_text(&mut divergence_text, &verdict.divergence_text);
        for warning in admin_warnings {
            append_text(&mut divergence_text, warning);
        }
        if due_date.is_none() {
            append_text(&mut divergence_text, DUE_DATE_MISSING_WARNING);
        }

        let filenames = |docs: &[&RawDocument]| -> Vec<String> {
            docs.iter().map(|d| d.source_filename().to_string()).collect()
        };

        DocumentPair {
            pair_id,
            batch_id: batch.batch_id.clone(),
            invoice_number: candidate.invoice_number.clone(),
            invoice_value: candidate.invoice_value.clone(),
            slip_value: candidate.slip_value.clone(),
            due_date,
            supplier,
            tax_id,
            issue_date,
            company_code,
            status: verdict.status,
            divergence_text,
            difference: verdict.difference,
            invoice_documents: filenames(&candidate.invoice_docs),
            slip_documents: filenames(&candidate.slip_docs),
            forced: candidate.forced,
            counts,
            email_date: batch.email_date,
            email_subject: batch.email_subject.clone(),
            email_sender: batch.email_sender.clone(),
            source_folder: batch.source_folder.clone(),
        }
    }
}
