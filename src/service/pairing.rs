use rayon::prelude::*;

use super::assembler::{
    extract_admin_warnings, BatchTally, DefaultNameNormalizer, EntityNameNormalizer,
    PairAssembler, PairCandidate,
};
use super::classifier::{ClassifierRules, DocumentTag};
use super::forced;
use super::grouping::{group_invoices, group_slips};
use super::matcher::match_groups;
use crate::config::PairingConfig;
use crate::models::{BatchContext, DocumentPair, RawDocument};

/// 配对引擎 - 只持有启动时构建的只读配置, 可跨线程共享
pub struct PairingEngine {
    rules: ClassifierRules,
    admin_warning_markers: Vec<String>,
    name_normalizer: Box<dyn EntityNameNormalizer>,
}

impl PairingEngine {
    pub fn new(config: &PairingConfig) -> Self {
        Self {
            rules: config.classifier_rules.clone(),
            admin_warning_markers: config.admin_warning_markers.clone(),
            name_normalizer: Box::new(DefaultNameNormalizer),
        }
    }

    /// 替换供应商名称规范化实现
    pub fn with_name_normalizer(mut self, normalizer: impl EntityNameNormalizer + 'static) -> Self {
        self.name_normalizer = Box::new(normalizer);
        self
    }

    /// 配对单个批次 (纯函数, 不修改输入, 不会失败)
    pub fn pair(&self, batch: &BatchContext) -> Vec<DocumentPair> {
        let classified: Vec<(DocumentTag, &RawDocument)> = batch
            .documents
            .iter()
            .map(|doc| (self.rules.classify(doc), doc))
            .collect();

        let of_tag = |tag: DocumentTag| {
            classified
                .iter()
                .filter(|(t, _)| *t == tag)
                .map(|(_, doc)| *doc)
                .collect::<Vec<_>>()
        };
        let invoices = of_tag(DocumentTag::Invoice);
        let slips = of_tag(DocumentTag::PaymentSlip);

        tracing::info!(
            "[Pairing] Batch {}: 开始配对, {} 张发票, {} 张付款单, {} 个辅助文档",
            batch.batch_id,
            invoices.len(),
            slips.len(),
            batch.documents.len() - invoices.len() - slips.len()
        );

        let candidates = self.candidates(&batch.batch_id, &invoices, &slips);

        let tally = BatchTally {
            admin_warnings: extract_admin_warnings(
                batch.correlation_notes.as_deref(),
                &self.admin_warning_markers,
            ),
            extraction_errors: batch.extraction_errors,
            classified,
        };

        let pairs = PairAssembler::new(self.name_normalizer.as_ref()).assemble(batch, candidates, &tally);

        tracing::info!(
            "[Pairing] Batch {}: 配对完成, 生成 {} 个配对",
            batch.batch_id,
            pairs.len()
        );
        for pair in &pairs {
            tracing::debug!(
                "[Pairing] {} -> {} (发票 {}, 付款单 {}, 差额 {})",
                pair.pair_id,
                pair.status,
                pair.invoice_value,
                pair.slip_value,
                pair.difference
            );
        }

        pairs
    }

    /// 并行配对多个批次, 结果与输入顺序一致
    pub fn pair_batches(&self, batches: &[BatchContext]) -> Vec<Vec<DocumentPair>> {
        batches.par_iter().map(|batch| self.pair(batch)).collect()
    }

    fn candidates<'a>(
        &self,
        batch_id: &str,
        invoices: &[&'a RawDocument],
        slips: &[&'a RawDocument],
    ) -> Vec<PairCandidate<'a>> {
        if invoices.is_empty() && slips.is_empty() {
            tracing::warn!("[Pairing] Batch {}: 没有发票或付款单, 生成待核对占位配对", batch_id);
            return vec![PairCandidate::placeholder()];
        }

        if let Some(candidate) = forced::pre_grouping(invoices, slips) {
            return vec![candidate];
        }

        let invoice_groups = group_invoices(invoices);
        let slip_groups = group_slips(slips);
        tracing::debug!(
            "[Pairing] Batch {}: {} 个发票分组, {} 个付款单分组",
            batch_id,
            invoice_groups.len(),
            slip_groups.len()
        );

        let outcome = match_groups(invoice_groups, slip_groups);
        let candidates = forced::resolve_orphans(outcome);

        if candidates.len() > 1 && !candidates.iter().any(PairCandidate::is_two_sided) {
            tracing::warn!(
                "[Pairing] Batch {}: 没有任何匹配, {} 个候选打包为单个配对",
                batch_id,
                candidates.len()
            );
            return vec![PairCandidate::bundle(candidates)];
        }

        candidates
    }
}

impl Default for PairingEngine {
    fn default() -> Self {
        Self::new(&PairingConfig::default())
    }
}
