use bigdecimal::{BigDecimal, Zero};

use super::assembler::PairCandidate;
use super::matcher::MatchOutcome;
use super::money::within_tolerance;
use crate::models::{DocumentFields, DocumentGroup, RawDocument};

/// 只有发票金额为 0 且两侧金额不相等时才强制配对
fn should_force(invoice_value: &BigDecimal, slip_value: &BigDecimal) -> bool {
    invoice_value.is_zero() && !within_tolerance(invoice_value, slip_value)
}

/// 分组前: 批次中恰好一张发票和一张付款单 (辅助文档已排除)
///
/// 两侧金额都为正但不相等时不强制, 留给常规匹配 (结果为 DIVERGENTE)。
pub fn pre_grouping<'a>(
    invoices: &[&'a RawDocument],
    slips: &[&'a RawDocument],
) -> Option<PairCandidate<'a>> {
    let ([invoice], [slip]) = (invoices, slips) else {
        return None;
    };

    let invoice_value = invoice.amount();
    let slip_value = slip.amount();
    if !should_force(&invoice_value, &slip_value) {
        return None;
    }

    tracing::debug!(
        "[Forced] 1+1 批次强制配对: 发票 {} (金额 0) <-> 付款单 {} ({})",
        invoice.source_filename(),
        slip.source_filename(),
        slip_value
    );

    let invoice_number = invoice
        .identifier()
        .or_else(|| slip.identifier())
        .unwrap_or_default()
        .to_string();

    Some(PairCandidate::forced(
        invoice_number,
        slip_value,
        vec![*invoice],
        vec![*slip],
    ))
}

fn forced_from_groups<'a>(invoice: DocumentGroup<'a>, slip: DocumentGroup<'a>) -> PairCandidate<'a> {
    let invoice_number = if invoice.representative_identifier.is_empty() {
        slip.representative_identifier.clone()
    } else {
        invoice.representative_identifier.clone()
    };
    PairCandidate::forced(invoice_number, slip.canonical_value, invoice.documents, slip.documents)
}

/// 匹配后: 恰好剩一个金额为 0 的未匹配发票分组和一个孤立付款单分组时强制配对
///
/// 剩余两个及以上时不处理, 交给后续的整体打包兜底。
pub fn resolve_orphans(outcome: MatchOutcome<'_>) -> Vec<PairCandidate<'_>> {
    let MatchOutcome {
        matched,
        mut orphan_slips,
    } = outcome;

    let zero_leftovers: Vec<usize> = matched
        .iter()
        .enumerate()
        .filter(|(_, m)| m.slip.is_none() && m.invoice.canonical_value.is_zero())
        .map(|(idx, _)| idx)
        .collect();

    let forced_idx = match (zero_leftovers.as_slice(), orphan_slips.as_slice()) {
        ([idx], [slip]) if should_force(&matched[*idx].invoice.canonical_value, &slip.canonical_value) => {
            Some(*idx)
        }
        _ => None,
    };

    let mut forced_slip = match forced_idx {
        Some(_) => orphan_slips.pop(),
        None => None,
    };

    let mut candidates: Vec<PairCandidate<'_>> = Vec::with_capacity(matched.len() + orphan_slips.len());
    for (idx, m) in matched.into_iter().enumerate() {
        if Some(idx) == forced_idx {
            if let Some(slip) = forced_slip.take() {
                tracing::debug!(
                    "[Forced] 孤立发票分组 {} (金额 0) 与孤立付款单分组 {} 强制配对",
                    m.invoice.key,
                    slip.key
                );
                candidates.push(forced_from_groups(m.invoice, slip));
                continue;
            }
        }
        candidates.push(PairCandidate::from_match(m));
    }

    candidates.extend(orphan_slips.into_iter().map(PairCandidate::orphan_slip));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceDocument, PaymentSlipDocument};
    use crate::service::grouping::{group_invoices, group_slips};
    use crate::service::matcher::match_groups;
    use std::str::FromStr;

    fn invoice(file: &str, number: Option<&str>, amount: &str) -> RawDocument {
        RawDocument::Invoice(InvoiceDocument {
            source_filename: file.to_string(),
            invoice_number: number.map(str::to_string),
            amount: Some(BigDecimal::from_str(amount).unwrap()),
            ..Default::default()
        })
    }

    fn slip(file: &str, number: Option<&str>, amount: &str) -> RawDocument {
        RawDocument::PaymentSlip(PaymentSlipDocument {
            source_filename: file.to_string(),
            document_number: number.map(str::to_string),
            amount: Some(BigDecimal::from_str(amount).unwrap()),
            ..Default::default()
        })
    }

    #[test]
    fn test_pre_grouping_forces_zero_invoice() {
        let inv = invoice("nf.pdf", Some("55"), "0");
        let s = slip("boleto.pdf", Some("987"), "630.00");
        let candidate = pre_grouping(&[&inv], &[&s]).unwrap();

        assert!(candidate.forced);
        assert_eq!(candidate.invoice_number, "55");
        assert_eq!(candidate.slip_value, BigDecimal::from(630));
    }

    #[test]
    fn test_pre_grouping_never_forces_positive_divergence() {
        let inv = invoice("nf.pdf", Some("55"), "500.00");
        let s = slip("boleto.pdf", Some("987"), "630.00");
        assert!(pre_grouping(&[&inv], &[&s]).is_none());
    }

    #[test]
    fn test_pre_grouping_requires_one_each() {
        let inv = invoice("nf.pdf", None, "0");
        let a = slip("a.pdf", None, "10");
        let b = slip("b.pdf", None, "20");
        assert!(pre_grouping(&[&inv], &[&a, &b]).is_none());
        assert!(pre_grouping(&[], &[&a]).is_none());
    }

    #[test]
    fn test_resolve_single_leftover() {
        let matched_inv = invoice("nf1.pdf", Some("1"), "100.00");
        let zero_inv = invoice("nf2.pdf", Some("2"), "0");
        let matched_slip = slip("b1.pdf", Some("1"), "100.00");
        let orphan = slip("b2.pdf", Some("999"), "75.00");

        let outcome = match_groups(
            group_invoices(&[&matched_inv, &zero_inv]),
            group_slips(&[&matched_slip, &orphan]),
        );
        let candidates = resolve_orphans(outcome);

        assert_eq!(candidates.len(), 2);
        assert!(!candidates[0].forced);
        assert!(candidates[1].forced);
        assert_eq!(candidates[1].invoice_number, "2");
        assert_eq!(candidates[1].slip_value, BigDecimal::from(75));
    }

    #[test]
    fn test_two_zero_leftovers_not_forced() {
        let a = invoice("nf1.pdf", Some("1"), "0");
        let b = invoice("nf2.pdf", Some("2"), "0");
        let orphan = slip("b.pdf", Some("999"), "75.00");

        let outcome = match_groups(group_invoices(&[&a, &b]), group_slips(&[&orphan]));
        let candidates = resolve_orphans(outcome);

        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| !c.forced));
    }
}
