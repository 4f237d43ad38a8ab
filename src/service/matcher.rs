use super::grouping::GroupMap;
use super::money::values_match;
use super::normalizer::equivalent;
use crate::models::DocumentGroup;

/// 命中的匹配规则 (按优先级)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Identifier,
    Value,
}

/// 发票分组及其匹配到的付款单分组 (可能没有)
#[derive(Debug, Clone)]
pub struct GroupMatch<'a> {
    pub invoice: DocumentGroup<'a>,
    pub slip: Option<DocumentGroup<'a>>,
    pub rule: Option<MatchRule>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome<'a> {
    /// 每个发票分组一条, 按插入顺序
    pub matched: Vec<GroupMatch<'a>>,
    /// 未被任何发票分组使用的付款单分组
    pub orphan_slips: Vec<DocumentGroup<'a>>,
}

impl<'a> MatchOutcome<'a> {
    /// 是否存在两侧都有文档的配对
    pub fn has_two_sided(&self) -> bool {
        self.matched.iter().any(|m| m.slip.is_some())
    }
}

/// 在未使用的付款单分组中按优先级查找: 先编号等价, 再金额相等
fn select_slip(
    invoice: &DocumentGroup<'_>,
    slips: &[Option<DocumentGroup<'_>>],
) -> Option<(usize, MatchRule)> {
    let by_identifier = slips.iter().position(|s| {
        s.as_ref().is_some_and(|s| {
            equivalent(&invoice.normalized_identifier, &s.normalized_identifier)
        })
    });
    if let Some(idx) = by_identifier {
        return Some((idx, MatchRule::Identifier));
    }

    slips
        .iter()
        .position(|s| {
            s.as_ref()
                .is_some_and(|s| values_match(&invoice.canonical_value, &s.canonical_value))
        })
        .map(|idx| (idx, MatchRule::Value))
}

/// 贪心首次适配: 发票分组按插入顺序各取第一个满足条件的付款单分组
///
/// 非全局最优; 多个付款单分组都满足时, 先出现者胜出。
pub fn match_groups<'a>(invoice_groups: GroupMap<'a>, slip_groups: GroupMap<'a>) -> MatchOutcome<'a> {
    let mut slips: Vec<Option<DocumentGroup<'a>>> =
        slip_groups.into_values().map(Some).collect();
    let mut matched = Vec::with_capacity(invoice_groups.len());

    for invoice in invoice_groups.into_values() {
        let selected = select_slip(&invoice, &slips);
        let (slip, rule) = match selected {
            Some((idx, rule)) => (slips[idx].take(), Some(rule)),
            None => (None, None),
        };

        match (&slip, rule) {
            (Some(s), Some(rule)) => tracing::debug!(
                "[Matching] 发票分组 {} 匹配付款单分组 {} ({:?})",
                invoice.key,
                s.key,
                rule
            ),
            _ => tracing::debug!("[Matching] 发票分组 {} 无匹配付款单", invoice.key),
        }

        matched.push(GroupMatch {
            invoice,
            slip,
            rule,
        });
    }

    let orphan_slips: Vec<DocumentGroup<'a>> = slips.into_iter().flatten().collect();
    if !orphan_slips.is_empty() {
        tracing::debug!("[Matching] {} 个付款单分组未匹配", orphan_slips.len());
    }

    MatchOutcome {
        matched,
        orphan_slips,
    }
}
