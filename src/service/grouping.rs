use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;
use std::collections::HashMap;

use super::money::values_match;
use super::normalizer::{equivalent, normalize};
use crate::models::{DocumentFields, DocumentGroup, GroupKey, RawDocument};

/// 保序分组表, 后续匹配按插入顺序遍历
pub type GroupMap<'a> = IndexMap<GroupKey, DocumentGroup<'a>>;

/// 待分组条目的预计算字段
struct GroupItem<'a> {
    identifier: Option<&'a str>,
    normalized: String,
    value: BigDecimal,
    doc: &'a RawDocument,
}

impl<'a> GroupItem<'a> {
    fn from_doc(doc: &'a RawDocument) -> Self {
        let identifier = doc.identifier();
        Self {
            identifier,
            normalized: identifier.map(normalize).unwrap_or_default(),
            value: doc.amount(),
            doc,
        }
    }
}

/// 首个满足条件的分组 (不回溯): 金额在容差内相等, 或编号等价
fn find_group<'m, 'a>(
    groups: &'m mut GroupMap<'a>,
    item: &GroupItem<'_>,
) -> Option<&'m mut DocumentGroup<'a>> {
    groups.values_mut().find(|g| {
        values_match(&g.canonical_value, &item.value)
            || equivalent(&g.normalized_identifier, &item.normalized)
    })
}

/// 更短 (更干净) 的编号替换分组代表编号
///
/// 匹配用的规范化编号保持首次设置的值, 只有分组原本没有编号时才补上。
fn absorb_identifier(group: &mut DocumentGroup<'_>, item: &GroupItem<'_>) {
    let Some(identifier) = item.identifier else {
        return;
    };
    if item.normalized.is_empty() {
        return;
    }
    if group.representative_identifier.is_empty()
        || identifier.len() < group.representative_identifier.len()
    {
        group.representative_identifier = identifier.to_string();
    }
    if group.normalized_identifier.is_empty() {
        group.normalized_identifier = item.normalized.clone();
    }
}

fn new_key(groups: &GroupMap<'_>, item: &GroupItem<'_>) -> GroupKey {
    if !item.normalized.is_empty() {
        let key = GroupKey::Identifier(item.normalized.clone());
        if !groups.contains_key(&key) {
            return key;
        }
    }

    let amount = item.value.with_scale(2).to_string();
    let ordinal = groups
        .keys()
        .filter(|k| matches!(k, GroupKey::Value { amount: a, .. } if *a == amount))
        .count();
    GroupKey::Value { amount, ordinal }
}

fn insert_group<'a>(groups: &mut GroupMap<'a>, item: GroupItem<'a>) -> GroupKey {
    let key = new_key(groups, &item);
    let identifier = if item.normalized.is_empty() {
        None
    } else {
        item.identifier
    };
    let group = DocumentGroup::new(key.clone(), identifier, &item.normalized, item.value, item.doc);
    groups.insert(key.clone(), group);
    key
}

/// 合并同一张发票的重复附件 (如 PDF + XML)
///
/// 发票分组金额取首个非零金额, 重复附件不累加。
pub fn group_invoices<'a>(items: &[&'a RawDocument]) -> GroupMap<'a> {
    let mut groups = GroupMap::new();

    for &doc in items {
        let item = GroupItem::from_doc(doc);
        match find_group(&mut groups, &item) {
            Some(group) => {
                tracing::debug!(
                    "[Grouping] 发票 {} 并入分组 {}",
                    doc.source_filename(),
                    group.key
                );
                group.documents.push(doc);
                if group.canonical_value.is_zero() && item.value > BigDecimal::zero() {
                    group.canonical_value = item.value.clone();
                }
                absorb_identifier(group, &item);
            }
            None => {
                let key = insert_group(&mut groups, item);
                tracing::debug!("[Grouping] 新建发票分组 {}", key);
            }
        }
    }

    groups
}

/// 合并付款单分组, 并按付款条码数字识别重复附件
///
/// 同一条码的重复附件只加入文档列表, 金额不重复计入;
/// 其余并入的付款单 (分期) 金额累加到分组总额。
pub fn group_slips<'a>(items: &[&'a RawDocument]) -> GroupMap<'a> {
    let mut groups = GroupMap::new();
    // 条码数字 -> 首次出现该条码的分组
    let mut seen_barcodes: HashMap<String, GroupKey> = HashMap::new();

    for &doc in items {
        let item = GroupItem::from_doc(doc);
        let digits: Option<String> = doc
            .payment_barcode()
            .map(|b| b.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|d| !d.is_empty());

        if let Some(group) = digits
            .as_ref()
            .and_then(|d| seen_barcodes.get(d))
            .and_then(|key| groups.get_mut(key))
        {
            tracing::debug!(
                "[Grouping] 付款单 {} 条码重复, 作为重复附件并入分组 {} (金额不累加)",
                doc.source_filename(),
                group.key
            );
            group.documents.push(doc);
            absorb_identifier(group, &item);
            continue;
        }

        let key = match find_group(&mut groups, &item) {
            Some(group) => {
                tracing::debug!(
                    "[Grouping] 付款单 {} 并入分组 {}",
                    doc.source_filename(),
                    group.key
                );
                group.documents.push(doc);
                group.canonical_value += &item.value;
                absorb_identifier(group, &item);
                group.key.clone()
            }
            None => {
                let key = insert_group(&mut groups, item);
                tracing::debug!("[Grouping] 新建付款单分组 {}", key);
                key
            }
        };

        if let Some(d) = digits {
            if let Some(group) = groups.get_mut(&key) {
                if group.payment_barcode_digits.is_none() {
                    group.payment_barcode_digits = Some(d.clone());
                }
            }
            seen_barcodes.entry(d).or_insert(key);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceDocument, PaymentSlipDocument};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn invoice(file: &str, number: Option<&str>, amount: &str) -> RawDocument {
        RawDocument::Invoice(InvoiceDocument {
            source_filename: file.to_string(),
            invoice_number: number.map(str::to_string),
            amount: Some(dec(amount)),
            ..Default::default()
        })
    }

    fn slip(file: &str, number: Option<&str>, amount: &str, barcode: Option<&str>) -> RawDocument {
        RawDocument::PaymentSlip(PaymentSlipDocument {
            source_filename: file.to_string(),
            document_number: number.map(str::to_string),
            amount: Some(dec(amount)),
            payment_barcode: barcode.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn test_invoice_duplicates_merge_by_number() {
        let pdf = invoice("nf119.pdf", Some("NF 2025/000119"), "9290.71");
        let xml = invoice("nf119.xml", Some("119"), "0");
        let groups = group_invoices(&[&pdf, &xml]);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.key, GroupKey::Identifier("119".to_string()));
        assert_eq!(group.documents.len(), 2);
        assert_eq!(group.canonical_value, dec("9290.71"));
        assert_eq!(group.representative_identifier, "119");
    }

    #[test]
    fn test_invoice_value_adopted_from_later_duplicate() {
        let xml = invoice("nf.xml", Some("77"), "0");
        let pdf = invoice("nf.pdf", Some("0077"), "150.00");
        let groups = group_invoices(&[&xml, &pdf]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical_value, dec("150"));
    }

    #[test]
    fn test_same_value_merges_despite_distinct_numbers() {
        let a = invoice("a.pdf", Some("119"), "500.00");
        let b = invoice("b.pdf", Some("122"), "500.00");
        let groups = group_invoices(&[&a, &b]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].documents.len(), 2);
        assert_eq!(groups[0].canonical_value, dec("500"));
    }

    #[test]
    fn test_shorter_identifier_keeps_match_key() {
        let pdf = invoice("a.pdf", Some("2025/119"), "100.00");
        let xml = invoice("a.xml", Some("19"), "100.00");
        let groups = group_invoices(&[&pdf, &xml]);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.representative_identifier, "19");
        assert_eq!(group.normalized_identifier, "119");
        assert_eq!(group.key, GroupKey::Identifier("119".to_string()));
    }

    #[test]
    fn test_identifier_adopted_by_group_without_one() {
        let first = invoice("a.pdf", None, "80.00");
        let second = invoice("a.xml", Some("NF 000042"), "80.00");
        let groups = group_invoices(&[&first, &second]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].representative_identifier, "NF 000042");
        assert_eq!(groups[0].normalized_identifier, "42");
    }

    #[test]
    fn test_value_keys_do_not_collide() {
        let a = invoice("a.pdf", None, "0");
        let b = invoice("b.pdf", None, "0");
        let groups = group_invoices(&[&a, &b]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.to_string(), "value_0.00");
        assert_eq!(groups[1].key.to_string(), "value_0.00#1");
    }

    #[test]
    fn test_slip_barcode_duplicates_not_summed() {
        let a = slip("boleto.pdf", Some("2025.119"), "630.00", Some("23790.12345 60000.000001"));
        let b = slip("boleto (1).pdf", None, "630.00", Some("2379012345-60000000001"));
        let groups = group_slips(&[&a, &b]);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.documents.len(), 2);
        assert_eq!(group.canonical_value, dec("630"));
        assert_eq!(group.payment_barcode_digits.as_deref(), Some("237901234560000000001"));
    }

    #[test]
    fn test_slip_installments_are_summed() {
        let a = slip("parcela1.pdf", Some("2025/122"), "3125.00", Some("111"));
        let b = slip("parcela2.pdf", Some("122"), "3125.00", Some("222"));
        let groups = group_slips(&[&a, &b]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical_value, dec("6250"));
    }
}
