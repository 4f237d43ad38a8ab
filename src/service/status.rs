use bigdecimal::{BigDecimal, Zero};

use super::money::{difference, format_brl, tolerance};
use crate::models::ConciliationStatus;

/// 单个配对的判定结果
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: ConciliationStatus,
    pub divergence_text: String,
    pub difference: BigDecimal,
}

/// 根据发票金额、付款单金额和是否强制配对计算对账状态
pub fn evaluate(invoice_value: &BigDecimal, slip_value: &BigDecimal, forced: bool) -> Verdict {
    let has_invoice = *invoice_value > BigDecimal::zero();
    let has_slip = *slip_value > BigDecimal::zero();
    let diff = difference(invoice_value, slip_value);
    let within = diff.abs() <= tolerance();

    let (status, divergence_text) = match (has_invoice, has_slip) {
        (true, true) if within => (ConciliationStatus::Conciliado, String::new()),
        (true, true) if forced => (
            ConciliationStatus::DivergenteValor,
            format!(
                "Forced pairing with value divergence: invoice {} vs slip {} (difference {})",
                format_brl(invoice_value),
                format_brl(slip_value),
                format_brl(&diff)
            ),
        ),
        (true, true) => (
            ConciliationStatus::Divergente,
            format!(
                "Value divergence: invoice {} vs slip {} (difference {})",
                format_brl(invoice_value),
                format_brl(slip_value),
                format_brl(&diff)
            ),
        ),
        (false, true) if forced => (
            ConciliationStatus::PareadoForcado,
            format!(
                "Forced pairing by elimination: invoice value is {}, slip amount {}",
                format_brl(&BigDecimal::zero()),
                format_brl(slip_value)
            ),
        ),
        (false, true) => (
            ConciliationStatus::Conferir,
            format!(
                "Slip {} without invoice value, needs review",
                format_brl(slip_value)
            ),
        ),
        (true, false) => (
            ConciliationStatus::Conferir,
            format!(
                "Invoice {} has no slip for comparison",
                format_brl(invoice_value)
            ),
        ),
        (false, false) => (
            ConciliationStatus::Conferir,
            "No invoice or slip value found, needs review".to_string(),
        ),
    };

    Verdict {
        status,
        divergence_text,
        difference: diff,
    }
}
