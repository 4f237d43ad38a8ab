use serde::{Deserialize, Serialize};

use crate::models::{DocumentFields, RawDocument};

/// 文档在配对中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTag {
    Invoice,
    PaymentSlip,
    /// 行政类/辅助文档, 不参与配对
    Auxiliary,
}

/// 单条分类规则: 文件名或文本片段包含 pattern (忽略大小写) 即命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub pattern: String,
    pub tag: DocumentTag,
}

impl ClassifierRule {
    pub fn new(pattern: &str, tag: DocumentTag) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            tag,
        }
    }
}

/// 有序分类规则表 - 启动时构建一次, 之后只读
///
/// 规则只作用于 `RawDocument::Other`; 发票和付款单由提取层直接确定类型。
/// 先命中者优先, 无规则命中的其他文档视为辅助文档。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ClassifierRule>", into = "Vec<ClassifierRule>")]
pub struct ClassifierRules {
    rules: Vec<ClassifierRule>,
}

impl From<Vec<ClassifierRule>> for ClassifierRules {
    fn from(rules: Vec<ClassifierRule>) -> Self {
        Self::new(rules)
    }
}

impl From<ClassifierRules> for Vec<ClassifierRule> {
    fn from(rules: ClassifierRules) -> Self {
        rules.rules
    }
}

impl ClassifierRules {
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| ClassifierRule::new(&r.pattern, r.tag))
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    pub fn classify(&self, doc: &RawDocument) -> DocumentTag {
        match doc {
            RawDocument::Invoice(_) => DocumentTag::Invoice,
            RawDocument::PaymentSlip(_) => DocumentTag::PaymentSlip,
            RawDocument::Other(other) => {
                let haystack = format!(
                    "{} {}",
                    other.source_filename(),
                    other.raw_text_snippet().unwrap_or_default()
                )
                .to_lowercase();

                self.rules
                    .iter()
                    .find(|rule| !rule.pattern.is_empty() && haystack.contains(&rule.pattern))
                    .map(|rule| rule.tag)
                    .unwrap_or(DocumentTag::Auxiliary)
            }
        }
    }
}

impl Default for ClassifierRules {
    /// 行政类关键字排在前面: "comprovante de pagamento do boleto" 属于辅助文档
    fn default() -> Self {
        use DocumentTag::*;
        Self::new(vec![
            ClassifierRule::new("comprovante", Auxiliary),
            ClassifierRule::new("recibo", Auxiliary),
            ClassifierRule::new("relatorio", Auxiliary),
            ClassifierRule::new("relatório", Auxiliary),
            ClassifierRule::new("contrato", Auxiliary),
            ClassifierRule::new("boleto", PaymentSlip),
            ClassifierRule::new("linha digitavel", PaymentSlip),
            ClassifierRule::new("linha digitável", PaymentSlip),
            ClassifierRule::new("ficha de compensacao", PaymentSlip),
            ClassifierRule::new("nfse", Invoice),
            ClassifierRule::new("nfs-e", Invoice),
            ClassifierRule::new("danfe", Invoice),
            ClassifierRule::new("nota fiscal", Invoice),
            ClassifierRule::new("fatura", Invoice),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceDocument, OtherDocument};

    fn other(filename: &str, snippet: Option<&str>) -> RawDocument {
        RawDocument::Other(OtherDocument {
            source_filename: filename.to_string(),
            raw_text_snippet: snippet.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn test_typed_documents_keep_their_kind() {
        let rules = ClassifierRules::default();
        let doc = RawDocument::Invoice(InvoiceDocument {
            source_filename: "comprovante.pdf".to_string(),
            ..Default::default()
        });
        assert_eq!(rules.classify(&doc), DocumentTag::Invoice);
    }

    #[test]
    fn test_first_rule_wins() {
        let rules = ClassifierRules::default();
        let doc = other("Comprovante_Boleto_123.pdf", None);
        assert_eq!(rules.classify(&doc), DocumentTag::Auxiliary);

        let doc = other("anexo.pdf", Some("BOLETO BANCARIO - Linha digitável"));
        assert_eq!(rules.classify(&doc), DocumentTag::PaymentSlip);
    }

    #[test]
    fn test_unmatched_other_is_auxiliary() {
        let rules = ClassifierRules::new(vec![ClassifierRule::new("DANFE", DocumentTag::Invoice)]);
        assert_eq!(rules.classify(&other("foto.jpg", None)), DocumentTag::Auxiliary);
        assert_eq!(rules.classify(&other("danfe_55.pdf", None)), DocumentTag::Invoice);
    }
}
