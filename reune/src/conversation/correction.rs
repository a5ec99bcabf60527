use std::sync::LazyLock;

use regex::RegexSet;
use serde::Serialize;

use crate::models::{CollectedData, MessageAnalysis};

static CORRECTION_MARKERS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)não|nao|errado|na verdade|melhor|prefiro",
        r"(?i)na verdade é|na real é|não é isso|não era",
        r"(?i)quero mudar|mudar para|trocar para",
    ])
    .expect("valid correction markers")
});

static CONFUSION_MARKERS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)não entendi|não compreendi|não sei|confuso|perdid[oa]",
        r"(?i)como assim|o que|hein|ué",
        r"(?i)pode explicar|explica de novo|não ficou claro",
    ])
    .expect("valid confusion markers")
});

/// Field a user corrected relative to what was collected before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectedField {
    #[serde(rename = "categoria_evento")]
    Category,
    #[serde(rename = "qtd_pessoas")]
    Headcount,
    Menu,
}

impl CorrectedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "categoria_evento",
            Self::Headcount => "qtd_pessoas",
            Self::Menu => "menu",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Category => "Usuário corrigiu o tipo de evento",
            Self::Headcount => "Usuário corrigiu a quantidade de pessoas",
            Self::Menu => "Usuário corrigiu o cardápio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CorrectionResult {
    pub is_correction: bool,
    /// `None` with `is_correction` set means the user signalled a correction
    /// but nothing extracted differs from what was collected.
    pub corrected_field: Option<CorrectedField>,
    pub reason: Option<String>,
}

impl CorrectionResult {
    pub fn is_ambiguous(&self) -> bool {
        self.is_correction && self.corrected_field.is_none()
    }
}

fn differs<T: PartialEq>(current: &Option<T>, previous: &Option<T>) -> bool {
    matches!((current, previous), (Some(c), Some(p)) if c != p)
}

pub fn detect_correction(
    text: &str,
    current: &MessageAnalysis,
    previous: &CollectedData,
) -> CorrectionResult {
    if !CORRECTION_MARKERS.is_match(text) {
        return CorrectionResult::default();
    }

    let field = if differs(&current.category, &previous.category) {
        Some(CorrectedField::Category)
    } else if differs(&current.headcount.filter(|n| *n > 0), &previous.headcount) {
        Some(CorrectedField::Headcount)
    } else if differs(&current.menu, &previous.menu) {
        Some(CorrectedField::Menu)
    } else {
        None
    };

    CorrectionResult {
        is_correction: true,
        corrected_field: field,
        reason: field.map(|f| f.reason().to_string()),
    }
}

pub fn detect_confusion(text: &str) -> bool {
    CONFUSION_MARKERS.is_match(text)
}

pub fn generate_correction_response(field: Option<CorrectedField>) -> &'static str {
    match field {
        Some(CorrectedField::Category) => "Ah, entendi! Vamos ajustar o tipo então.",
        Some(CorrectedField::Headcount) => "Certo! Vou ajustar a quantidade.",
        Some(CorrectedField::Menu) => "Beleza! Vou atualizar o cardápio.",
        None => "Entendido! Vou ajustar isso pra você.",
    }
}
