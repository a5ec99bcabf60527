//! Two-stage message analysis: chat model first, keyword heuristics second.

use std::future::Future;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::error::{ReuneError, Result};
use crate::llm::prompts::message_analysis_prompt;
use crate::llm::{ChatMessage, ChatModel, ChatRequest};
use crate::models::{AnalysisContext, Intent, MessageAnalysis};
use crate::nlp::{headcount_from_words, parse_to_iso_date};

/// Confidence reported by the keyword path.
pub const FALLBACK_CONFIDENCE: f32 = 0.6;
pub const DEFAULT_MODEL_CONFIDENCE: f32 = 0.5;
const ANALYSIS_TEMPERATURE: f32 = 0.3;

macro_rules! lexicon {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect(concat!("valid regex: ", stringify!($name))));
    };
}

lexicon!(
    CONFIRM,
    r"(?i)\b(sim|ok|confirma|confirmar|beleza|perfeito|pode seguir|pode confirmar|isso|bora|quero|tá ótimo|ta otimo|está ótimo|esta otimo|lista ok|confirmar lista|confirmar itens)\b"
);
lexicon!(SHOW_ITEMS, r"(?i)\b(itens|lista|mostrar|mostra|mostre)\b");
lexicon!(EDIT, r"(?i)\b(editar|mudar|alterar|modificar|ajustar)\b");
lexicon!(END, r"(?i)\b(tchau|até|obrigado|valeu|flw)\b");
lexicon!(
    CREATE,
    r"(?i)\b(churrasco|jantar|almoço|almoco|piquenique|festa|pizza|feijoada)\b"
);
lexicon!(PARTICIPANTS, r"(?i)\b(participante|pessoas|convidado|dividir)\b");
lexicon!(MENU_INTENT, r"(?i)\b(lasanha|massa|carne|frango|peixe|sushi)\b");

lexicon!(
    CATEGORY,
    r"(?i)\b(jantar|almoço|almoco|lanche|piquenique|café da manhã|cafe da manha|brunch)\b"
);
lexicon!(
    SUBTYPE,
    r"(?i)\b(churrasco|feijoada|pizza|fondue|lasanha|sushi)\b"
);
lexicon!(
    MENU,
    r"(?i)\b(lasanha|massa|massas|carne|carnes|frango|peixe|sushi|frutos do mar)\b"
);
lexicon!(
    HEADCOUNT,
    r"(?i)\b(\d+)\s*(pessoa|pessoas|convidado|convidados)\b"
);
lexicon!(
    DATE,
    r"(?i)\b(\d{1,2}/\d{1,2}(?:/\d{2,4})?|\d{4}-\d{2}-\d{2})\b"
);
lexicon!(
    TIME,
    r"(?i)\b(\d{1,2})\s*(h|horas|da\s+noite|da\s+manhã|da\s+tarde)\b"
);
lexicon!(DRINKS, r"(?i)\b(cerveja|refrigerante|vinho|bebida)\b");
lexicon!(STARTERS, r"(?i)\b(salgadinho|petisco|entrada|aperitivo)\b");

/// Intent lexicons in the order they are tried.
fn intent_rules() -> [(&'static Regex, Intent); 7] {
    [
        (&*CONFIRM, Intent::ConfirmEvent),
        (&*SHOW_ITEMS, Intent::ShowItems),
        (&*EDIT, Intent::EditEvent),
        (&*END, Intent::EndConversation),
        (&*CREATE, Intent::CreateEvent),
        (&*PARTICIPANTS, Intent::AddParticipants),
        (&*MENU_INTENT, Intent::DefineMenu),
    ]
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Keyword analysis of `text`. Deterministic and side-effect free.
pub fn fallback_analysis(text: &str) -> MessageAnalysis {
    let lower = text.trim().to_lowercase();

    let intent = intent_rules()
        .into_iter()
        .find(|(re, _)| re.is_match(&lower))
        .map(|(_, intent)| intent)
        .unwrap_or(Intent::Unknown);

    let headcount = HEADCOUNT
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .or_else(|| headcount_from_words(&lower));

    let date = DATE
        .captures(text)
        .and_then(|caps| parse_to_iso_date(&caps[1]));

    MessageAnalysis {
        intent,
        category: first_capture(&CATEGORY, &lower),
        subtype: first_capture(&SUBTYPE, &lower),
        purpose: None,
        menu: first_capture(&MENU, &lower),
        headcount,
        date,
        time: TIME.captures(text).map(|caps| caps[1].to_string()),
        includes_drinks: Some(DRINKS.is_match(&lower)),
        includes_starters: Some(STARTERS.is_match(&lower)),
        confidence: FALLBACK_CONFIDENCE,
    }
}

/// Model output before normalization. Every field is optional so partial
/// answers still parse.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    intencao: Option<String>,
    #[serde(default)]
    categoria_evento: Option<String>,
    #[serde(default)]
    subtipo_evento: Option<String>,
    #[serde(default)]
    finalidade_evento: Option<String>,
    #[serde(default)]
    menu: Option<String>,
    #[serde(default)]
    qtd_pessoas: Option<f64>,
    #[serde(default)]
    data_evento: Option<String>,
    #[serde(default)]
    hora_evento: Option<String>,
    #[serde(default)]
    inclui_bebidas: Option<bool>,
    #[serde(default)]
    inclui_entradas: Option<bool>,
    #[serde(default)]
    nivel_confianca: Option<f32>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Slice the first JSON object out of a model reply and normalize it.
pub fn parse_model_reply(content: &str) -> Result<MessageAnalysis> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(ReuneError::Llm(
                "Model reply contained no JSON object".to_string(),
            ))
        }
    };

    let raw: RawAnalysis = serde_json::from_str(json)?;

    let confidence = raw.nivel_confianca.unwrap_or(DEFAULT_MODEL_CONFIDENCE);
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ReuneError::Llm(format!(
            "Model confidence out of range: {confidence}"
        )));
    }

    let intent = raw
        .intencao
        .as_deref()
        .and_then(|s| s.parse::<Intent>().ok())
        .unwrap_or(Intent::Unknown);

    let date = raw
        .data_evento
        .as_deref()
        .and_then(parse_to_iso_date);

    Ok(MessageAnalysis {
        intent,
        category: normalize(raw.categoria_evento),
        subtype: normalize(raw.subtipo_evento),
        purpose: normalize(raw.finalidade_evento),
        menu: normalize(raw.menu),
        headcount: raw
            .qtd_pessoas
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map(|n| n.round() as u32),
        date,
        time: raw.hora_evento.filter(|h| !h.trim().is_empty()),
        includes_drinks: raw.inclui_bebidas,
        includes_starters: raw.inclui_entradas,
        confidence,
    })
}

/// Await `primary`; on error log a warning and use `fallback` instead.
pub async fn try_or_fallback<T, Fut, F>(stage: &str, primary: Fut, fallback: F) -> T
where
    Fut: Future<Output = Result<T>>,
    F: FnOnce() -> T,
{
    match primary.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(stage, error = %e, "Primary stage failed, using fallback");
            fallback()
        }
    }
}

/// Extracts a `MessageAnalysis` from a user utterance.
#[derive(Clone)]
pub struct MessageAnalyzer {
    model: Option<Arc<dyn ChatModel>>,
}

impl MessageAnalyzer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Analyzer that never calls a model.
    pub fn heuristic_only() -> Self {
        Self { model: None }
    }

    pub fn uses_model(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.is_available())
    }

    pub async fn analyze(&self, text: &str, context: &AnalysisContext) -> MessageAnalysis {
        self.analyze_in_conversation(text, context, &[]).await
    }

    /// Same as [`analyze`](Self::analyze), with earlier turns handed to the
    /// model ahead of the utterance.
    pub async fn analyze_in_conversation(
        &self,
        text: &str,
        context: &AnalysisContext,
        history: &[ChatMessage],
    ) -> MessageAnalysis {
        let Some(model) = self.model.as_ref().filter(|m| m.is_available()) else {
            return fallback_analysis(text);
        };

        try_or_fallback(
            "message_analysis",
            Self::analyze_with_model(model.as_ref(), text, context, history),
            || fallback_analysis(text),
        )
        .await
    }

    async fn analyze_with_model(
        model: &dyn ChatModel,
        text: &str,
        context: &AnalysisContext,
        history: &[ChatMessage],
    ) -> Result<MessageAnalysis> {
        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(text));

        let reply = model
            .chat(ChatRequest {
                system_prompt: Some(message_analysis_prompt(context)),
                messages,
                temperature: Some(ANALYSIS_TEMPERATURE),
                tools: Vec::new(),
            })
            .await?;

        let content = reply
            .content
            .ok_or_else(|| ReuneError::Llm("Model reply had no text content".to_string()))?;

        let analysis = parse_model_reply(&content)?;
        tracing::debug!(
            intent = %analysis.intent,
            confidence = analysis.confidence,
            "Message analyzed by model"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fallback_reads_churrasco_request() {
        let analysis = fallback_analysis("Churrasco para 20 pessoas sábado às 14h");
        assert_eq!(analysis.intent, Intent::CreateEvent);
        assert_eq!(analysis.subtype.as_deref(), Some("churrasco"));
        assert_eq!(analysis.category, None);
        assert_eq!(analysis.headcount, Some(20));
        assert_eq!(analysis.time.as_deref(), Some("14"));
        assert_eq!(analysis.includes_drinks, Some(false));
        assert_eq!(analysis.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn fallback_intent_order() {
        assert_eq!(fallback_analysis("Sim, pode confirmar").intent, Intent::ConfirmEvent);
        assert_eq!(fallback_analysis("mostra a lista").intent, Intent::ShowItems);
        assert_eq!(fallback_analysis("quero mudar a data").intent, Intent::ConfirmEvent);
        assert_eq!(fallback_analysis("preciso alterar a data").intent, Intent::EditEvent);
        assert_eq!(fallback_analysis("valeu, tchau").intent, Intent::EndConversation);
        assert_eq!(
            fallback_analysis("vamos dividir entre os convidados").intent,
            Intent::AddParticipants
        );
        assert_eq!(fallback_analysis("vai ter lasanha").intent, Intent::DefineMenu);
        assert_eq!(fallback_analysis("qual a capital da frança").intent, Intent::Unknown);
    }

    #[test]
    fn fallback_extracts_fields() {
        let analysis =
            fallback_analysis("Jantar de frutos do mar dia 20/12 com vinho e petiscos às 20 horas");
        assert_eq!(analysis.category.as_deref(), Some("jantar"));
        assert_eq!(analysis.menu.as_deref(), Some("frutos do mar"));
        assert!(analysis
            .date
            .as_deref()
            .is_some_and(|d| d.ends_with("-12-20")));
        assert_eq!(analysis.time.as_deref(), Some("20"));
        assert_eq!(analysis.includes_drinks, Some(true));
        assert_eq!(analysis.includes_starters, Some(false));
    }

    #[test]
    fn fallback_headcount_from_words() {
        let analysis = fallback_analysis("almoço para vinte e cinco pessoas");
        assert_eq!(analysis.headcount, Some(25));
    }

    #[test]
    fn model_reply_is_sliced_and_normalized() {
        let reply = r#"Claro! Aqui está:
```json
{"intencao": "criar_evento", "categoria_evento": " Almoço ", "subtipo_evento": "CHURRASCO",
 "qtd_pessoas": 15, "data_evento": "20/12/2030", "hora_evento": "12:00",
 "inclui_bebidas": true, "inclui_entradas": null, "nivel_confianca": 0.92}
```"#;
        let analysis = parse_model_reply(reply).expect("parsed");
        assert_eq!(analysis.intent, Intent::CreateEvent);
        assert_eq!(analysis.category.as_deref(), Some("almoço"));
        assert_eq!(analysis.subtype.as_deref(), Some("churrasco"));
        assert_eq!(analysis.headcount, Some(15));
        assert_eq!(analysis.date.as_deref(), Some("2030-12-20"));
        assert_eq!(analysis.includes_starters, None);
        assert_eq!(analysis.confidence, 0.92);
    }

    #[test]
    fn model_reply_defaults() {
        let analysis = parse_model_reply(r#"{"intencao": "pedir_musica"}"#).expect("parsed");
        assert_eq!(analysis.intent, Intent::Unknown);
        assert_eq!(analysis.confidence, DEFAULT_MODEL_CONFIDENCE);
    }

    #[test]
    fn model_reply_rejects_bad_output() {
        assert!(parse_model_reply("não sei").is_err());
        assert!(parse_model_reply(r#"{"intencao": "criar_evento", "nivel_confianca": 3}"#).is_err());
        assert!(parse_model_reply("{ quebrado }").is_err());
    }

    #[tokio::test]
    async fn heuristic_only_analyzer_uses_keywords() {
        let analyzer = MessageAnalyzer::heuristic_only();
        assert!(!analyzer.uses_model());
        let analysis = analyzer
            .analyze("pizza para 8 pessoas", &AnalysisContext::default())
            .await;
        assert_eq!(analysis.intent, Intent::CreateEvent);
        assert_eq!(analysis.headcount, Some(8));
    }
}
