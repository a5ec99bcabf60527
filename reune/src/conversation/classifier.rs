use crate::models::{AnalysisContext, Intent, IntentClassification, MessageAnalysis};

pub const UNKNOWN_CONFIDENCE: f32 = 0.3;
pub const OUT_OF_DOMAIN_CONFIDENCE: f32 = 0.9;

fn replies(options: &[&str]) -> Option<Vec<String>> {
    Some(options.iter().map(|s| s.to_string()).collect())
}

/// Normalize the analyzer's intent into a classification for this turn.
///
/// The context is accepted for call-site symmetry with the analyzer; the
/// current rules only look at the analysis itself.
pub fn classify_intent(
    analysis: &MessageAnalysis,
    _context: Option<&AnalysisContext>,
) -> IntentClassification {
    let pass = |needs_clarification: bool, suggested_replies: Option<Vec<String>>| {
        IntentClassification {
            intent: analysis.intent,
            confidence: analysis.confidence,
            needs_clarification,
            suggested_replies,
        }
    };

    match analysis.intent {
        intent if intent.is_always_clear() => pass(false, None),
        Intent::CreateEvent => {
            let has_category = analysis.category.is_some();
            let has_subtype = analysis.subtype.is_some();

            if has_subtype && !has_category {
                pass(true, replies(&["Almoço", "Jantar", "Lanche"]))
            } else {
                // A category without headcount is fine: later turns supply it.
                pass(false, None)
            }
        }
        Intent::DefineMenu => pass(false, None),
        Intent::EditEvent => pass(
            false,
            replies(&["Mudar data", "Alterar quantidade", "Editar menu"]),
        ),
        Intent::OutOfDomain => IntentClassification {
            intent: Intent::OutOfDomain,
            confidence: OUT_OF_DOMAIN_CONFIDENCE,
            needs_clarification: false,
            suggested_replies: None,
        },
        _ => IntentClassification {
            intent: Intent::Unknown,
            confidence: UNKNOWN_CONFIDENCE,
            needs_clarification: true,
            suggested_replies: replies(&["Criar evento", "Ver meus eventos", "Ajuda"]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analysis(intent: Intent) -> MessageAnalysis {
        MessageAnalysis {
            intent,
            confidence: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn clear_intents_pass_through() {
        for intent in [
            Intent::ConfirmEvent,
            Intent::ShowItems,
            Intent::EndConversation,
        ] {
            let result = classify_intent(&analysis(intent), None);
            assert_eq!(result.intent, intent);
            assert_eq!(result.confidence, 0.8);
            assert!(!result.needs_clarification);
            assert_eq!(result.suggested_replies, None);
        }
    }

    #[test]
    fn subtype_without_category_asks_for_meal() {
        let input = MessageAnalysis {
            subtype: Some("churrasco".to_string()),
            ..analysis(Intent::CreateEvent)
        };
        let result = classify_intent(&input, None);
        assert!(result.needs_clarification);
        assert_eq!(
            result.suggested_replies,
            Some(vec![
                "Almoço".to_string(),
                "Jantar".to_string(),
                "Lanche".to_string()
            ])
        );
    }

    #[test]
    fn create_with_category_passes() {
        let input = MessageAnalysis {
            category: Some("jantar".to_string()),
            ..analysis(Intent::CreateEvent)
        };
        let result = classify_intent(&input, None);
        assert_eq!(result.intent, Intent::CreateEvent);
        assert!(!result.needs_clarification);

        let complete = MessageAnalysis {
            headcount: Some(12),
            ..input
        };
        assert!(!classify_intent(&complete, None).needs_clarification);
    }

    #[test]
    fn edit_offers_quick_replies() {
        let result = classify_intent(&analysis(Intent::EditEvent), None);
        assert!(!result.needs_clarification);
        assert_eq!(
            result.suggested_replies.map(|r| r.len()),
            Some(3)
        );
    }

    #[test]
    fn out_of_domain_is_confident() {
        let result = classify_intent(&analysis(Intent::OutOfDomain), None);
        assert_eq!(result.confidence, OUT_OF_DOMAIN_CONFIDENCE);
        assert!(!result.needs_clarification);
    }

    #[test]
    fn everything_else_becomes_unknown() {
        for intent in [Intent::Unknown, Intent::AddParticipants] {
            let result = classify_intent(&analysis(intent), None);
            assert_eq!(result.intent, Intent::Unknown);
            assert_eq!(result.confidence, UNKNOWN_CONFIDENCE);
            assert!(result.needs_clarification);
        }
    }
}
