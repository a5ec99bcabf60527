//! Prompt templates for the chat model.
//!
//! The assistant talks to Brazilian users, so prompts are written in
//! Portuguese and ask for the platform's field names.

use crate::models::AnalysisContext;

/// System prompt for turning one user utterance into a `MessageAnalysis`.
///
/// Known event facts are listed so the model can resolve follow-ups such as
/// "muda para 30".
///
/// # Example
/// ```
/// use reune::llm::prompts::message_analysis_prompt;
/// use reune::models::AnalysisContext;
///
/// let prompt = message_analysis_prompt(&AnalysisContext::default());
/// assert!(prompt.contains("Nenhum evento em andamento"));
/// ```
pub fn message_analysis_prompt(context: &AnalysisContext) -> String {
    format!(
        r#"Você é um analisador semântico especializado em extrair informações de eventos sociais.

TAREFA:
Analise a mensagem do usuário e extraia TODAS as informações relevantes sobre o evento, sempre retornando JSON 100% válido.

ESTRUTURA HIERÁRQUICA DE EVENTOS:
- categoria_evento: forma social (almoço, jantar, lanche, piquenique, café da manhã, brunch)
- subtipo_evento: estilo culinário (churrasco, feijoada, pizza, fondue, lasanha, sushi)
- finalidade_evento: motivo emocional (aniversário, encontro de amigos, confraternização, celebração)
- menu: prato principal específico (lasanha, carnes, massas, frutos do mar)

INTENÇÕES POSSÍVEIS:
- criar_evento
- definir_menu
- confirmar_evento
- mostrar_itens
- editar_evento
- adicionar_participantes
- encerrar_conversa
- out_of_domain
- desconhecida

REGRAS DE EXTRAÇÃO:
1. "churrasco" é subtipo_evento; categoria_evento deve ser inferida (geralmente "almoço").
2. "jantar" é categoria_evento, não subtipo.
3. Se mencionar apenas prato (ex: "lasanha"), classifique como menu.
4. Datas aceitas: dd/mm/yyyy, dd/mm, "dia X de mês", ou formato ISO.
5. Horários: formato 24h, "19h", "7 da noite".
6. Quantidade de pessoas: números seguidos de palavras como "pessoas" ou "convidados".

CONTEXTO ATUAL DO EVENTO:
{context}

FORMATO DE SAÍDA:
Retorne apenas JSON puro (sem markdown, sem explicações).
O JSON deve seguir EXATAMENTE o formato abaixo:

{{
  "intencao": "criar_evento",
  "categoria_evento": "almoço",
  "subtipo_evento": "churrasco",
  "finalidade_evento": null,
  "menu": null,
  "qtd_pessoas": 10,
  "data_evento": "2025-12-25",
  "hora_evento": "12:00",
  "inclui_bebidas": true,
  "inclui_entradas": false,
  "nivel_confianca": 0.92
}}

Se algum dado não for encontrado, use null."#,
        context = context_lines(context)
    )
}

fn context_lines(context: &AnalysisContext) -> String {
    let mut lines = Vec::new();

    match context.event_type.as_deref().filter(|t| !t.is_empty()) {
        Some(event_type) => lines.push(format!("Tipo: {event_type}")),
        None => lines.push("Nenhum evento em andamento".to_string()),
    }
    if let Some(headcount) = context.headcount.filter(|n| *n > 0) {
        lines.push(format!("Pessoas: {headcount}"));
    }
    if let Some(date) = context.date.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Data: {date}"));
    }
    if let Some(menu) = context.menu.as_deref().filter(|m| !m.is_empty()) {
        lines.push(format!("Menu: {menu}"));
    }
    if let Some(status) = context.event_status.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Status: {status}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_without_context() {
        let prompt = message_analysis_prompt(&AnalysisContext::default());
        assert!(prompt.contains("Nenhum evento em andamento"));
        assert!(!prompt.contains("Pessoas:"));
        assert!(prompt.contains("\"nivel_confianca\": 0.92"));
    }

    #[test]
    fn test_analysis_prompt_lists_known_fields() {
        let context = AnalysisContext {
            event_type: Some("churrasco".to_string()),
            headcount: Some(20),
            date: Some("2025-12-20".to_string()),
            menu: None,
            event_status: Some("collecting_core".to_string()),
        };
        let prompt = message_analysis_prompt(&context);
        assert!(prompt.contains("Tipo: churrasco"));
        assert!(prompt.contains("Pessoas: 20"));
        assert!(prompt.contains("Data: 2025-12-20"));
        assert!(prompt.contains("Status: collecting_core"));
        assert!(!prompt.contains("Menu:"));
        assert!(!prompt.contains("Nenhum evento em andamento"));
    }
}
