//! Canned assistant phrasings, three per situation.

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;
use regex::{Captures, Regex};

use crate::models::CollectedData;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Greeting,
    AskEventType,
    AskHeadcount,
    AskCategory,
    AskMenu,
    AskDate,
    ConfirmEvent,
    MenuConfirmed,
    ItemsGenerated,
    ItemsConfirmed,
    EventFinalized,
    ContextDrift,
    Ambiguity,
    InvalidData,
    Noise,
    OutOfScope,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 16] = [
        Self::Greeting,
        Self::AskEventType,
        Self::AskHeadcount,
        Self::AskCategory,
        Self::AskMenu,
        Self::AskDate,
        Self::ConfirmEvent,
        Self::MenuConfirmed,
        Self::ItemsGenerated,
        Self::ItemsConfirmed,
        Self::EventFinalized,
        Self::ContextDrift,
        Self::Ambiguity,
        Self::InvalidData,
        Self::Noise,
        Self::OutOfScope,
    ];

    pub fn texts(&self) -> &'static [&'static str; 3] {
        match self {
            Self::Greeting => &[
                "Olá! Sou o UNE.AI e vou ajudar a organizar seu evento. Me conta: que tipo de encontro você está planejando e quantas pessoas vão?",
                "Oi! Vou te ajudar com seu evento. Qual o tipo de reunião e quantas pessoas participam?",
                "E aí! Vamos planejar seu evento juntos. Me fala: é um jantar, churrasco, festa? E quantas pessoas?",
            ],
            Self::AskEventType => &[
                "Que tipo de evento você quer organizar?",
                "Me conta: que tipo de evento vai ser?",
                "Qual vai ser o estilo do evento?",
            ],
            Self::AskHeadcount => &[
                "Ótimo! {{categoria_evento}} é uma boa escolha. Quantas pessoas vão?",
                "Combinado! E quantas pessoas participam desse {{categoria_evento}}?",
                "Perfeito! Quantos amigos vão estar no {{categoria_evento}}?",
            ],
            Self::AskCategory => &[
                "Show! {{subtipo_evento}} é ótimo. Vai ser no almoço, jantar ou lanche?",
                "Perfeito! {{subtipo_evento}} combina. Qual o período: almoço, jantar ou lanche?",
                "Legal! {{subtipo_evento}} é uma boa pedida. Me diz: almoço, jantar ou lanche?",
            ],
            Self::AskMenu => &[
                "Show! E o que vai ter de comida? Me conta o cardápio.",
                "Beleza! Qual vai ser o menu? Pode falar o que você tá pensando.",
                "Vamos lá! O que vocês vão comer? Me diz o cardápio.",
            ],
            Self::AskDate => &[
                "Ótimo! {{categoria_evento}} para {{qtd_pessoas}} pessoas. Qual vai ser a data?",
                "Show! E quando vai ser? Me passa a data.",
                "Perfeito! Qual a data que você tá pensando?",
            ],
            Self::ConfirmEvent => &[
                "Beleza! {{categoria_evento}} para {{qtd_pessoas}} pessoas. Vou montar a lista de itens, tá?",
                "Ótimo! Um {{categoria_evento}} para {{qtd_pessoas}} pessoas. Vamos gerar os preparativos?",
                "Show! Tenho tudo aqui. Posso sugerir a lista de itens agora?",
            ],
            Self::MenuConfirmed => &[
                "Boa escolha! {{menu}} vai ficar ótimo. Qual a data do evento?",
                "Perfeito! {{menu}} combina muito. Me passa a data agora?",
                "Legal! {{menu}} é uma boa. Quando vai ser?",
            ],
            Self::ItemsGenerated => &[
                "Pronto! 🎉 Olha só a lista completa pro {{categoria_evento}} de {{qtd_pessoas}} pessoas. O que achou?",
                "Feito! ✨ Montei tudo pro {{categoria_evento}} com {{qtd_pessoas}} pessoas. Dá uma conferida!",
                "Show! 🎊 Aqui está sua lista pro {{categoria_evento}} de {{qtd_pessoas}} pessoas. Tá bom assim?",
            ],
            Self::ItemsConfirmed => &[
                "Ótimo! Lista aprovada. Quer adicionar os participantes agora?",
                "Perfeito! ✅ Vamos dividir entre os participantes?",
                "Show! Itens OK. Bora adicionar a galera?",
            ],
            Self::EventFinalized => &[
                "Pronto! 🎊 Evento confirmado. Agora é só aproveitar!",
                "Feito! ✅ Tudo certo pro seu evento. Pode comemorar!",
                "Show! 🎉 Evento criado com sucesso. Bom demais!",
            ],
            Self::ContextDrift => &[
                "Haha, adorei! Mas vamos focar no evento? Me conta o que você quer organizar.",
                "Legal! Mas quero saber mais sobre o seu evento. O que vai ser?",
                "Boa! Mas bora planejar o evento? Me fala mais sobre ele.",
            ],
            Self::Ambiguity => &[
                "Entendi, mas fiquei na dúvida. É almoço, jantar ou outro tipo?",
                "Hmm, não tenho certeza. Pode me dar mais detalhes?",
                "Quase lá! Me explica melhor o que você tem em mente?",
            ],
            Self::InvalidData => &[
                "Hmm, esse dado parece estranho. Pode revisar?",
                "Ops! Esse número não parece certo. Vamos tentar de novo?",
                "Acho que algo não bateu. Pode verificar?",
            ],
            Self::Noise => &[
                "Haha, adorei! Agora, bora planejar o evento?",
                "Legal! E aí, qual evento você quer criar?",
                "Muito bom! Mas me conta: o que vamos organizar?",
            ],
            Self::OutOfScope => &[
                "Opa, não manjo muito disso. Meu negócio é planejar eventos. Vamos voltar pro assunto?",
                "Hmm, essa fugiu um pouco. Sou especialista em eventos. Bora focar nisso?",
                "Essa não é minha praia. Mas posso te ajudar com o evento. Vamos lá?",
            ],
        }
    }
}

/// Values available to `{{placeholder}}` substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl From<&CollectedData> for TemplateContext {
    fn from(data: &CollectedData) -> Self {
        let mut ctx = Self::new();
        // Templates talk about the "categoria"; a bare subtype stands in for it.
        if let Some(kind) = data.display_kind() {
            ctx = ctx.with("categoria_evento", kind);
        }
        if let Some(subtype) = &data.subtype {
            ctx = ctx.with("subtipo_evento", subtype);
        }
        if let Some(menu) = &data.menu {
            ctx = ctx.with("menu", menu);
        }
        if let Some(headcount) = data.headcount {
            ctx = ctx.with("qtd_pessoas", headcount);
        }
        if let Some(date) = &data.date {
            ctx = ctx.with("data_evento", date);
        }
        if let Some(time) = &data.time {
            ctx = ctx.with("hora_evento", time);
        }
        ctx
    }
}

/// Substitute `{{key}}` placeholders. Missing or empty values leave the
/// placeholder untouched.
pub fn fill_template(template: &str, ctx: &TemplateContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            ctx.get(&caps[1])
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn random_template<R: Rng + ?Sized>(
    category: TemplateCategory,
    ctx: &TemplateContext,
    rng: &mut R,
) -> String {
    let texts = category.texts();
    let index = rng.gen_range(0..texts.len());
    fill_template(texts[index], ctx)
}

/// Phrasing at `index`, or a random one when the index is out of range.
pub fn template<R: Rng + ?Sized>(
    category: TemplateCategory,
    index: usize,
    ctx: &TemplateContext,
    rng: &mut R,
) -> String {
    match category.texts().get(index) {
        Some(text) => fill_template(text, ctx),
        None => random_template(category, ctx, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_category_has_three_phrasings() {
        for category in TemplateCategory::ALL {
            assert!(category.texts().iter().all(|t| !t.is_empty()));
        }
    }

    #[test]
    fn fills_known_placeholders() {
        let ctx = TemplateContext::new()
            .with("categoria_evento", "jantar")
            .with("qtd_pessoas", 12);
        let mut rng = StdRng::seed_from_u64(7);
        let text = template(TemplateCategory::AskDate, 0, &ctx, &mut rng);
        assert_eq!(text, "Ótimo! jantar para 12 pessoas. Qual vai ser a data?");
    }

    #[test]
    fn unknown_or_empty_placeholders_stay_literal() {
        let ctx = TemplateContext::new().with("menu", "");
        assert_eq!(
            fill_template("{{menu}} e {{sobremesa}}", &ctx),
            "{{menu}} e {{sobremesa}}"
        );
    }

    #[test]
    fn out_of_range_index_falls_back_to_random() {
        let ctx = TemplateContext::new();
        let mut rng = StdRng::seed_from_u64(1);
        let text = template(TemplateCategory::AskMenu, 9, &ctx, &mut rng);
        assert!(TemplateCategory::AskMenu.texts().contains(&text.as_str()));
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let ctx = TemplateContext::new();
        let a = random_template(
            TemplateCategory::Greeting,
            &ctx,
            &mut StdRng::seed_from_u64(42),
        );
        let b = random_template(
            TemplateCategory::Greeting,
            &ctx,
            &mut StdRng::seed_from_u64(42),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn collected_data_feeds_the_context() {
        let data = CollectedData {
            subtype: Some("churrasco".to_string()),
            headcount: Some(20),
            ..Default::default()
        };
        let ctx = TemplateContext::from(&data);
        assert_eq!(ctx.get("categoria_evento"), Some("churrasco"));
        assert_eq!(ctx.get("qtd_pessoas"), Some("20"));
    }
}
