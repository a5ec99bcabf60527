use std::sync::LazyLock;

use regex::Regex;

static WORD_HEADCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\w+(?:\s+e\s+\w+)?)\s+(?:pessoas?|convidados?|amigos?)\b")
        .expect("valid headcount words regex")
});

fn word_value(word: &str) -> Option<u32> {
    let value = match word {
        "um" | "uma" => 1,
        "dois" | "duas" => 2,
        "três" | "tres" => 3,
        "quatro" => 4,
        "cinco" => 5,
        "seis" => 6,
        "sete" => 7,
        "oito" => 8,
        "nove" => 9,
        "dez" => 10,
        "onze" => 11,
        "doze" => 12,
        "treze" => 13,
        "catorze" | "quatorze" => 14,
        "quinze" => 15,
        "dezesseis" => 16,
        "dezessete" => 17,
        "dezoito" => 18,
        "dezenove" => 19,
        "vinte" => 20,
        "trinta" => 30,
        "quarenta" => 40,
        "cinquenta" => 50,
        "sessenta" => 60,
        "setenta" => 70,
        "oitenta" => 80,
        "noventa" => 90,
        "cem" => 100,
        _ => return None,
    };
    Some(value)
}

/// Value of a spelled-out Portuguese number such as "vinte e cinco".
///
/// Every token must be a number word or the connective "e".
pub fn parse_number_words(phrase: &str) -> Option<u32> {
    let mut total = 0;
    let mut seen = false;
    for token in phrase.split_whitespace() {
        if token == "e" {
            continue;
        }
        total += word_value(token)?;
        seen = true;
    }
    seen.then_some(total)
}

/// Headcount written in words before "pessoas"/"convidados", e.g.
/// "vinte e cinco pessoas". Expects lowercased input.
pub fn headcount_from_words(text: &str) -> Option<u32> {
    WORD_HEADCOUNT
        .captures_iter(text)
        .find_map(|caps| parse_number_words(&caps[1]))
        .filter(|n| *n > 0)
}
