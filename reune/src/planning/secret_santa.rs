//! Secret Santa draw: a random derangement that avoids last year's pairs.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ReuneError};

pub const MAX_DRAW_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretSantaPair {
    pub giver_id: String,
    pub receiver_id: String,
}

pub fn validate_participants(participants: &[String]) -> Result<()> {
    if participants.len() < 2 {
        return Err(ReuneError::InvalidDraw(
            "É necessário pelo menos 2 participantes para realizar o sorteio.".to_string(),
        ));
    }

    let unique: HashSet<&str> = participants.iter().map(String::as_str).collect();
    if unique.len() != participants.len() {
        return Err(ReuneError::InvalidDraw(
            "Há participantes duplicados. Remova as duplicatas antes de sortear.".to_string(),
        ));
    }

    Ok(())
}

/// Assign every participant a receiver other than themselves. Pairs listed in
/// `previous_pairs` as `(giver, receiver)` are never repeated.
pub fn perform_draw<R: Rng + ?Sized>(
    participants: &[String],
    previous_pairs: Option<&HashSet<(String, String)>>,
    rng: &mut R,
) -> Result<Vec<SecretSantaPair>> {
    validate_participants(participants)?;

    let excluded = previous_pairs.filter(|pairs| !pairs.is_empty());
    let mut receivers: Vec<&String> = participants.iter().collect();

    for attempt in 1..=MAX_DRAW_ATTEMPTS {
        receivers.shuffle(rng);

        let acceptable = participants.iter().zip(&receivers).all(|(giver, receiver)| {
            giver != *receiver
                && !excluded.is_some_and(|pairs| {
                    pairs.contains(&(giver.clone(), (*receiver).clone()))
                })
        });

        if acceptable {
            tracing::debug!(attempt, participants = participants.len(), "Secret Santa draw found");
            return Ok(participants
                .iter()
                .zip(&receivers)
                .map(|(giver, receiver)| SecretSantaPair {
                    giver_id: giver.clone(),
                    receiver_id: (*receiver).clone(),
                })
                .collect());
        }
    }

    Err(ReuneError::DrawExhausted(
        "Não foi possível encontrar um sorteio válido após várias tentativas. Tente novamente."
            .to_string(),
    ))
}
