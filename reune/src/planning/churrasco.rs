//! Per-person coefficient model for a barbecue shopping list.

use crate::models::{ItemPriority, SuggestedItem};

/// kg of meat per guest.
pub const MEAT_PER_PERSON: f64 = 0.4;
/// kg of sausage per guest.
pub const SAUSAGE_PER_PERSON: f64 = 0.15;
pub const GARLIC_BREAD_PER_PERSON: f64 = 2.0;
pub const CHEESE_SKEWERS_PER_PERSON: f64 = 1.0;
/// Litres.
pub const BEER_PER_PERSON: f64 = 1.5;
pub const SODA_PER_PERSON: f64 = 0.5;
pub const WATER_PER_PERSON: f64 = 0.5;
/// kg of charcoal per kg of meat and sausage.
pub const CHARCOAL_PER_KG: f64 = 1.5;
pub const COARSE_SALT_KG: f64 = 1.0;

/// Shares of the total meat mass.
pub const PICANHA_SHARE: f64 = 0.4;
pub const WINGS_SHARE: f64 = 0.3;

struct Line {
    name: &'static str,
    unit: &'static str,
    category: &'static str,
    priority: ItemPriority,
    /// BRL per unit.
    unit_price: f64,
}

const PICANHA: Line = Line {
    name: "Picanha",
    unit: "kg",
    category: "Carnes",
    priority: ItemPriority::A,
    unit_price: 79.90,
};
const SAUSAGE: Line = Line {
    name: "Linguiça Toscana",
    unit: "kg",
    category: "Carnes",
    priority: ItemPriority::A,
    unit_price: 24.90,
};
const WINGS: Line = Line {
    name: "Asa de Frango",
    unit: "kg",
    category: "Carnes",
    priority: ItemPriority::B,
    unit_price: 19.90,
};
const GARLIC_BREAD: Line = Line {
    name: "Pão de Alho",
    unit: "un",
    category: "Acompanhamentos",
    priority: ItemPriority::B,
    unit_price: 3.50,
};
const CHEESE: Line = Line {
    name: "Queijo Coalho",
    unit: "un",
    category: "Acompanhamentos",
    priority: ItemPriority::C,
    unit_price: 4.50,
};
const BEER: Line = Line {
    name: "Cerveja",
    unit: "L",
    category: "Bebidas",
    priority: ItemPriority::B,
    unit_price: 8.90,
};
const SODA: Line = Line {
    name: "Refrigerante",
    unit: "L",
    category: "Bebidas",
    priority: ItemPriority::B,
    unit_price: 5.50,
};
const WATER: Line = Line {
    name: "Água",
    unit: "L",
    category: "Bebidas",
    priority: ItemPriority::A,
    unit_price: 2.50,
};
const CHARCOAL: Line = Line {
    name: "Carvão",
    unit: "kg",
    category: "Utensílios",
    priority: ItemPriority::A,
    unit_price: 7.90,
};
const COARSE_SALT: Line = Line {
    name: "Sal Grosso",
    unit: "kg",
    category: "Temperos",
    priority: ItemPriority::A,
    unit_price: 4.90,
};

/// Plain ceiling. Products such as `20 * 0.15` land a hair above the integer
/// and round up to the next unit.
fn ceil_quantity(quantity: f64) -> f64 {
    quantity.ceil().max(0.0)
}

fn to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Line {
    fn suggest(&self, raw_quantity: f64) -> SuggestedItem {
        let quantity = ceil_quantity(raw_quantity);
        SuggestedItem {
            name: self.name.to_string(),
            quantity,
            unit: self.unit.to_string(),
            category: self.category.to_string(),
            priority: self.priority,
            estimated_value: to_cents(quantity * self.unit_price),
        }
    }
}

/// Shopping list for `headcount` guests. Every quantity is rounded up so the
/// list never under-provisions.
pub fn estimate(headcount: u32) -> Vec<SuggestedItem> {
    let people = f64::from(headcount);
    let meat = people * MEAT_PER_PERSON;
    let sausage = people * SAUSAGE_PER_PERSON;

    vec![
        PICANHA.suggest(meat * PICANHA_SHARE),
        SAUSAGE.suggest(sausage),
        WINGS.suggest(meat * WINGS_SHARE),
        GARLIC_BREAD.suggest(people * GARLIC_BREAD_PER_PERSON),
        CHEESE.suggest(people * CHEESE_SKEWERS_PER_PERSON),
        BEER.suggest(people * BEER_PER_PERSON),
        SODA.suggest(people * SODA_PER_PERSON),
        WATER.suggest(people * WATER_PER_PERSON),
        CHARCOAL.suggest((meat + sausage) * CHARCOAL_PER_KG),
        COARSE_SALT.suggest(COARSE_SALT_KG),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quantity(items: &[SuggestedItem], name: &str) -> f64 {
        items
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.quantity)
            .unwrap()
    }

    #[test]
    fn twenty_guests() {
        let items = estimate(20);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Picanha",
                "Linguiça Toscana",
                "Asa de Frango",
                "Pão de Alho",
                "Queijo Coalho",
                "Cerveja",
                "Refrigerante",
                "Água",
                "Carvão",
                "Sal Grosso",
            ]
        );
        assert_eq!(quantity(&items, "Picanha"), 4.0);
        // 20 * 0.15 is 3.0000000000000004 in binary floating point.
        assert_eq!(quantity(&items, "Linguiça Toscana"), 4.0);
        assert_eq!(quantity(&items, "Asa de Frango"), 3.0);
        assert_eq!(quantity(&items, "Pão de Alho"), 40.0);
        assert_eq!(quantity(&items, "Cerveja"), 30.0);
        assert_eq!(quantity(&items, "Carvão"), 17.0);
        assert_eq!(quantity(&items, "Sal Grosso"), 1.0);
    }

    #[test]
    fn quantities_are_whole_and_rounded_up() {
        for headcount in 1..=60 {
            for item in estimate(headcount) {
                assert_eq!(item.quantity.fract(), 0.0, "{} for {headcount}", item.name);
                assert!(item.quantity >= 0.0);
            }
        }
        // 0.16 kg of picanha for a single guest still buys a whole kilo.
        assert_eq!(quantity(&estimate(1), "Picanha"), 1.0);
    }

    #[test]
    fn meat_cuts_stay_close_to_the_meat_total() {
        assert!(PICANHA_SHARE + WINGS_SHARE <= 1.0);
        for headcount in 1..=100 {
            let items = estimate(headcount);
            let meat = f64::from(headcount) * MEAT_PER_PERSON;
            let cuts = quantity(&items, "Picanha") + quantity(&items, "Asa de Frango");
            // Each cut rounds up by less than one kilo.
            assert!(cuts < meat + 2.0, "{cuts} kg of cuts for {headcount} guests");
            assert!(cuts >= meat * (PICANHA_SHARE + WINGS_SHARE));
        }
    }

    #[test]
    fn sausage_matches_plain_ceiling() {
        for headcount in [1, 7, 20, 40, 60, 100] {
            let raw = f64::from(headcount) * SAUSAGE_PER_PERSON;
            assert_eq!(
                quantity(&estimate(headcount), "Linguiça Toscana"),
                raw.ceil(),
                "sausage for {headcount}"
            );
        }
    }

    #[test]
    fn value_is_quantity_times_price_in_cents() {
        let items = estimate(3);
        let picanha = &items[0];
        assert_eq!(picanha.quantity, 1.0);
        assert_eq!(picanha.estimated_value, 79.9);
        assert_eq!(picanha.priority, ItemPriority::A);

        let cheese = &items[4];
        assert_eq!(cheese.quantity, 3.0);
        assert_eq!(cheese.estimated_value, 13.5);
        assert_eq!(cheese.priority, ItemPriority::C);
    }
}
