//! Card and keyword catalog.
//!
//! The catalog is static data embedded in the binary. It is loaded once at
//! startup and shared read-only between all rooms.

use std::collections::{HashMap, HashSet};

use rand::{Rng, seq::SliceRandom};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::TRAIT_COUNT;

const BUILTIN_CARDS: &str = include_str!("../../data/cards.json");
const BUILTIN_KEYWORDS: &str = include_str!("../../data/keywords.json");

/// Trait notation, in stat-vector order.
pub const FUNCTION_NOTATION: [&str; TRAIT_COUNT] = ["Se", "Si", "Ne", "Ni", "Te", "Ti", "Fe", "Fi"];

/// Number of cards a player holds at the start of every move.
pub const HAND_SIZE: usize = 5;

/// Minimum number of keywords laid out per round.
pub const MIN_ARENA_SIZE: usize = 3;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Malformed catalog data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card \"{card}\" requires unknown function \"{token}\"")]
    UnknownFunction { card: String, token: String },

    #[error("Card \"{card}\" has growth tier {growth}, expected 1 to 3")]
    InvalidGrowth { card: String, growth: u8 },

    #[error("Card \"{0}\" is defined more than once")]
    DuplicateCard(String),

    #[error("Catalog needs at least {required} {what} (got {actual})")]
    TooSmall {
        what: &'static str,
        required: usize,
        actual: usize,
    },
}

/// An action card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub name: String,
    /// Required trait indices, each in `0..TRAIT_COUNT`.
    pub requires: Vec<usize>,
    /// Growth tier, informational.
    pub growth: u8,
    /// Relationship delta applied on resolution, before the outcome multiplier.
    pub relationship: [f32; 3],
}

#[derive(Debug, Deserialize)]
struct CardRecord {
    name: String,
    requires: String,
    growth: u8,
    relationship: [f32; 3],
}

#[derive(Debug)]
pub struct CardCatalog {
    cards: Vec<Card>,
    by_name: HashMap<String, usize>,
    keywords: Vec<String>,
}

impl CardCatalog {
    /// Load the catalog embedded in the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CARDS, BUILTIN_KEYWORDS)
    }

    /// Parse a card list and a keyword list, both JSON arrays.
    pub fn from_json(cards: &str, keywords: &str) -> Result<Self, CatalogError> {
        let records: Vec<CardRecord> = serde_json::from_str(cards)?;
        let keywords: Vec<String> = serde_json::from_str(keywords)?;

        let cards = records
            .into_iter()
            .map(|record| {
                let requires = parse_requirements(&record.name, &record.requires)?;
                Ok(Card {
                    name: record.name,
                    requires,
                    growth: record.growth,
                    relationship: record.relationship,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Self::new(cards, keywords)
    }

    /// Validate and index a catalog. Duplicate keywords are dropped.
    pub fn new(cards: Vec<Card>, keywords: Vec<String>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            if !(1..=3).contains(&card.growth) {
                return Err(CatalogError::InvalidGrowth {
                    card: card.name.clone(),
                    growth: card.growth,
                });
            }
            if by_name.insert(card.name.clone(), index).is_some() {
                return Err(CatalogError::DuplicateCard(card.name.clone()));
            }
        }

        let mut seen = HashSet::new();
        let keywords: Vec<String> = keywords
            .into_iter()
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect();

        if cards.len() < HAND_SIZE {
            return Err(CatalogError::TooSmall {
                what: "cards",
                required: HAND_SIZE,
                actual: cards.len(),
            });
        }
        if keywords.len() < MIN_ARENA_SIZE {
            return Err(CatalogError::TooSmall {
                what: "keywords",
                required: MIN_ARENA_SIZE,
                actual: keywords.len(),
            });
        }

        tracing::debug!(
            "Catalog loaded: {} cards, {} keywords",
            cards.len(),
            keywords.len()
        );

        Ok(Self {
            cards,
            by_name,
            keywords,
        })
    }

    pub fn card(&self, name: &str) -> Option<&Card> {
        self.by_name.get(name).map(|&index| &self.cards[index])
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Top `hand` up to [`HAND_SIZE`] with cards it does not already hold.
    pub fn fill_hand<R: Rng + ?Sized>(&self, hand: &mut Vec<String>, rng: &mut R) {
        fill_unique(
            hand,
            HAND_SIZE,
            self.cards.iter().map(|card| card.name.as_str()),
            rng,
        );
    }

    /// Top `arena` up to `max(player_count, MIN_ARENA_SIZE)` unique keywords.
    pub fn fill_arena<R: Rng + ?Sized>(
        &self,
        arena: &mut Vec<String>,
        player_count: usize,
        rng: &mut R,
    ) {
        fill_unique(
            arena,
            player_count.max(MIN_ARENA_SIZE),
            self.keywords.iter().map(String::as_str),
            rng,
        );
    }
}

/// Parse whitespace-separated function notation into trait indices.
///
/// An empty string means the card has no requirement.
pub fn parse_requirements(card: &str, notation: &str) -> Result<Vec<usize>, CatalogError> {
    let mut requires = Vec::new();
    for token in notation.split_whitespace() {
        let index = FUNCTION_NOTATION
            .iter()
            .position(|code| *code == token)
            .ok_or_else(|| CatalogError::UnknownFunction {
                card: card.to_string(),
                token: token.to_string(),
            })?;
        if !requires.contains(&index) {
            requires.push(index);
        }
    }
    Ok(requires)
}

/// Append random pool entries not yet in `items` until it holds `target`
/// entries or the pool runs out.
fn fill_unique<'a, R: Rng + ?Sized>(
    items: &mut Vec<String>,
    target: usize,
    pool: impl Iterator<Item = &'a str>,
    rng: &mut R,
) {
    if items.len() >= target {
        return;
    }
    let candidates: Vec<&str> = pool
        .filter(|candidate| !items.iter().any(|item| item == candidate))
        .collect();
    let missing = target - items.len();
    items.extend(
        candidates
            .choose_multiple(rng, missing)
            .map(|candidate| candidate.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn card(name: &str) -> Card {
        Card {
            name: name.to_string(),
            requires: vec![0],
            growth: 1,
            relationship: [1.0, 0.0, 0.0],
        }
    }

    fn keywords(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_builtin_catalog_loads() {
        // テスト項目: 組み込みのカタログが読み込める
        // given (前提条件):
        // when (操作):
        let catalog = CardCatalog::builtin().unwrap();

        // then (期待する結果):
        assert!(catalog.cards().len() >= HAND_SIZE);
        assert!(catalog.keywords().len() >= MIN_ARENA_SIZE);
        let unique: HashSet<&String> = catalog.keywords().iter().collect();
        assert_eq!(unique.len(), catalog.keywords().len());
        assert!(
            catalog
                .cards()
                .iter()
                .all(|card| card.requires.iter().all(|&index| index < TRAIT_COUNT))
        );
    }

    #[test]
    fn test_parse_requirements() {
        // テスト項目: 機能表記が特性インデックスに変換される
        // given (前提条件):
        // when (操作):
        let requires = parse_requirements("card", "Se Te Ni Ne").unwrap();
        let empty = parse_requirements("card", "").unwrap();

        // then (期待する結果):
        assert_eq!(requires, vec![0, 4, 3, 2]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_requirements_rejects_unknown_function() {
        // テスト項目: 未知の機能表記はエラーになる
        // given (前提条件):
        // when (操作):
        let result = parse_requirements("card", "Se Xx");

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(CatalogError::UnknownFunction { token, .. }) if token == "Xx"
        ));
    }

    #[test]
    fn test_from_json_parses_cards() {
        // テスト項目: JSON からカードが読み込まれる
        // given (前提条件):
        let cards = r#"[
            {"name": "a", "requires": "Fi Fe", "growth": 2, "relationship": [1, -1, 0]},
            {"name": "b", "requires": "", "growth": 1, "relationship": [0, 0, 3]},
            {"name": "c", "requires": "Se", "growth": 1, "relationship": [0, 0, 0]},
            {"name": "d", "requires": "Si", "growth": 1, "relationship": [0, 0, 0]},
            {"name": "e", "requires": "Ti", "growth": 3, "relationship": [0, 0, 0]}
        ]"#;
        let keywords = r#"["x", "y", "z", "x"]"#;

        // when (操作):
        let catalog = CardCatalog::from_json(cards, keywords).unwrap();

        // then (期待する結果):
        let a = catalog.card("a").unwrap();
        assert_eq!(a.requires, vec![7, 6]);
        assert_eq!(a.relationship, [1.0, -1.0, 0.0]);
        assert!(catalog.card("b").unwrap().requires.is_empty());
        assert_eq!(catalog.keywords(), &["x", "y", "z"]);
        assert!(catalog.card("missing").is_none());
    }

    #[test]
    fn test_new_rejects_invalid_growth() {
        // テスト項目: 成長段階が 1〜3 の範囲外ならエラーになる
        // given (前提条件):
        let mut cards: Vec<Card> = ["a", "b", "c", "d", "e"].into_iter().map(card).collect();
        cards[2].growth = 4;

        // when (操作):
        let result = CardCatalog::new(cards, keywords(&["x", "y", "z"]));

        // then (期待する結果):
        assert!(matches!(result, Err(CatalogError::InvalidGrowth { growth: 4, .. })));
    }

    #[test]
    fn test_new_rejects_duplicate_card() {
        // テスト項目: 同名のカードが複数あるとエラーになる
        // given (前提条件):
        let cards: Vec<Card> = ["a", "b", "c", "d", "a"].into_iter().map(card).collect();

        // when (操作):
        let result = CardCatalog::new(cards, keywords(&["x", "y", "z"]));

        // then (期待する結果):
        assert!(matches!(result, Err(CatalogError::DuplicateCard(name)) if name == "a"));
    }

    #[test]
    fn test_new_rejects_too_few_keywords() {
        // テスト項目: 重複除去後のキーワードが足りなければエラーになる
        // given (前提条件):
        let cards: Vec<Card> = ["a", "b", "c", "d", "e"].into_iter().map(card).collect();

        // when (操作):
        let result = CardCatalog::new(cards, keywords(&["x", "y", "x"]));

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(CatalogError::TooSmall { what: "keywords", required: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_fill_hand_tops_up_without_duplicates() {
        // テスト項目: 手札が重複なしで 5 枚に補充される
        // given (前提条件):
        let catalog = CardCatalog::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let first = catalog.cards()[0].name.clone();
        let mut hand = vec![first.clone(), catalog.cards()[1].name.clone()];

        // when (操作):
        catalog.fill_hand(&mut hand, &mut rng);

        // then (期待する結果):
        assert_eq!(hand.len(), HAND_SIZE);
        assert_eq!(hand[0], first);
        let unique: HashSet<&String> = hand.iter().collect();
        assert_eq!(unique.len(), HAND_SIZE);
        assert!(hand.iter().all(|name| catalog.card(name).is_some()));
    }

    #[test]
    fn test_fill_arena_uses_at_least_three_keywords() {
        // テスト項目: アリーナは max(人数, 3) 個のキーワードで埋まる
        // given (前提条件):
        let catalog = CardCatalog::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut small = Vec::new();
        let mut large = Vec::new();

        // when (操作):
        catalog.fill_arena(&mut small, 2, &mut rng);
        catalog.fill_arena(&mut large, 6, &mut rng);

        // then (期待する結果):
        assert_eq!(small.len(), 3);
        assert_eq!(large.len(), 6);
        let unique: HashSet<&String> = large.iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_fill_stops_when_pool_is_exhausted() {
        // テスト項目: 候補が尽きたら無限ループせずに止まる
        // given (前提条件):
        let cards: Vec<Card> = ["a", "b", "c", "d", "e"].into_iter().map(card).collect();
        let catalog = CardCatalog::new(cards, keywords(&["x", "y", "z"])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut arena = vec!["x".to_string()];

        // when (操作):
        catalog.fill_arena(&mut arena, 5, &mut rng);

        // then (期待する結果):
        assert_eq!(arena.len(), 3);
    }
}
