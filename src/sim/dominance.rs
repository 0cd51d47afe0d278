//! Dominance resolution for contacting pairs

use serde::{Deserialize, Serialize};

use super::collision::bounce_apart;
use super::state::{Entity, Kind};

/// Velocity response applied when a contact converts a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionResponse {
    /// Kinds change, velocities are untouched
    #[default]
    Convert,
    /// Converted pairs also push apart along their centre line
    Bounce,
}

/// A kind change produced by one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Index of the converted entity
    pub index: usize,
    pub from: Kind,
    pub to: Kind,
}

/// Apply the dominance rule to the pair `(i, j)`.
///
/// The loser takes the winner's kind; equal kinds are left alone. Kinds are
/// read at call time, so a pair resolved later in a tick sees conversions
/// made earlier in the same tick.
pub fn resolve(
    entities: &mut [Entity],
    i: usize,
    j: usize,
    response: CollisionResponse,
) -> Option<Conversion> {
    debug_assert!(i < j, "pairs are ordered");
    let (head, tail) = entities.split_at_mut(j);
    let a = &mut head[i];
    let b = &mut tail[0];

    let conversion = if a.kind.beats(b.kind) {
        let from = b.kind;
        b.kind = a.kind;
        Conversion {
            index: j,
            from,
            to: a.kind,
        }
    } else if b.kind.beats(a.kind) {
        let from = a.kind;
        a.kind = b.kind;
        Conversion {
            index: i,
            from,
            to: b.kind,
        }
    } else {
        return None;
    };

    if response == CollisionResponse::Bounce {
        bounce_apart(a, b);
    }
    Some(conversion)
}

/// Resolve every pair in order, returning the conversions made
pub fn resolve_all(
    entities: &mut [Entity],
    pairs: &[(usize, usize)],
    response: CollisionResponse,
) -> Vec<Conversion> {
    pairs
        .iter()
        .filter_map(|&(i, j)| resolve(entities, i, j, response))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn entity(kind: Kind, x: f32) -> Entity {
        Entity::new(kind, Vec2::new(x, 0.0), Vec2::new(1.0, 0.0), 12.0)
    }

    #[test]
    fn test_winner_converts_loser_either_order() {
        let mut entities = [entity(Kind::Rock, 0.0), entity(Kind::Scissors, 1.0)];
        let c = resolve(&mut entities, 0, 1, CollisionResponse::Convert).unwrap();
        assert_eq!(
            c,
            Conversion {
                index: 1,
                from: Kind::Scissors,
                to: Kind::Rock
            }
        );
        assert_eq!(entities[1].kind, Kind::Rock);

        let mut entities = [entity(Kind::Rock, 0.0), entity(Kind::Paper, 1.0)];
        let c = resolve(&mut entities, 0, 1, CollisionResponse::Convert).unwrap();
        assert_eq!(c.index, 0);
        assert_eq!(entities[0].kind, Kind::Paper);
    }

    #[test]
    fn test_same_kind_is_unchanged() {
        let mut entities = [entity(Kind::Paper, 0.0), entity(Kind::Paper, 1.0)];
        assert!(resolve(&mut entities, 0, 1, CollisionResponse::Bounce).is_none());
        // No conversion means no bounce either
        assert_eq!(entities[0].vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_outcome_always_beats_or_keeps_pre_contact_kinds() {
        for a in Kind::ALL {
            for b in Kind::ALL {
                let mut entities = [entity(a, 0.0), entity(b, 1.0)];
                resolve(&mut entities, 0, 1, CollisionResponse::Convert);
                let (na, nb) = (entities[0].kind, entities[1].kind);
                assert_eq!(na, nb, "a contact of {a} and {b} must leave one kind");
                assert!(na == a || na == b);
                // The survivor is never beaten by the other original kind
                assert!(!(a.beats(na) && b.beats(na)));
                if a != b {
                    assert!(na.beats(if na == a { b } else { a }));
                }
            }
        }
    }

    #[test]
    fn test_chained_conversions_within_one_pass() {
        // Paper converts the rock at 1; the later pair then sees paper, not
        // rock, so the scissors at 2 wins instead of losing.
        let mut entities = [
            entity(Kind::Paper, 0.0),
            entity(Kind::Rock, 1.0),
            entity(Kind::Scissors, 2.0),
        ];
        let conversions =
            resolve_all(&mut entities, &[(0, 1), (1, 2)], CollisionResponse::Convert);

        assert_eq!(
            conversions,
            vec![
                Conversion {
                    index: 1,
                    from: Kind::Rock,
                    to: Kind::Paper
                },
                Conversion {
                    index: 1,
                    from: Kind::Paper,
                    to: Kind::Scissors
                },
            ]
        );
        assert_eq!(entities[0].kind, Kind::Paper);
        assert_eq!(entities[1].kind, Kind::Scissors);
        assert_eq!(entities[2].kind, Kind::Scissors);
    }

    #[test]
    fn test_bounce_response_on_conversion() {
        let mut entities = [entity(Kind::Scissors, 0.0), entity(Kind::Paper, 5.0)];
        resolve(&mut entities, 0, 1, CollisionResponse::Bounce).unwrap();
        assert_eq!(entities[0].vel, Vec2::new(-1.0, 0.0));
        assert_eq!(entities[1].vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_response_names() {
        let r: CollisionResponse = serde_json::from_str("\"bounce\"").unwrap();
        assert_eq!(r, CollisionResponse::Bounce);
        assert_eq!(CollisionResponse::default(), CollisionResponse::Convert);
    }
}
