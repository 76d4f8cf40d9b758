//! Level generator: level -> tier, plus a fresh random challenge.

use crate::challenge::Challenge;
use crate::content::Tier;
use rand::Rng;

/// One generated round.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub level: u32,
    pub tier: Tier,
    pub challenge: Challenge,
}

/// Draw `tier.challenge_len` indices independently and uniformly from the
/// tier's symbol set (repeats allowed). The shape depends only on `level`.
pub fn generate<R: Rng + ?Sized>(tier_for_level: fn(u32) -> Tier, level: u32, rng: &mut R) -> Round {
    let level = level.max(1);
    let tier = tier_for_level(level);
    let count = tier.symbol_count();
    let challenge = if count == 0 {
        Challenge::default()
    } else {
        Challenge::new((0..tier.challenge_len).map(|_| rng.gen_range(0..count)).collect())
    };
    tracing::debug!(
        level,
        tier = tier.name,
        keys = count,
        len = challenge.len(),
        "generated challenge"
    );
    Round {
        level,
        tier,
        challenge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{echokeys, scale};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shape_is_a_function_of_level() {
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(99);
        for level in 1..=40 {
            let x = generate(echokeys::tier_for_level, level, &mut a);
            let y = generate(echokeys::tier_for_level, level, &mut b);
            assert_eq!(x.challenge.len(), y.challenge.len());
            assert_eq!(x.tier.symbol_count(), y.tier.symbol_count());
            assert_eq!(x.challenge.len(), x.tier.challenge_len);
        }
    }

    #[test]
    fn indices_stay_in_range_and_cover_the_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 7];
        for _ in 0..200 {
            let round = generate(echokeys::tier_for_level, 30, &mut rng);
            for &idx in round.challenge.as_slice() {
                assert!(idx < 7);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|s| *s), "uniform draw should reach every key");
    }

    #[test]
    fn level_is_coerced_to_one() {
        let mut rng = StdRng::seed_from_u64(3);
        let round = generate(scale::tier_for_level, 0, &mut rng);
        assert_eq!(round.level, 1);
        assert_eq!(round.challenge.len(), 1);
    }
}
