//! Weighted random choice driven by whitespace-separated weight strings.
//!
//! A weight string such as `"1 2 3"` pairs position-wise with an options
//! list. Choosing expands every option into a pool where option *i* appears
//! `weights[i]` times, then draws uniformly from that pool.

use rand::Rng;

use crate::ConfigError;

/// Parse a whitespace-separated list of non-negative integer weights.
pub fn parse_weights(weights: &str) -> Result<Vec<u32>, ConfigError> {
    weights
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<u32>().map_err(|_| ConfigError::InvalidWeight {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

/// Parse a whitespace-separated list of per-option probabilities.
///
/// Values are compared against a uniform draw in `[0, 1)`, so anything at or
/// above `1.0` always succeeds and `0.0` never does.
pub fn parse_probabilities(probabilities: &str) -> Result<Vec<f64>, ConfigError> {
    probabilities
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| match token.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => Ok(p),
            _ => Err(ConfigError::InvalidWeight {
                token: token.to_string(),
                position,
            }),
        })
        .collect()
}

/// Pick a single option according to `weights`.
///
/// Fails if the weight count differs from the option count, or if every
/// weight is zero.
pub fn pick_one<'a, T, R>(options: &'a [T], weights: &str, rng: &mut R) -> Result<&'a T, ConfigError>
where
    R: Rng + ?Sized,
{
    let parsed = parse_weights(weights)?;
    let pool = expand(options.len(), &parsed)?;
    Ok(&options[pool[rng.random_range(0..pool.len())]])
}

/// Expanded choice pool for repeated sampling from the same distribution.
#[derive(Debug, Clone)]
pub struct ChoicePool<T> {
    options: Vec<T>,
    pool: Vec<usize>,
}

impl<T> ChoicePool<T> {
    /// Build a pool from options and a weight string.
    pub fn new(options: Vec<T>, weights: &str) -> Result<Self, ConfigError> {
        let parsed = parse_weights(weights)?;
        Self::from_weights(options, &parsed)
    }

    /// Build a pool from options and already-parsed weights.
    pub fn from_weights(options: Vec<T>, weights: &[u32]) -> Result<Self, ConfigError> {
        let pool = expand(options.len(), weights)?;
        Ok(Self { options, pool })
    }

    /// Draw one option. Each option is returned with probability
    /// `weight / total_weight`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.options[self.pool[rng.random_range(0..self.pool.len())]]
    }

    /// The distinct options this pool draws from.
    pub fn options(&self) -> &[T] {
        &self.options
    }

    /// Sum of all weights (size of the expanded pool).
    pub fn total_weight(&self) -> usize {
        self.pool.len()
    }
}

/// Upper bound on the summed weights of one pool.
pub const MAX_TOTAL_WEIGHT: u64 = 1 << 20;

fn expand(option_count: usize, weights: &[u32]) -> Result<Vec<usize>, ConfigError> {
    if option_count != weights.len() {
        return Err(ConfigError::LengthMismatch {
            options: option_count,
            weights: weights.len(),
        });
    }
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total > MAX_TOTAL_WEIGHT {
        return Err(ConfigError::WeightTooLarge {
            total,
            max: MAX_TOTAL_WEIGHT,
        });
    }
    let pool: Vec<usize> = weights
        .iter()
        .enumerate()
        .flat_map(|(i, &w)| std::iter::repeat_n(i, w as usize))
        .collect();
    if pool.is_empty() {
        return Err(ConfigError::EmptyPool);
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    #[test]
    fn parse_weights_basic() {
        assert_eq!(parse_weights("1 2  3").unwrap(), vec![1, 2, 3]);
        assert!(parse_weights("").unwrap().is_empty());
    }

    #[test]
    fn parse_weights_rejects_garbage() {
        let err = parse_weights("1 x 3").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidWeight {
                token: "x".into(),
                position: 1
            }
        );
        assert!(parse_weights("1 -2").is_err());
    }

    #[test]
    fn parse_probabilities_basic() {
        let p = parse_probabilities("0.2 0.5 1").unwrap();
        assert_eq!(p, vec![0.2, 0.5, 1.0]);
        assert!(parse_probabilities("0.2 NaN").is_err());
        assert!(parse_probabilities("-0.1").is_err());
    }

    #[test]
    fn pick_one_rejects_length_mismatch() {
        let mut rng = seeded_rng(0);
        let err = pick_one(&["a", "b"], "1 2 3", &mut rng).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LengthMismatch {
                options: 2,
                weights: 3
            }
        );
    }

    #[test]
    fn pick_one_all_zero_is_empty_pool() {
        let mut rng = seeded_rng(0);
        let err = pick_one(&["a", "b"], "0 0", &mut rng).unwrap_err();
        assert_eq!(err, ConfigError::EmptyPool);
    }

    #[test]
    fn oversized_weights_are_rejected() {
        let err = ChoicePool::new(vec!['a'], "4000000000").unwrap_err();
        assert_eq!(
            err,
            ConfigError::WeightTooLarge {
                total: 4_000_000_000,
                max: MAX_TOTAL_WEIGHT,
            }
        );

        let mut rng = seeded_rng(1);
        let err = pick_one(&["a", "b"], "4294967295 4294967295", &mut rng).unwrap_err();
        assert!(matches!(err, ConfigError::WeightTooLarge { total: 8_589_934_590, .. }));

        let limit = MAX_TOTAL_WEIGHT.to_string();
        assert!(ChoicePool::new(vec!['a'], &limit).is_ok());
    }

    #[test]
    fn zero_weight_option_never_chosen() {
        let mut rng = seeded_rng(3);
        for _ in 0..1000 {
            let picked = pick_one(&["never", "always"], "0 4", &mut rng).unwrap();
            assert_eq!(*picked, "always");
        }
    }

    #[test]
    fn pool_frequencies_converge_to_weights() {
        let pool = ChoicePool::new(vec!['a', 'b', 'c'], "1 2 3").unwrap();
        assert_eq!(pool.total_weight(), 6);

        let mut rng = seeded_rng(1234);
        let draws = 100_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            match pool.sample(&mut rng) {
                'a' => counts[0] += 1,
                'b' => counts[1] += 1,
                _ => counts[2] += 1,
            }
        }

        let expected = [1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0];
        for (count, want) in counts.iter().zip(expected) {
            let freq = *count as f64 / draws as f64;
            assert!(
                (freq - want).abs() < 0.02,
                "frequency {freq} too far from {want}"
            );
        }
    }

    #[test]
    fn pool_keeps_options() {
        let pool = ChoicePool::new(vec![10, 20], "5 0").unwrap();
        assert_eq!(pool.options(), &[10, 20]);
        let mut rng = seeded_rng(9);
        assert_eq!(*pool.sample(&mut rng), 10);
    }
}
