use anyhow::{Result, bail};

/// Seed used when the command line supplies none.
pub const DEFAULT_SEED: u64 = 1337;

/// Split the `--seeds` list on commas, dropping blank entries.
pub fn seed_tokens(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Resolve CLI seed tokens into numeric seeds, dropping duplicates.
///
/// Accepts decimal integers (negative values use their magnitude) and
/// `0x`-prefixed hexadecimal.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            match u64::from_str_radix(hex, 16) {
                Ok(value) => value,
                Err(_) => bail!("Unrecognized seed token: {token}"),
            }
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

/// Expand each base seed into `trials` consecutive seeds.
pub fn expand_trials(seeds: &[u64], trials: usize) -> Vec<u64> {
    let per_seed = u64::try_from(trials.max(1)).unwrap_or(u64::MAX);
    seeds
        .iter()
        .flat_map(|seed| (0..per_seed).map(move |offset| seed.wrapping_add(offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_tokens_are_trimmed_and_filtered() {
        let parts = seed_tokens(" 7, ,0x10,  -3 ");
        assert_eq!(parts, vec!["7", "0x10", "-3"]);
    }

    #[test]
    fn resolves_decimal_hex_and_negative_seeds() {
        let seeds = resolve_seed_inputs(&seed_tokens("7,0x10,-3,7")).unwrap();
        assert_eq!(seeds, vec![7, 16, 3]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn rejects_garbage() {
        let err = resolve_seed_inputs(&seed_tokens("12,banana")).unwrap_err();
        assert!(err.to_string().contains("banana"));
        assert!(resolve_seed_inputs(&seed_tokens("0xzz")).is_err());
    }

    #[test]
    fn expands_trials_per_seed() {
        assert_eq!(expand_trials(&[10, u64::MAX], 2), vec![10, 11, u64::MAX, 0]);
        assert_eq!(expand_trials(&[5], 0), vec![5]);
    }
}
