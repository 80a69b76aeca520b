use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("invalid seed '{0}': expected a decimal or 0x-prefixed hex integer")]
    Invalid(String),
    #[error("no seeds given")]
    Empty,
}

/// Parse CLI seed tokens.
///
/// Accepts decimal integers (negative values use their magnitude) and
/// `0x`-prefixed hex.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>, SeedError> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.is_empty() {
            continue;
        }
        seeds.push(parse_seed(token)?);
    }
    if seeds.is_empty() {
        return Err(SeedError::Empty);
    }
    seeds.dedup();
    Ok(seeds)
}

fn parse_seed(token: &str) -> Result<u64, SeedError> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(&hex.replace('_', ""), 16)
            .map_err(|_| SeedError::Invalid(token.to_string()));
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    token
        .parse::<i64>()
        .map(i64::unsigned_abs)
        .map_err(|_| SeedError::Invalid(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_decimal_hex_and_negative() {
        let seeds = resolve_seed_inputs(&tokens(&["1337", "0xC0_FFEE", "-5"])).unwrap();
        assert_eq!(seeds, vec![1337, 0x00C0_FFEE, 5]);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            resolve_seed_inputs(&tokens(&["12", "orange"])),
            Err(SeedError::Invalid("orange".to_string()))
        );
        assert_eq!(resolve_seed_inputs(&[]), Err(SeedError::Empty));
    }

    #[test]
    fn adjacent_duplicates_collapse() {
        let seeds = resolve_seed_inputs(&tokens(&["7", "7", "8"])).unwrap();
        assert_eq!(seeds, vec![7, 8]);
    }
}
