//! Random pad generation.

use rand::Rng;

use crate::core::cipher::ALPHABET;

/// `len` symbols drawn uniformly from the alphabet.
pub fn generate_key<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cipher::validate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_key_is_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let key = generate_key(&mut rng, 5000);
        assert_eq!(key.len(), 5000);
        assert!(validate(&key).is_ok());
    }

    #[test]
    fn test_generated_key_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);
        let key = generate_key(&mut rng, 10_000);
        for symbol in ALPHABET {
            assert!(key.contains(symbol), "symbol {:?} never drawn", *symbol as char);
        }
    }

    #[test]
    fn test_zero_length() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_key(&mut rng, 0).is_empty());
    }
}
