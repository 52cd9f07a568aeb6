//! Mirror alphabet permutation
//!
//! Each ASCII letter maps to the letter at the mirrored position of its own
//! case (`a`↔`z`, `B`↔`Y`). Every other byte passes through, so UTF-8
//! sequences and arbitrary binary content survive untouched. The permutation
//! is an involution: applying it twice yields the input.

/// Mirror a single byte
pub const fn mirror(byte: u8) -> u8 {
    match byte {
        b'a'..=b'z' => b'a' + (b'z' - byte),
        b'A'..=b'Z' => b'A' + (b'Z' - byte),
        _ => byte,
    }
}

/// Forward permutation over a buffer
pub fn encode(input: &[u8]) -> Vec<u8> {
    input.iter().copied().map(mirror).collect()
}

/// Inverse permutation; identical to [`encode`]
pub fn decode(input: &[u8]) -> Vec<u8> {
    encode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_is_reversed_per_case() {
        assert_eq!(encode(b"abcxyz"), b"zyxcba");
        assert_eq!(encode(b"ABCXYZ"), b"ZYXCBA");
        assert_eq!(encode(b"Hello, World!"), b"Svool, Dliow!");
    }

    #[test]
    fn test_non_letters_pass_through() {
        let input = "0123456789 !?-_\n\tñ€".as_bytes();
        assert_eq!(encode(input), input);
    }

    #[test]
    fn test_every_byte_round_trips() {
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&all)), all);
    }

    #[test]
    fn test_mirror_is_a_permutation() {
        let mut seen = [false; 256];
        for byte in 0..=255u8 {
            let out = mirror(byte);
            assert!(!seen[out as usize], "{out} produced twice");
            seen[out as usize] = true;
        }
    }
}
