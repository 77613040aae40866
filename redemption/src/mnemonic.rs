//! # Redemption Mnemonics
//!
//! Nine BIP-39 English words. Regular certificates are sealed under a key
//! derived from one, and paper-vended codes are unlocked by one.
//!
//! The encoding is BIP-39 shrunk to 96 bits of entropy:
//!
//! ```text
//!   entropy (96 bits) || SHA-256(entropy)[0] >> 5 (3 bits)  = 99 bits
//!   99 bits / 11 bits per word                               = 9 words
//! ```
//!
//! The word list is the `bip39` crate's English list. The crate's own
//! `Mnemonic` type refuses anything shorter than 12 words, so the bit
//! packing lives here.
//!
//! Only the entropy is kept after parsing. Downstream derivations hash the
//! entropy, never the phrase, so spacing and capitalisation differences in
//! user input cannot change the derived key.

use bip39::Language;
use std::fmt;
use thiserror::Error;

use crate::config::{MNEMONIC_CHECKSUM_BITS, MNEMONIC_ENTROPY_LENGTH, MNEMONIC_WORD_COUNT};
use crate::crypto::hash::sha256;

const WORD_BITS: u32 = 11;
const WORD_MASK: u128 = (1 << WORD_BITS) - 1;

/// Why a mnemonic was rejected.
///
/// None of these variants echo the offending word back; a typo in a
/// mnemonic is still most of a secret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("expected {MNEMONIC_WORD_COUNT} words, got {0}")]
    WordCount(usize),

    #[error("word {position} is not in the word list")]
    UnknownWord { position: usize },

    #[error("checksum mismatch")]
    Checksum,

    #[error("mnemonic does not unlock this redemption code")]
    DoesNotUnlock,
}

/// A validated nine-word redemption mnemonic.
#[derive(Clone, PartialEq, Eq)]
pub struct RedemptionMnemonic {
    entropy: [u8; MNEMONIC_ENTROPY_LENGTH],
}

impl RedemptionMnemonic {
    /// Parse and validate a phrase.
    ///
    /// Words may be separated by any run of whitespace and are matched
    /// case-insensitively.
    pub fn parse(phrase: &str) -> Result<Self, MnemonicError> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        if words.len() != MNEMONIC_WORD_COUNT {
            return Err(MnemonicError::WordCount(words.len()));
        }

        let word_list = Language::English.word_list();
        let mut packed: u128 = 0;
        for (position, word) in words.iter().enumerate() {
            let index = word_list
                .iter()
                .position(|candidate| *candidate == word.as_str())
                .ok_or(MnemonicError::UnknownWord {
                    position: position + 1,
                })?;
            packed = (packed << WORD_BITS) | index as u128;
        }

        let checksum = (packed & ((1 << MNEMONIC_CHECKSUM_BITS) - 1)) as u8;
        let entropy_value = packed >> MNEMONIC_CHECKSUM_BITS;

        let mut entropy = [0u8; MNEMONIC_ENTROPY_LENGTH];
        entropy.copy_from_slice(&entropy_value.to_be_bytes()[16 - MNEMONIC_ENTROPY_LENGTH..]);

        if checksum != checksum_of(&entropy) {
            return Err(MnemonicError::Checksum);
        }

        Ok(Self { entropy })
    }

    /// Validity check for form fields.
    pub fn is_valid(phrase: &str) -> bool {
        Self::parse(phrase).is_ok()
    }

    /// Build the mnemonic that encodes `entropy`. Issuers use this to print
    /// certificates; redeemers never need it.
    pub fn from_entropy(entropy: [u8; MNEMONIC_ENTROPY_LENGTH]) -> Self {
        Self { entropy }
    }

    /// The 96 bits of entropy behind the words.
    pub fn entropy(&self) -> &[u8; MNEMONIC_ENTROPY_LENGTH] {
        &self.entropy
    }

    /// The nine words, in order.
    pub fn words(&self) -> Vec<&'static str> {
        let word_list = Language::English.word_list();

        let mut padded = [0u8; 16];
        padded[16 - MNEMONIC_ENTROPY_LENGTH..].copy_from_slice(&self.entropy);
        let packed = (u128::from_be_bytes(padded) << MNEMONIC_CHECKSUM_BITS)
            | checksum_of(&self.entropy) as u128;

        (0..MNEMONIC_WORD_COUNT)
            .map(|i| {
                let shift = WORD_BITS * (MNEMONIC_WORD_COUNT - 1 - i) as u32;
                word_list[((packed >> shift) & WORD_MASK) as usize]
            })
            .collect()
    }

    /// The words joined by single spaces.
    pub fn phrase(&self) -> String {
        self.words().join(" ")
    }
}

impl fmt::Debug for RedemptionMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RedemptionMnemonic(<redacted>)")
    }
}

/// Top `MNEMONIC_CHECKSUM_BITS` bits of SHA-256(entropy).
fn checksum_of(entropy: &[u8; MNEMONIC_ENTROPY_LENGTH]) -> u8 {
    sha256(entropy)[0] >> (8 - MNEMONIC_CHECKSUM_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RedemptionMnemonic {
        RedemptionMnemonic::from_entropy([
            0x5a, 0x13, 0x77, 0xc0, 0x01, 0xfe, 0x42, 0x99, 0x10, 0x2b, 0xee, 0x07,
        ])
    }

    #[test]
    fn phrase_roundtrips_through_parse() {
        let mnemonic = sample();
        let phrase = mnemonic.phrase();
        assert_eq!(phrase.split(' ').count(), MNEMONIC_WORD_COUNT);
        assert_eq!(RedemptionMnemonic::parse(&phrase).unwrap(), mnemonic);
    }

    #[test]
    fn all_zero_entropy_is_abandon_heavy() {
        // The first eight words carry only zero entropy bits; the ninth
        // carries the last 8 entropy bits plus the checksum.
        let mnemonic = RedemptionMnemonic::from_entropy([0u8; MNEMONIC_ENTROPY_LENGTH]);
        let words = mnemonic.words();
        assert!(words[..8].iter().all(|w| *w == "abandon"));
        assert_eq!(RedemptionMnemonic::parse(&mnemonic.phrase()).unwrap(), mnemonic);
    }

    #[test]
    fn known_phrase_vectors() {
        assert_eq!(
            sample().phrase(),
            "foam option useless advance tomorrow erode doll lava also"
        );

        let parsed =
            RedemptionMnemonic::parse("uncle bargain pistol obtain amount laugh explain type learn")
                .unwrap();
        assert_eq!(hex::encode(parsed.entropy()), "ec825695cc4080fb14275e7e");
    }

    #[test]
    fn whitespace_and_case_are_normalised() {
        let mnemonic = sample();
        let messy = format!("  {}  ", mnemonic.phrase().to_uppercase().replace(' ', "\t "));
        assert_eq!(RedemptionMnemonic::parse(&messy).unwrap(), mnemonic);
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        assert_eq!(
            RedemptionMnemonic::parse("abandon abandon abandon").unwrap_err(),
            MnemonicError::WordCount(3)
        );
        assert_eq!(
            RedemptionMnemonic::parse("").unwrap_err(),
            MnemonicError::WordCount(0)
        );
    }

    #[test]
    fn unknown_word_reports_position_only() {
        let mut words = sample().words();
        words[4] = "notaword";
        let err = RedemptionMnemonic::parse(&words.join(" ")).unwrap_err();
        assert_eq!(err, MnemonicError::UnknownWord { position: 5 });
        assert!(!err.to_string().contains("notaword"));
    }

    #[test]
    fn swapped_words_break_the_checksum_or_change_entropy() {
        let original = sample();
        let mut words = original.words();
        words.swap(0, 1);
        // Swapping two words either fails the checksum or yields a different
        // mnemonic; it must never parse back to the original entropy.
        match RedemptionMnemonic::parse(&words.join(" ")) {
            Ok(parsed) => assert_ne!(parsed, original),
            Err(err) => assert_eq!(err, MnemonicError::Checksum),
        }
    }

    #[test]
    fn flipping_the_last_word_breaks_the_checksum() {
        // The last word holds 8 entropy bits and the 3 checksum bits. Moving
        // it by one index changes only the checksum bits, which must fail.
        let mnemonic = sample();
        let word_list = Language::English.word_list();
        let words = mnemonic.words();
        let last = word_list.iter().position(|w| *w == words[8]).unwrap();
        let low_bits = last & 0b111;
        let neighbour = (last & !0b111) | ((low_bits + 1) & 0b111);

        let mut tampered = words.clone();
        tampered[8] = word_list[neighbour];
        assert_eq!(
            RedemptionMnemonic::parse(&tampered.join(" ")).unwrap_err(),
            MnemonicError::Checksum
        );
    }

    #[test]
    fn is_valid_accepts_only_checksummed_phrases() {
        assert!(RedemptionMnemonic::is_valid(&sample().phrase()));
        assert!(!RedemptionMnemonic::is_valid("uncle bargain"));
    }

    #[test]
    fn debug_is_redacted() {
        let debug = format!("{:?}", sample());
        assert_eq!(debug, "RedemptionMnemonic(<redacted>)");
    }
}
