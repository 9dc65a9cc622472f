/*!
 * Token validation for translated text.
 *
 * Every token sent to a translator must come back exactly once. Inline
 * markers must additionally keep their original order, because the
 * children they stand for are pasted back in sequence.
 */

use log::debug;

use crate::translation::tokens::{self, TokenKind};

/// Token validation result
#[derive(Debug, Clone)]
pub struct TokenValidationResult {
    /// Token family that was checked
    pub kind: TokenKind,
    /// Whether all tokens are present
    pub all_present: bool,
    /// Expected token indices
    pub expected_indices: Vec<usize>,
    /// Found token indices, in order of appearance
    pub found_indices: Vec<usize>,
    /// Missing token indices
    pub missing_indices: Vec<usize>,
    /// Indices found more than once
    pub duplicate_indices: Vec<usize>,
    /// Indices that were never issued
    pub unexpected_indices: Vec<usize>,
    /// Tokens found out of order
    pub out_of_order: bool,
    /// Error message if validation failed
    pub error_message: Option<String>,
}

impl TokenValidationResult {
    /// Every token present exactly once, order ignored
    pub fn passed(&self) -> bool {
        self.all_present && self.duplicate_indices.is_empty() && self.unexpected_indices.is_empty()
    }

    /// Every token present exactly once and in original order
    pub fn passed_in_order(&self) -> bool {
        self.passed() && !self.out_of_order
    }

    /// Message describing the first problem found
    pub fn describe(&self) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| "tokens intact".to_string())
    }
}

/// Token validator for translated text
pub struct TokenValidator;

impl TokenValidator {
    /// Validate that tokens `0..expected_count` of a kind each appear once
    ///
    /// # Arguments
    /// * `text` - The translated text
    /// * `kind` - The token family to check
    /// * `expected_count` - Number of tokens issued before translation
    ///
    /// # Returns
    /// * `TokenValidationResult` with validation details
    pub fn validate(text: &str, kind: TokenKind, expected_count: usize) -> TokenValidationResult {
        let expected_indices: Vec<usize> = (0..expected_count).collect();
        Self::validate_indices(text, kind, &expected_indices)
    }

    /// Validate that exactly the given token indices of a kind each appear once
    pub fn validate_indices(text: &str, kind: TokenKind, expected: &[usize]) -> TokenValidationResult {
        let expected_indices = expected.to_vec();
        let expected_count = expected_indices.len();
        let found_indices = tokens::find_indices(text, kind);

        let missing_indices: Vec<usize> = expected_indices
            .iter()
            .filter(|i| !found_indices.contains(i))
            .copied()
            .collect();

        let mut duplicate_indices: Vec<usize> = found_indices
            .iter()
            .filter(|i| found_indices.iter().filter(|j| j == i).count() > 1)
            .copied()
            .collect();
        duplicate_indices.sort_unstable();
        duplicate_indices.dedup();

        let unexpected_indices: Vec<usize> = found_indices
            .iter()
            .filter(|i| !expected_indices.contains(i))
            .copied()
            .collect();

        let out_of_order = found_indices.windows(2).any(|pair| pair[0] > pair[1]);
        let all_present = missing_indices.is_empty();

        let error_message = if !all_present {
            Some(format!("Missing {:?} tokens: {:?}", kind, missing_indices))
        } else if !duplicate_indices.is_empty() {
            Some(format!("Duplicated {:?} tokens: {:?}", kind, duplicate_indices))
        } else if !unexpected_indices.is_empty() {
            Some(format!("Unknown {:?} tokens: {:?}", kind, unexpected_indices))
        } else if out_of_order {
            Some(format!("{:?} tokens found out of order: {:?}", kind, found_indices))
        } else {
            None
        };

        debug!(
            "{:?} token validation: expected={}, found={}, missing={}",
            kind,
            expected_count,
            found_indices.len(),
            missing_indices.len()
        );

        TokenValidationResult {
            kind,
            all_present,
            expected_indices,
            found_indices,
            missing_indices,
            duplicate_indices,
            unexpected_indices,
            out_of_order,
            error_message,
        }
    }
}
