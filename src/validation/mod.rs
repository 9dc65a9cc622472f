/*!
 * Validation of translated text.
 *
 * - `markers`: checks that protected tokens survive translation
 */

pub mod markers;

pub use markers::{TokenValidationResult, TokenValidator};
