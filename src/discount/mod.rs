// Discount codes
//
// Codes come from configuration as `CODE:VALUE` pairs and are evaluated
// against a pre-discount total. Pure: no I/O, no caching.

pub mod codes;
pub mod evaluator;

pub use codes::{parse_discount_codes, DiscountCode, DiscountKind};
pub use evaluator::{evaluate, DiscountEvaluator, DiscountOutcome};
