use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use super::codes::{parse_discount_codes, DiscountCode, DiscountKind};

/// Result of applying a discount code to a total
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountOutcome {
    Invalid,
    Valid {
        discounted_total: Decimal,
        discount_amount: Decimal,
        label: String,
    },
}

impl DiscountOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, DiscountOutcome::Valid { .. })
    }
}

/// Evaluates codes against the configured list
///
/// Holds the raw configuration string and parses it on every call.
#[derive(Debug, Clone)]
pub struct DiscountEvaluator {
    raw_codes: Arc<str>,
}

impl DiscountEvaluator {
    pub fn new(raw_codes: impl Into<String>) -> Self {
        Self {
            raw_codes: Arc::from(raw_codes.into()),
        }
    }

    pub fn evaluate(&self, code: &str, total: Decimal) -> DiscountOutcome {
        evaluate(&parse_discount_codes(&self.raw_codes), code, total)
    }
}

/// Apply `code` to `total` using the given configured codes
///
/// Invalid when the code is blank, the total is not positive, or no code
/// matches case-insensitively.
pub fn evaluate(codes: &[DiscountCode], code: &str, total: Decimal) -> DiscountOutcome {
    let code = code.trim();
    if code.is_empty() || total <= Decimal::ZERO {
        return DiscountOutcome::Invalid;
    }

    let wanted = code.to_uppercase();
    let Some(matched) = codes.iter().find(|c| c.code == wanted) else {
        return DiscountOutcome::Invalid;
    };
    if !matched.is_in_range() {
        return DiscountOutcome::Invalid;
    }

    let (discount_amount, label) = match matched.kind {
        DiscountKind::Percent => {
            let Some(scaled) = total.checked_mul(matched.value) else {
                return DiscountOutcome::Invalid;
            };
            let amount = (scaled / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            (amount, format!("{}% di sconto", matched.value.normalize()))
        }
        DiscountKind::Fixed => {
            let amount = matched.value.min(total);
            let shown = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            (amount, format!("€{} di sconto", shown.normalize()))
        }
    };

    DiscountOutcome::Valid {
        discounted_total: (total - discount_amount).max(Decimal::ZERO),
        discount_amount,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn evaluator() -> DiscountEvaluator {
        DiscountEvaluator::new("ESTATE25:25,WELCOME:5e,BIG:500e,THIRD:33.33")
    }

    #[test]
    fn test_percent_code() {
        let outcome = evaluator().evaluate("ESTATE25", dec!(240));
        assert_eq!(
            outcome,
            DiscountOutcome::Valid {
                discounted_total: dec!(180),
                discount_amount: dec!(60),
                label: "25% di sconto".to_string(),
            }
        );
    }

    #[test]
    fn test_code_is_case_insensitive_and_trimmed() {
        assert!(evaluator().evaluate("  estate25 ", dec!(100)).is_valid());
    }

    #[test]
    fn test_percent_rounds_to_cents() {
        // 33.33% of 10.00 = 3.333 -> 3.33
        let DiscountOutcome::Valid {
            discount_amount,
            discounted_total,
            ..
        } = evaluator().evaluate("THIRD", dec!(10))
        else {
            panic!("expected valid outcome");
        };
        assert_eq!(discount_amount, dec!(3.33));
        assert_eq!(discounted_total, dec!(6.67));
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        let codes = parse_discount_codes("TEN:10");
        // 10% of 0.25 = 0.025 -> 0.03
        let DiscountOutcome::Valid { discount_amount, .. } = evaluate(&codes, "TEN", dec!(0.25))
        else {
            panic!("expected valid outcome");
        };
        assert_eq!(discount_amount, dec!(0.03));
    }

    #[test]
    fn test_fixed_code() {
        let outcome = evaluator().evaluate("welcome", dec!(120));
        assert_eq!(
            outcome,
            DiscountOutcome::Valid {
                discounted_total: dec!(115),
                discount_amount: dec!(5),
                label: "€5 di sconto".to_string(),
            }
        );
    }

    #[test]
    fn test_fixed_never_exceeds_total() {
        let outcome = evaluator().evaluate("BIG", dec!(80));
        assert_eq!(
            outcome,
            DiscountOutcome::Valid {
                discounted_total: dec!(0),
                discount_amount: dec!(80),
                label: "€80 di sconto".to_string(),
            }
        );
    }

    #[test]
    fn test_fixed_label_rounds_to_integer() {
        let codes = parse_discount_codes("ODD:7.5e");
        let DiscountOutcome::Valid { label, .. } = evaluate(&codes, "ODD", dec!(100)) else {
            panic!("expected valid outcome");
        };
        assert_eq!(label, "€8 di sconto");
    }

    #[test]
    fn test_invalid_inputs() {
        let evaluator = evaluator();
        assert_eq!(evaluator.evaluate("", dec!(100)), DiscountOutcome::Invalid);
        assert_eq!(evaluator.evaluate("   ", dec!(100)), DiscountOutcome::Invalid);
        assert_eq!(evaluator.evaluate("ESTATE25", dec!(0)), DiscountOutcome::Invalid);
        assert_eq!(evaluator.evaluate("ESTATE25", dec!(-10)), DiscountOutcome::Invalid);
        assert_eq!(evaluator.evaluate("NOPE", dec!(100)), DiscountOutcome::Invalid);
    }

    #[test]
    fn test_out_of_range_code_is_invalid() {
        let codes = vec![DiscountCode {
            code: "BROKEN".to_string(),
            kind: DiscountKind::Percent,
            value: dec!(150),
        }];
        assert_eq!(evaluate(&codes, "BROKEN", dec!(100)), DiscountOutcome::Invalid);
    }

    #[test]
    fn test_no_codes_configured() {
        let evaluator = DiscountEvaluator::new("");
        assert_eq!(evaluator.evaluate("ESTATE25", dec!(240)), DiscountOutcome::Invalid);
    }
}
