use advance_common::PPM_DENOMINATOR;

/// Calculate the total an advance must repay
///
/// Formula: recoupment = principal + principal × fee_ppm / 1,000,000
///
/// Example:
/// - principal: 10
/// - fee: 20% (200,000 ppm)
/// - recoupment: 10 + 2 = 12
pub fn calculate_recoupment(principal: i128, fee_ppm: u32) -> Option<i128> {
    let fee = principal
        .checked_mul(fee_ppm as i128)?
        .checked_div(PPM_DENOMINATOR as i128)?;

    principal.checked_add(fee)
}

/// Portion of the available balance applied to what is still owed
pub fn calculate_repayment(available: i128, recoupment_amount: i128, amount_repaid: i128) -> i128 {
    available.min(recoupment_amount - amount_repaid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_recoupment() {
        // Expected: 10 × 120% = 12
        assert_eq!(calculate_recoupment(10, 200_000), Some(12));
    }

    #[test]
    fn test_zero_fee() {
        assert_eq!(calculate_recoupment(1_000, 0), Some(1_000));
    }

    #[test]
    fn test_full_fee() {
        // 100% fee doubles the amount due
        assert_eq!(calculate_recoupment(1_000, PPM_DENOMINATOR), Some(2_000));
    }

    #[test]
    fn test_fee_rounds_down() {
        // 333 × 0.1% = 0.333
        assert_eq!(calculate_recoupment(333, 1_000), Some(333));
    }

    #[test]
    fn test_recoupment_overflow() {
        assert_eq!(calculate_recoupment(i128::MAX, 1), None);
    }

    #[test]
    fn test_repayment_capped_at_remaining() {
        assert_eq!(calculate_repayment(5, 12, 0), 5);
        assert_eq!(calculate_repayment(5, 12, 9), 3);
        assert_eq!(calculate_repayment(3, 12, 9), 3);
    }
}
