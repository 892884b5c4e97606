use mongodb::bson::{doc, DateTime};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::promotion::{DiscountType, Promotion};
use crate::services::error::BookingError;
use crate::services::pricing_service::round_money;

/// Soft validation result returned to the storefront. Invalid codes are not
/// errors here; the caller shows `message` to the customer.
#[derive(Debug, Serialize)]
pub struct PromotionCheck {
    pub valid: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    pub message: String,
}

pub struct PromotionService {
    promotions: Collection<Promotion>,
}

impl PromotionService {
    pub fn new(client: &Client) -> Self {
        Self {
            promotions: client.database("Billing").collection("Promotions"),
        }
    }

    /// Storefront entry point: never fails on a bad code, only on storage.
    pub async fn validate(
        &self,
        code: &str,
        amount: Option<Decimal>,
    ) -> Result<PromotionCheck, BookingError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(PromotionCheck {
                valid: false,
                discount_amount: Decimal::ZERO,
                message: "No promo code supplied".to_string(),
            });
        }

        let promo = self.lookup(code).await?;
        let check = match promo {
            None => PromotionCheck {
                valid: false,
                discount_amount: Decimal::ZERO,
                message: "Unknown promo code".to_string(),
            },
            Some(promo) => match evaluate(&promo, amount, DateTime::now()) {
                Ok(discount) => PromotionCheck {
                    valid: true,
                    discount_amount: discount,
                    message: "Promo code applied".to_string(),
                },
                Err(reason) => PromotionCheck {
                    valid: false,
                    discount_amount: Decimal::ZERO,
                    message: reason,
                },
            },
        };
        Ok(check)
    }

    /// Booking-creation entry point: same checks as `validate`, but an
    /// invalid code aborts the booking with `PromoCodeInvalid`. Keep the two
    /// in sync through the shared `evaluate`.
    pub async fn calculate_discount(
        &self,
        code: &str,
        amount: Decimal,
    ) -> Result<Decimal, BookingError> {
        let code = code.trim();
        let promo = self
            .lookup(code)
            .await?
            .ok_or_else(|| BookingError::PromoCodeInvalid("Unknown promo code".to_string()))?;

        evaluate(&promo, Some(amount), DateTime::now()).map_err(BookingError::PromoCodeInvalid)
    }

    /// Count a redemption once a booking actually consumed the code.
    pub async fn redeem(&self, code: &str) -> Result<(), BookingError> {
        self.promotions
            .update_one(
                doc! { "code": code.trim().to_uppercase() },
                doc! { "$inc": { "usage_count": 1 } },
            )
            .await?;
        Ok(())
    }

    async fn lookup(&self, code: &str) -> Result<Option<Promotion>, BookingError> {
        // Codes are stored uppercase; normalize instead of a regex scan.
        let promo = self
            .promotions
            .find_one(doc! { "code": code.to_uppercase() })
            .await?;
        Ok(promo)
    }
}

/// The single source of truth for promotion eligibility and discount math.
/// Returns the clamped discount amount, or the human-readable reason the
/// code does not apply.
fn evaluate(
    promo: &Promotion,
    amount: Option<Decimal>,
    now: DateTime,
) -> Result<Decimal, String> {
    if !promo.active {
        return Err("Promo code is no longer active".to_string());
    }
    if let Some(from) = promo.valid_from {
        if now < from {
            return Err("Promo code is not valid yet".to_string());
        }
    }
    if let Some(until) = promo.valid_until {
        if now > until {
            return Err("Promo code has expired".to_string());
        }
    }
    if let Some(max) = promo.max_redemptions {
        if promo.usage_count >= max {
            return Err("Promo code has reached its redemption limit".to_string());
        }
    }
    // A missing amount satisfies the minimum check (lenient on purpose:
    // storefront validation may run before a total exists).
    if let (Some(min), Some(amount)) = (promo.min_booking_amount, amount) {
        if amount < min {
            return Err(format!("Booking total must be at least {}", min));
        }
    }

    let raw = match promo.discount_type {
        DiscountType::Percentage => match amount {
            Some(amount) => round_money(amount * promo.value / Decimal::from(100)),
            None => Decimal::ZERO,
        },
        DiscountType::Fixed => promo.value,
    };

    let mut discount = raw;
    if let Some(cap) = promo.max_discount_amount {
        discount = discount.min(cap);
    }
    if let Some(amount) = amount {
        discount = discount.min(amount);
    }
    Ok(discount.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn promo(discount_type: DiscountType, value: Decimal) -> Promotion {
        Promotion {
            id: None,
            code: "SAVE10".to_string(),
            discount_type,
            value,
            min_booking_amount: None,
            max_discount_amount: None,
            valid_from: None,
            valid_until: None,
            max_redemptions: None,
            usage_count: 0,
            active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn percentage_discount_clamps_to_max() {
        // SAVE10: 10% capped at $20, $500 booking -> $20
        let mut p = promo(DiscountType::Percentage, dec!(10));
        p.max_discount_amount = Some(dec!(20.00));

        let discount = evaluate(&p, Some(dec!(500.00)), DateTime::now()).unwrap();
        assert_eq!(discount, dec!(20.00));
    }

    #[test]
    fn fixed_discount_never_exceeds_booking_amount() {
        let p = promo(DiscountType::Fixed, dec!(75.00));
        let discount = evaluate(&p, Some(dec!(40.00)), DateTime::now()).unwrap();
        assert_eq!(discount, dec!(40.00));
    }

    #[test]
    fn inactive_code_is_rejected() {
        let mut p = promo(DiscountType::Fixed, dec!(5.00));
        p.active = false;
        assert!(evaluate(&p, Some(dec!(100.00)), DateTime::now()).is_err());
    }

    #[test]
    fn redemption_cap_is_enforced() {
        let mut p = promo(DiscountType::Fixed, dec!(5.00));
        p.max_redemptions = Some(3);
        p.usage_count = 3;
        assert!(evaluate(&p, Some(dec!(100.00)), DateTime::now()).is_err());
    }

    #[test]
    fn expired_window_is_rejected() {
        let mut p = promo(DiscountType::Fixed, dec!(5.00));
        p.valid_until = Some(DateTime::from_millis(0)); // 1970
        assert!(evaluate(&p, Some(dec!(100.00)), DateTime::now()).is_err());
    }

    #[test]
    fn minimum_amount_is_lenient_when_amount_missing() {
        let mut p = promo(DiscountType::Percentage, dec!(10));
        p.min_booking_amount = Some(dec!(100.00));

        // No amount: passes the minimum check but yields no discount to apply
        let discount = evaluate(&p, None, DateTime::now()).unwrap();
        assert_eq!(discount, Decimal::ZERO);

        // An amount below the minimum is rejected
        assert!(evaluate(&p, Some(dec!(50.00)), DateTime::now()).is_err());
    }

    #[test]
    fn percentage_discount_rounds_to_cents() {
        let p = promo(DiscountType::Percentage, dec!(15));
        let discount = evaluate(&p, Some(dec!(33.33)), DateTime::now()).unwrap();
        assert_eq!(discount, dec!(5.00)); // 4.9995 rounds half-up
    }
}
