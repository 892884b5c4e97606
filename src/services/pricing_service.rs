use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::env;

use crate::models::pricing::{BookingExtra, PricingSnapshot};
use crate::services::error::BookingError;

/// Platform-level pricing knobs, read once at startup.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Tax applied to the discounted subtotal, as a fraction (0.10 = 10%).
    pub tax_rate: Decimal,
    /// Flat service fee added after taxes.
    pub service_fee: Decimal,
    pub currency: String,
}

impl PricingConfig {
    pub fn from_env() -> Self {
        let tax_rate = env::var("TAX_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| Decimal::new(10, 2)); // 0.10
        let service_fee = env::var("SERVICE_FEE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| Decimal::new(500, 2)); // 5.00
        let currency = env::var("CURRENCY").unwrap_or_else(|_| "USD".to_string());

        Self {
            tax_rate,
            service_fee,
            currency,
        }
    }
}

/// Round to 2 decimal places, half-up. All stored money goes through this.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub struct PricingService;

impl PricingService {
    /// Whole rental days in `[start, end)`. End day is exclusive:
    /// May 1 to May 4 is 3 days.
    pub fn rental_days(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, BookingError> {
        let days = (end.date_naive() - start.date_naive()).num_days();
        if days < 1 {
            return Err(BookingError::InvalidDateRange);
        }
        Ok(days)
    }

    /// Price a per-day rental: rate and every extra accrue for each day of
    /// the range. The discount comes from the promotion validator and may be
    /// zero.
    pub fn quote_rental(
        rate: Decimal,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        extras: &[BookingExtra],
        discount: Decimal,
        deposit: Decimal,
        config: &PricingConfig,
    ) -> Result<PricingSnapshot, BookingError> {
        let days = Self::rental_days(start, end)?;
        let days_dec = Decimal::from(days);

        let extras_total: Decimal = extras
            .iter()
            .map(|e| e.price_per_day * Decimal::from(e.quantity) * days_dec)
            .sum();

        let subtotal = rate * days_dec + extras_total;
        Ok(Self::finish(
            rate,
            days,
            extras_total,
            subtotal,
            discount,
            deposit,
            config,
        ))
    }

    /// Price a seat-based product (circuit departure, excursion): a flat
    /// per-unit rate times the head count, no per-day accrual.
    pub fn quote_seats(
        unit_price: Decimal,
        count: u32,
        discount: Decimal,
        config: &PricingConfig,
    ) -> PricingSnapshot {
        let subtotal = unit_price * Decimal::from(count);
        Self::finish(
            unit_price,
            1,
            Decimal::ZERO,
            subtotal,
            discount,
            Decimal::ZERO,
            config,
        )
    }

    fn finish(
        rate: Decimal,
        days: i64,
        extras_total: Decimal,
        subtotal: Decimal,
        discount: Decimal,
        deposit: Decimal,
        config: &PricingConfig,
    ) -> PricingSnapshot {
        let taxable = (subtotal - discount).max(Decimal::ZERO);
        let taxes = taxable * config.tax_rate;
        let total = taxable + taxes + config.service_fee;

        PricingSnapshot {
            rate: round_money(rate),
            days,
            extras_total: round_money(extras_total),
            subtotal: round_money(subtotal),
            discount: round_money(discount),
            tax_rate: config.tax_rate,
            taxes: round_money(taxes),
            fees: round_money(config.service_fee),
            total: round_money(total),
            deposit: round_money(deposit),
            currency: config.currency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn config() -> PricingConfig {
        PricingConfig {
            tax_rate: dec!(0.10),
            service_fee: dec!(5.00),
            currency: "USD".to_string(),
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn three_day_rental_with_gps_extra() {
        // $50/day for May 1-4 plus a $5/day GPS, 10% tax, $5 fee
        let extras = vec![BookingExtra {
            name: "GPS".to_string(),
            price_per_day: dec!(5.00),
            quantity: 1,
        }];
        let snapshot = PricingService::quote_rental(
            dec!(50.00),
            day(1),
            day(4),
            &extras,
            Decimal::ZERO,
            dec!(200.00),
            &config(),
        )
        .unwrap();

        assert_eq!(snapshot.days, 3);
        assert_eq!(snapshot.extras_total, dec!(15.00));
        assert_eq!(snapshot.subtotal, dec!(165.00));
        assert_eq!(snapshot.taxes, dec!(16.50));
        assert_eq!(snapshot.total, dec!(186.50));
        assert_eq!(snapshot.deposit, dec!(200.00));
    }

    #[test]
    fn discount_reduces_taxable_base() {
        let snapshot = PricingService::quote_rental(
            dec!(100.00),
            day(1),
            day(2),
            &[],
            dec!(20.00),
            Decimal::ZERO,
            &config(),
        )
        .unwrap();

        // (100 - 20) * 1.10 + 5
        assert_eq!(snapshot.discount, dec!(20.00));
        assert_eq!(snapshot.taxes, dec!(8.00));
        assert_eq!(snapshot.total, dec!(93.00));
    }

    #[test]
    fn discount_larger_than_subtotal_floors_at_zero() {
        let snapshot = PricingService::quote_rental(
            dec!(30.00),
            day(1),
            day(2),
            &[],
            dec!(100.00),
            Decimal::ZERO,
            &config(),
        )
        .unwrap();

        assert_eq!(snapshot.taxes, dec!(0.00));
        assert_eq!(snapshot.total, dec!(5.00)); // fee only
    }

    #[test]
    fn reversed_and_equal_ranges_are_rejected() {
        let err = PricingService::quote_rental(
            dec!(50.00),
            day(4),
            day(1),
            &[],
            Decimal::ZERO,
            Decimal::ZERO,
            &config(),
        )
        .unwrap_err();
        assert_eq!(err, BookingError::InvalidDateRange);

        let err = PricingService::quote_rental(
            dec!(50.00),
            day(2),
            day(2),
            &[],
            Decimal::ZERO,
            Decimal::ZERO,
            &config(),
        )
        .unwrap_err();
        assert_eq!(err, BookingError::InvalidDateRange);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn seat_quote_multiplies_head_count() {
        let snapshot = PricingService::quote_seats(dec!(80.00), 4, Decimal::ZERO, &config());
        assert_eq!(snapshot.subtotal, dec!(320.00));
        assert_eq!(snapshot.taxes, dec!(32.00));
        assert_eq!(snapshot.total, dec!(357.00));
    }
}
