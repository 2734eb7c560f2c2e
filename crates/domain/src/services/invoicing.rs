//! Invoice number formatting and amount calculation.
//!
//! Everything here is a pure computation. Sequence allocation itself is the
//! persistence layer's job: it owns the per-year counter and serializes
//! concurrent increments; these functions only turn the allocated state
//! into numbers and amounts.

use chrono::{Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::DomainError;
use crate::models::invoice::InvoiceItem;

/// Payment terms applied to every invoice.
pub const PAYMENT_TERMS_DAYS: i64 = 30;

/// Net, VAT and gross amounts of an invoice, rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBreakdown {
    pub net_amount: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
}

/// Formats the invoice number for a year and an already-allocated sequence
/// value.
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{}-{:05}", year, sequence)
}

/// Invoice number following the last allocated sequence of `year`.
///
/// Numbering restarts at 1 each calendar year, so a fresh year passes 0
/// here regardless of where the previous year ended. The caller must have
/// obtained `last_sequence` through the persistence layer's atomic
/// get-and-increment; this function performs no coordination of its own.
pub fn next_invoice_number(year: i32, last_sequence: i64) -> String {
    format_invoice_number(year, last_sequence + 1)
}

/// Computes net/VAT/gross amounts for a set of line items.
///
/// The net amount is the exact `Decimal` sum of `quantity x unit_price`,
/// rounded once at the end; VAT is derived from that net, so summing many
/// fractional lines cannot accumulate rounding drift. Negative quantities
/// and prices are legitimate (credit notes) and pass through.
pub fn compute_amounts(
    items: &[InvoiceItem],
    vat_rate: Decimal,
) -> Result<AmountBreakdown, DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidInput(
            "an invoice requires at least one line item".to_string(),
        ));
    }

    let net_exact: Decimal = items.iter().map(InvoiceItem::line_total).sum();

    let net_amount = round_amount(net_exact);
    let vat_amount = round_amount(net_amount * vat_rate / Decimal::ONE_HUNDRED);
    let gross_amount = net_amount + vat_amount;

    Ok(AmountBreakdown {
        net_amount,
        vat_amount,
        gross_amount,
    })
}

/// Due date is the invoice date plus 30 calendar days, with standard
/// month/year rollover.
pub fn due_date(invoice_date: NaiveDate) -> NaiveDate {
    invoice_date + Duration::days(PAYMENT_TERMS_DAYS)
}

/// Commercial rounding to 2 decimal places.
fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: &str, unit_price: &str) -> InvoiceItem {
        InvoiceItem {
            description: "Consulting".to_string(),
            quantity: quantity.parse().unwrap(),
            unit: "h".to_string(),
            unit_price: unit_price.parse().unwrap(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(next_invoice_number(2026, 0), "INV-2026-00001");
        assert_eq!(next_invoice_number(2026, 41), "INV-2026-00042");
    }

    #[test]
    fn test_invoice_number_resets_per_year() {
        // A new year starts from sequence 0 no matter where the previous
        // year ended.
        assert_eq!(next_invoice_number(2025, 1385), "INV-2025-01386");
        assert_eq!(next_invoice_number(2026, 0), "INV-2026-00001");
    }

    #[test]
    fn test_invoice_number_beyond_padding_width() {
        assert_eq!(next_invoice_number(2026, 99_999), "INV-2026-100000");
    }

    #[test]
    fn test_swiss_vat_arithmetic() {
        let amounts = compute_amounts(&[item("1", "1000")], dec("7.7")).unwrap();
        assert_eq!(amounts.net_amount, dec("1000.00"));
        assert_eq!(amounts.vat_amount, dec("77.00"));
        assert_eq!(amounts.gross_amount, dec("1077.00"));
    }

    #[test]
    fn test_fractional_quantity() {
        let amounts = compute_amounts(&[item("1.5", "200")], dec("19")).unwrap();
        assert_eq!(amounts.net_amount, dec("300.00"));
        assert_eq!(amounts.vat_amount, dec("57.00"));
        assert_eq!(amounts.gross_amount, dec("357.00"));
    }

    #[test]
    fn test_gross_equals_net_plus_vat() {
        let amounts = compute_amounts(
            &[item("3", "333.33"), item("0.25", "1200"), item("2", "49.95")],
            dec("8.1"),
        )
        .unwrap();
        assert_eq!(
            amounts.gross_amount,
            amounts.net_amount + amounts.vat_amount
        );
    }

    #[test]
    fn test_rounding_stability_over_many_items() {
        // 100 lines of 0.1 x 9.99: the exact net is 99.90. Rounding only
        // the final values must match rounding the net total once.
        let items: Vec<InvoiceItem> = (0..100).map(|_| item("0.1", "9.99")).collect();
        let amounts = compute_amounts(&items, dec("7.7")).unwrap();

        assert_eq!(amounts.net_amount, dec("99.90"));
        assert_eq!(amounts.vat_amount, dec("7.69"));
        assert_eq!(amounts.gross_amount, dec("107.59"));
    }

    #[test]
    fn test_zero_vat_rate() {
        let amounts = compute_amounts(&[item("2", "50")], Decimal::ZERO).unwrap();
        assert_eq!(amounts.net_amount, dec("100.00"));
        assert_eq!(amounts.vat_amount, dec("0.00"));
        assert_eq!(amounts.gross_amount, dec("100.00"));
    }

    #[test]
    fn test_negative_amounts_pass_through() {
        // Credit notes carry negative lines; the calculator does not judge.
        let amounts = compute_amounts(&[item("-1", "500")], dec("7.7")).unwrap();
        assert_eq!(amounts.net_amount, dec("-500.00"));
        assert_eq!(amounts.vat_amount, dec("-38.50"));
        assert_eq!(amounts.gross_amount, dec("-538.50"));
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = compute_amounts(&[], dec("7.7")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_due_date_rolls_over_month() {
        let invoice_date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            due_date(invoice_date),
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        );
    }

    #[test]
    fn test_due_date_rolls_over_year() {
        let invoice_date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        assert_eq!(
            due_date(invoice_date),
            NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
        );
    }

    #[test]
    fn test_due_date_across_leap_day() {
        let invoice_date = NaiveDate::from_ymd_opt(2028, 2, 1).unwrap();
        assert_eq!(
            due_date(invoice_date),
            NaiveDate::from_ymd_opt(2028, 3, 2).unwrap()
        );
    }
}
