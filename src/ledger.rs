use rust_decimal::Decimal;

/// Freight is collected at delivery only for to-pay consignments.
pub const FREIGHT_TYPE_TOPAY: &str = "Topay";
/// Freight already settled by the consignor at booking time.
pub const FREIGHT_TYPE_PAID: &str = "Paid";

/// Individual charge heads billed on a cash memo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CashMemoCharges {
    pub hamali: Option<Decimal>,
    pub bc: Option<Decimal>,
    pub landing: Option<Decimal>,
    pub lc: Option<Decimal>,
}

impl CashMemoCharges {
    pub fn new(
        hamali: impl Into<Option<Decimal>>,
        bc: impl Into<Option<Decimal>>,
        landing: impl Into<Option<Decimal>>,
        lc: impl Into<Option<Decimal>>,
    ) -> Self {
        Self {
            hamali: hamali.into(),
            bc: bc.into(),
            landing: landing.into(),
            lc: lc.into(),
        }
    }
}

/// Single source of truth for the cash memo total.
///
/// Total = hamali + bc + landing + lc, plus the freight when the consignment
/// is to-pay. Absent charge heads count as zero; the computation never fails.
pub fn cash_memo_total(
    charges: CashMemoCharges,
    freight: Option<Decimal>,
    freight_type: &str,
) -> Decimal {
    let base = charges.hamali.unwrap_or_default()
        + charges.bc.unwrap_or_default()
        + charges.landing.unwrap_or_default()
        + charges.lc.unwrap_or_default();

    if freight_type == FREIGHT_TYPE_TOPAY {
        base + freight.unwrap_or_default()
    } else {
        base
    }
}

/// Door-delivery total: the stored value wins when present, otherwise
/// `dd_rate * pkgs` when both are known.
pub fn dd_total(
    dd_rate: Option<Decimal>,
    pkgs: Option<i32>,
    stored: Option<Decimal>,
) -> Option<Decimal> {
    stored.or_else(|| {
        let rate = dd_rate?;
        let pkgs = pkgs?;
        Some(rate * Decimal::from(pkgs))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn topay_freight_is_included() {
        let charges = CashMemoCharges::new(dec!(0), dec!(5), dec!(0), dec!(0));
        let total = cash_memo_total(charges, Some(dec!(120)), "Topay");
        assert_eq!(total, dec!(125.00));
    }

    #[test]
    fn paid_freight_is_excluded() {
        let charges = CashMemoCharges::new(dec!(0), dec!(5), dec!(0), dec!(0));
        let total = cash_memo_total(charges, Some(dec!(120)), "Paid");
        assert_eq!(total, dec!(5.00));
    }

    #[test]
    fn missing_charges_count_as_zero() {
        let total = cash_memo_total(CashMemoCharges::default(), None, "Topay");
        assert_eq!(total, Decimal::ZERO);

        let charges = CashMemoCharges::new(dec!(10), None, None, dec!(2.50));
        let total = cash_memo_total(charges, None, "TBB");
        assert_eq!(total, dec!(12.50));
    }

    #[test]
    fn all_heads_sum() {
        let charges = CashMemoCharges::new(dec!(12), dec!(5), dec!(8), dec!(3));
        assert_eq!(
            cash_memo_total(charges, Some(dec!(100)), "Topay"),
            dec!(128)
        );
        assert_eq!(cash_memo_total(charges, Some(dec!(100)), "FOC"), dec!(28));
    }

    #[test]
    fn dd_total_prefers_stored_value() {
        assert_eq!(
            dd_total(Some(dec!(5)), Some(10), Some(dec!(42))),
            Some(dec!(42))
        );
        assert_eq!(dd_total(Some(dec!(5)), Some(10), None), Some(dec!(50)));
        assert_eq!(dd_total(Some(dec!(5)), None, None), None);
        assert_eq!(dd_total(None, Some(10), None), None);
    }
}
