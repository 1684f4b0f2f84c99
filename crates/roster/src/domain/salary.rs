//! Tax table and salary arithmetic.
//!
//! Amounts are [`Decimal`]s throughout; derived money values are rounded to
//! two decimal places, midpoint away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on derived money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Flat income-tax rate for `country`. Countries without an entry pay none.
pub fn tax_rate(country: &str) -> Decimal {
    match country {
        "India" => Decimal::new(10, 2),
        "United States" => Decimal::new(12, 2),
        _ => Decimal::ZERO,
    }
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Breakdown of a gross salary after tax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetSalary {
    pub gross_salary: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub net_salary: Decimal,
}

impl NetSalary {
    pub fn calculate(gross_salary: Decimal, country: &str) -> Self {
        let tax_rate = tax_rate(country);
        let tax = gross_salary * tax_rate;

        Self {
            gross_salary,
            tax_rate,
            tax_amount: round_money(tax),
            net_salary: round_money(gross_salary - tax),
        }
    }
}

/// Salary spread across the employees of one country.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SalaryStats {
    pub min_salary: Decimal,
    pub max_salary: Decimal,
    pub avg_salary: Decimal,
    pub count: i64,
}

/// Average salary across the employees holding one job title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobTitleSalaryStats {
    pub job_title: String,
    pub avg_salary: Decimal,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn india_pays_ten_percent() {
        let salary = NetSalary::calculate(dec("100000"), "India");
        assert_eq!(salary.tax_rate, dec("0.10"));
        assert_eq!(salary.tax_amount, dec("10000"));
        assert_eq!(salary.net_salary, dec("90000"));
    }

    #[test]
    fn united_states_pays_twelve_percent() {
        let salary = NetSalary::calculate(dec("1234.56"), "United States");
        // 1234.56 * 0.12 = 148.1472
        assert_eq!(salary.tax_amount, dec("148.15"));
        assert_eq!(salary.net_salary, dec("1086.41"));
        assert_eq!(salary.gross_salary, dec("1234.56"));
    }

    #[test]
    fn unknown_country_is_untaxed() {
        let salary = NetSalary::calculate(dec("5000"), "Atlantis");
        assert_eq!(salary.tax_rate, Decimal::ZERO);
        assert_eq!(salary.tax_amount, Decimal::ZERO);
        assert_eq!(salary.net_salary, dec("5000"));
    }

    #[test]
    fn rounding_is_midpoint_away_from_zero() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("0.135")), dec("0.14"));
    }
}
