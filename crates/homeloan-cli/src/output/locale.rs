use clap::ValueEnum;
use rust_decimal::Decimal;

/// Terms beyond this are shown as "> 100 years" rather than spelled out.
const MAX_SPELLED_YEARS: u32 = 100;

/// Language of the `report` output. Calculations are locale-independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    De,
}

/// Every user-facing string the report prints.
pub struct Labels {
    pub scenario: &'static str,
    pub fixed_repayment: &'static str,
    pub purchase_price: &'static str,
    pub acquisition_costs: &'static str,
    pub total_cost: &'static str,
    pub equity: &'static str,
    pub loan_amount: &'static str,
    pub monthly_interest: &'static str,
    pub monthly_repayment: &'static str,
    pub bank_rate: &'static str,
    pub maintenance_fee: &'static str,
    pub private_reserve: &'static str,
    pub total_monthly_cost: &'static str,
    pub estimated_term: &'static str,
    pub remaining_debt_after: &'static str,
    pub repaid_by_then: &'static str,
    pub loan_to_value: &'static str,
    pub per_month: &'static str,
    pub never: &'static str,
    pub year: &'static str,
    pub years: &'static str,
    /// Plural after "after" ("nach"), which takes the dative in German
    pub years_after: &'static str,
    pub month: &'static str,
    pub months: &'static str,
    pub remaining_debt: &'static str,
    pub repaid_to_date: &'static str,
    pub paid_off_in_year: &'static str,
    pub warnings: &'static str,
    pub decimal_separator: char,
    pub thousands_separator: char,
}

const EN: Labels = Labels {
    scenario: "SCENARIO",
    fixed_repayment: "Fixed repayment",
    purchase_price: "Purchase price",
    acquisition_costs: "Acquisition costs",
    total_cost: "Total cost",
    equity: "Equity",
    loan_amount: "Loan amount",
    monthly_interest: "Monthly interest",
    monthly_repayment: "Monthly repayment",
    bank_rate: "Bank rate (interest+repay)",
    maintenance_fee: "+ Maintenance fee",
    private_reserve: "+ Private reserve",
    total_monthly_cost: "TOTAL MONTHLY COST",
    estimated_term: "Estimated term",
    remaining_debt_after: "Remaining debt after",
    repaid_by_then: "Repaid by then",
    loan_to_value: "Loan-to-value",
    per_month: "/ month",
    never: "never (repayment too low)",
    year: "year",
    years: "years",
    years_after: "years",
    month: "month",
    months: "months",
    remaining_debt: "Remaining debt",
    repaid_to_date: "Repaid to date",
    paid_off_in_year: "Paid off in year",
    warnings: "Notes",
    decimal_separator: '.',
    thousands_separator: ',',
};

const DE: Labels = Labels {
    scenario: "SZENARIO",
    fixed_repayment: "Feste Tilgung",
    purchase_price: "Kaufpreis",
    acquisition_costs: "Kaufnebenkosten",
    total_cost: "Gesamtkosten",
    equity: "Eigenkapital",
    loan_amount: "Kreditbetrag",
    monthly_interest: "Monatliche Zinsen",
    monthly_repayment: "Monatliche Tilgung",
    bank_rate: "Bankrate (Zins+Tilgung)",
    maintenance_fee: "+ Hausgeld",
    private_reserve: "+ Private Rücklage",
    total_monthly_cost: "MONATLICHE GESAMTKOSTEN",
    estimated_term: "Voraussichtliche Laufzeit",
    remaining_debt_after: "Restschuld nach",
    repaid_by_then: "Bis dahin getilgt",
    loan_to_value: "Beleihungsauslauf",
    per_month: "/ Monat",
    never: "nie (Tilgung zu gering)",
    year: "Jahr",
    years: "Jahre",
    years_after: "Jahren",
    month: "Monat",
    months: "Monate",
    remaining_debt: "Restschuld",
    repaid_to_date: "Getilgt",
    paid_off_in_year: "Abbezahlt im Jahr",
    warnings: "Hinweise",
    decimal_separator: ',',
    thousands_separator: '.',
};

impl Locale {
    pub fn labels(&self) -> &'static Labels {
        match self {
            Locale::En => &EN,
            Locale::De => &DE,
        }
    }
}

impl Labels {
    /// Two decimals with grouped thousands and a trailing euro sign.
    pub fn euro(&self, amount: Decimal) -> String {
        format!("{} €", self.number(amount, 2))
    }

    pub fn percent(&self, rate: Decimal) -> String {
        format!("{} %", self.number(rate * Decimal::ONE_HUNDRED, 2))
    }

    pub fn number(&self, value: Decimal, dp: u32) -> String {
        let rounded = value.round_dp(dp);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let plain = format!("{:.*}", dp as usize, rounded.abs());
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (plain.as_str(), None),
        };

        let mut grouped = String::new();
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }

    /// "28 years, 1 month"; the month remainder is rounded and carried.
    pub fn duration(&self, years: Decimal) -> String {
        if years > Decimal::from(MAX_SPELLED_YEARS) {
            return format!("> {MAX_SPELLED_YEARS} {}", self.years);
        }
        let mut whole = years.trunc();
        let mut months = ((years - whole) * Decimal::from(12)).round();
        if months >= Decimal::from(12) {
            whole += Decimal::ONE;
            months -= Decimal::from(12);
        }
        let year_unit = if whole == Decimal::ONE { self.year } else { self.years };
        let month_unit = if months == Decimal::ONE { self.month } else { self.months };
        format!("{whole} {year_unit}, {months} {month_unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_euro_grouping_en() {
        assert_eq!(Locale::En.labels().euro(dec!(568560)), "568,560.00 €");
        assert_eq!(Locale::En.labels().euro(dec!(1800.44)), "1,800.44 €");
        assert_eq!(Locale::En.labels().euro(dec!(947.6)), "947.60 €");
    }

    #[test]
    fn test_euro_grouping_de() {
        assert_eq!(Locale::De.labels().euro(dec!(2748.04)), "2.748,04 €");
        assert_eq!(Locale::De.labels().euro(dec!(1234567.891)), "1.234.567,89 €");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(Locale::En.labels().euro(dec!(-18560)), "-18,560.00 €");
    }

    #[test]
    fn test_duration() {
        let en = Locale::En.labels();
        assert_eq!(en.duration(dec!(28.063)), "28 years, 1 month");
        assert_eq!(en.duration(dec!(25)), "25 years, 0 months");
        assert_eq!(en.duration(dec!(9.99)), "10 years, 0 months");
        assert_eq!(Locale::De.labels().duration(dec!(1.5)), "1 Jahr, 6 Monate");
    }

    #[test]
    fn test_duration_beyond_a_century() {
        assert_eq!(Locale::En.labels().duration(dec!(100)), "100 years, 0 months");
        assert_eq!(Locale::En.labels().duration(dec!(312.35)), "> 100 years");
        assert_eq!(Locale::De.labels().duration(dec!(100.01)), "> 100 Jahre");
    }

    #[test]
    fn test_percent() {
        assert_eq!(Locale::De.labels().percent(dec!(0.7107)), "71,07 %");
    }
}
