//! Input record handed to the generator by the persistence/validation layer.
//!
//! The types mirror the fields of the paper form and deserialize from JSON with `serde`, so the
//! record can be produced by any frontend. They carry no rendering concerns; the variant
//! dependent parts are optional here and checked against [`ApplicantType`] when the record is
//! bound (see [`crate::binding`]).

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bond tenor offered by the programme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenor {
    #[serde(rename = "2-Year")]
    TwoYear,
    #[serde(rename = "3-Year")]
    ThreeYear,
}

impl Tenor {
    /// All tenors in the order printed on the form.
    pub const ALL: [Tenor; 2] = [Tenor::TwoYear, Tenor::ThreeYear];

    pub fn label(self) -> &'static str {
        match self {
            Tenor::TwoYear => "2-Year",
            Tenor::ThreeYear => "3-Year",
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Discriminator selecting the identity variant of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicantType {
    Individual,
    Joint,
    Corporate,
}

impl fmt::Display for ApplicantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApplicantType::Individual => "Individual",
            ApplicantType::Joint => "Joint",
            ApplicantType::Corporate => "Corporate",
        })
    }
}

/// Months selectable as the month of offer, in calendar order.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Investor categories printed on the form, in their printed order.
pub const INVESTOR_CATEGORIES: [&str; 10] = [
    "Individual",
    "Insurance",
    "Corporate",
    "Others",
    "Foreign Investor",
    "Non-Bank Financial Institution",
    "Co-operative Society",
    "Government Agencies",
    "Staff Scheme",
    "Micro Finance Bank",
];

/// Terms of the bond being subscribed for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    pub tenor: Tenor,
    pub month_of_offer: String,
    pub amount: Decimal,
    /// Pre-computed wording; derived from `amount` when absent or blank.
    #[serde(default)]
    pub amount_in_words: Option<String>,
}

/// Identity fields shared by individual and joint applicants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDetails {
    pub title: Option<String>,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub occupation: Option<String>,
    pub passport_no: Option<String>,
    pub next_of_kin: Option<String>,
    pub mothers_maiden_name: Option<String>,
    pub address: Option<String>,
    /// CSCS account number (brokerage identifier).
    pub cscs_number: Option<String>,
    /// Clearing House Number (brokerage identifier).
    pub chn_number: Option<String>,
}

/// Identity fields of a corporate applicant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorporateDetails {
    pub company_name: String,
    pub rc_number: String,
    pub business_type: Option<String>,
    pub contact_person: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub passport_no: Option<String>,
    pub address: Option<String>,
}

/// Bank account receiving coupons and redemption proceeds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankDetails {
    pub bank_name: String,
    pub branch: Option<String>,
    pub account_number: String,
    pub sort_code: Option<String>,
    pub bvn: Option<String>,
}

/// Residency and investor classification of the applicant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub resident: bool,
    pub investor_categories: Vec<String>,
}

/// Distribution agent that lodged the application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionAgent {
    pub name: Option<String>,
    pub stockbroker_code: Option<String>,
}

/// Witness attesting for an applicant who cannot sign.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitnessDetails {
    pub name: String,
    pub address: Option<String>,
    pub acknowledged: bool,
}

/// One complete subscription application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationData {
    pub terms: BondTerms,
    pub applicant_type: ApplicantType,
    #[serde(default)]
    pub primary_applicant: Option<PersonDetails>,
    #[serde(default)]
    pub joint_applicant: Option<PersonDetails>,
    #[serde(default)]
    pub corporate: Option<CorporateDetails>,
    pub bank: BankDetails,
    #[serde(default)]
    pub joint_bank: Option<BankDetails>,
    pub classification: Classification,
    #[serde(default)]
    pub distribution_agent: Option<DistributionAgent>,
    #[serde(default)]
    pub needs_witness: bool,
    #[serde(default)]
    pub witness: Option<WitnessDetails>,
    /// The applicant cannot sign and leaves a thumbprint instead.
    #[serde(default)]
    pub illiterate_applicant: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_individual_record() {
        let json = r#"{
            "terms": {"tenor": "2-Year", "month_of_offer": "March", "amount": "5000"},
            "applicant_type": "Individual",
            "primary_applicant": {"full_name": "Ada Obi", "date_of_birth": "1990-05-17"},
            "bank": {"bank_name": "Zenith Bank", "account_number": "0123456789"},
            "classification": {"resident": true, "investor_categories": ["Individual"]}
        }"#;

        let data: ApplicationData = serde_json::from_str(json).expect("valid record");
        assert_eq!(data.terms.tenor, Tenor::TwoYear);
        assert_eq!(data.applicant_type, ApplicantType::Individual);
        assert_eq!(
            data.primary_applicant.and_then(|p| p.date_of_birth),
            NaiveDate::from_ymd_opt(1990, 5, 17)
        );
        assert!(!data.needs_witness);
        assert!(data.witness.is_none());
        assert!(data.terms.amount_in_words.is_none());
    }

    #[test]
    fn tenor_labels_match_the_form() {
        let labels: Vec<_> = Tenor::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(labels, ["2-Year", "3-Year"]);
    }
}
