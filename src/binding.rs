//! Binds an [`ApplicationData`] record to the form.
//!
//! Binding checks that the record has the shape its applicant type requires and formats every
//! value the way it is printed (dates, phone numbers, amounts). Section builders only ever see
//! the resulting [`BoundApplication`], so a record that passed binding cannot fail to compose.

use crate::application::{
    ApplicantType, ApplicationData, BankDetails, CorporateDetails, PersonDetails, Tenor,
    INVESTOR_CATEGORIES, MONTHS,
};
use crate::error::FormError;
use crate::format::{self, NairaAmount};

/// Individual or joint applicant with every value formatted for printing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundPerson {
    pub title: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub email: String,
    pub occupation: String,
    pub passport_no: String,
    pub next_of_kin: String,
    pub mothers_maiden_name: String,
    pub address: String,
    pub cscs_number: Option<String>,
    pub chn_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundCompany {
    pub company_name: String,
    pub rc_number: String,
    pub business_type: String,
    pub contact_person: String,
    pub phone_number: String,
    pub email: String,
    pub passport_no: String,
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundBank {
    pub bank_name: String,
    pub branch: String,
    pub account_number: String,
    pub sort_code: String,
    pub bvn: String,
}

/// The identity part of the form, one variant per applicant type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applicant {
    Individual(BoundPerson),
    Joint {
        primary: BoundPerson,
        secondary: BoundPerson,
    },
    Corporate(BoundCompany),
}

impl Applicant {
    pub fn applicant_type(&self) -> ApplicantType {
        match self {
            Applicant::Individual(_) => ApplicantType::Individual,
            Applicant::Joint { .. } => ApplicantType::Joint,
            Applicant::Corporate(_) => ApplicantType::Corporate,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundTerms {
    pub tenor: Tenor,
    /// Canonical month name, one of [`MONTHS`].
    pub month_of_offer: &'static str,
    pub amount: NairaAmount,
    pub amount_in_words: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundAgent {
    pub name: String,
    pub stockbroker_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundWitness {
    pub name: String,
    pub address: String,
    pub acknowledged: bool,
}

/// Validated, formatted view of one application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundApplication {
    pub terms: BoundTerms,
    pub applicant: Applicant,
    pub bank: BoundBank,
    pub joint_bank: Option<BoundBank>,
    pub resident: bool,
    /// Canonical category names, in the order printed on the form.
    pub investor_categories: Vec<&'static str>,
    pub agent: BoundAgent,
    pub witness: Option<BoundWitness>,
    pub illiterate_applicant: bool,
}

impl BoundApplication {
    pub fn applicant_type(&self) -> ApplicantType {
        self.applicant.applicant_type()
    }
}

/// Checks `data` against its applicant type and formats it for printing.
///
/// Every failure is a [`FormError::DataInconsistency`]. Messages name fields, never values
/// supplied for personal fields.
pub fn bind(data: &ApplicationData) -> Result<BoundApplication, FormError> {
    let applicant = bind_applicant(data)?;

    let joint_bank = match (data.applicant_type, &data.joint_bank) {
        (ApplicantType::Joint, bank) => bank.as_ref().map(bind_bank),
        (_, Some(_)) => {
            return Err(FormError::inconsistent(format!(
                "joint bank details supplied for a {} applicant",
                data.applicant_type
            )))
        }
        (_, None) => None,
    };

    let witness = match (data.needs_witness, &data.witness) {
        (true, Some(witness)) => Some(BoundWitness {
            name: witness.name.trim().to_owned(),
            address: text(&witness.address),
            acknowledged: witness.acknowledged,
        }),
        (false, None) => None,
        (true, None) => {
            return Err(FormError::inconsistent(
                "a witness is required but no witness details were supplied",
            ))
        }
        (false, Some(_)) => {
            return Err(FormError::inconsistent(
                "witness details supplied but no witness is required",
            ))
        }
    };

    let agent = data
        .distribution_agent
        .as_ref()
        .map(|agent| BoundAgent {
            name: text(&agent.name),
            stockbroker_code: text(&agent.stockbroker_code),
        })
        .unwrap_or_default();

    Ok(BoundApplication {
        terms: bind_terms(data)?,
        applicant,
        bank: bind_bank(&data.bank),
        joint_bank,
        resident: data.classification.resident,
        investor_categories: bind_categories(&data.classification.investor_categories)?,
        agent,
        witness,
        illiterate_applicant: data.illiterate_applicant,
    })
}

fn bind_applicant(data: &ApplicationData) -> Result<Applicant, FormError> {
    let kind = data.applicant_type;
    let present = |name: &str, value: bool, wanted: bool| {
        if value == wanted {
            Ok(())
        } else if wanted {
            Err(FormError::inconsistent(format!(
                "{kind} application is missing {name} details"
            )))
        } else {
            Err(FormError::inconsistent(format!(
                "{kind} application must not carry {name} details"
            )))
        }
    };

    let individual_shaped = matches!(kind, ApplicantType::Individual | ApplicantType::Joint);
    present(
        "primary applicant",
        data.primary_applicant.is_some(),
        individual_shaped,
    )?;
    present(
        "joint applicant",
        data.joint_applicant.is_some(),
        kind == ApplicantType::Joint,
    )?;
    present(
        "corporate",
        data.corporate.is_some(),
        kind == ApplicantType::Corporate,
    )?;

    match (&data.primary_applicant, &data.joint_applicant, &data.corporate) {
        (Some(primary), None, None) => Ok(Applicant::Individual(bind_person(
            primary,
            "primary applicant",
        )?)),
        (Some(primary), Some(secondary), None) => Ok(Applicant::Joint {
            primary: bind_person(primary, "primary applicant")?,
            secondary: bind_person(secondary, "joint applicant")?,
        }),
        (None, None, Some(company)) => Ok(Applicant::Corporate(bind_company(company)?)),
        _ => Err(FormError::inconsistent(format!(
            "{kind} application has an unexpected combination of applicant details"
        ))),
    }
}

fn bind_person(person: &PersonDetails, role: &str) -> Result<BoundPerson, FormError> {
    require(&person.full_name, role, "full name")?;
    Ok(BoundPerson {
        title: text(&person.title),
        full_name: person.full_name.trim().to_owned(),
        date_of_birth: person
            .date_of_birth
            .map(format::format_date)
            .unwrap_or_default(),
        phone_number: phone(&person.phone_number),
        email: text(&person.email),
        occupation: text(&person.occupation),
        passport_no: text(&person.passport_no),
        next_of_kin: text(&person.next_of_kin),
        mothers_maiden_name: text(&person.mothers_maiden_name),
        address: text(&person.address),
        cscs_number: optional(&person.cscs_number),
        chn_number: optional(&person.chn_number),
    })
}

fn bind_company(company: &CorporateDetails) -> Result<BoundCompany, FormError> {
    require(&company.company_name, "corporate", "company name")?;
    require(&company.rc_number, "corporate", "RC number")?;
    require(&company.contact_person, "corporate", "contact person")?;
    Ok(BoundCompany {
        company_name: company.company_name.trim().to_owned(),
        rc_number: company.rc_number.trim().to_owned(),
        business_type: text(&company.business_type),
        contact_person: company.contact_person.trim().to_owned(),
        phone_number: phone(&company.phone_number),
        email: text(&company.email),
        passport_no: text(&company.passport_no),
        address: text(&company.address),
    })
}

fn bind_bank(bank: &BankDetails) -> BoundBank {
    BoundBank {
        bank_name: bank.bank_name.trim().to_owned(),
        branch: text(&bank.branch),
        account_number: bank.account_number.trim().to_owned(),
        sort_code: text(&bank.sort_code),
        bvn: text(&bank.bvn),
    }
}

fn bind_terms(data: &ApplicationData) -> Result<BoundTerms, FormError> {
    let requested = data.terms.month_of_offer.trim();
    let month_of_offer = MONTHS
        .iter()
        .copied()
        .find(|month| month.eq_ignore_ascii_case(requested))
        .ok_or_else(|| {
            FormError::inconsistent(format!("unrecognised month of offer '{requested}'"))
        })?;

    let amount = NairaAmount::from_decimal(data.terms.amount).ok_or_else(|| {
        FormError::inconsistent("subscription amount is negative or out of range")
    })?;

    let amount_in_words = data
        .terms
        .amount_in_words
        .as_deref()
        .map(str::trim)
        .filter(|words| !words.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| amount.in_words());

    Ok(BoundTerms {
        tenor: data.terms.tenor,
        month_of_offer,
        amount,
        amount_in_words,
    })
}

fn bind_categories(requested: &[String]) -> Result<Vec<&'static str>, FormError> {
    if requested.is_empty() {
        return Err(FormError::inconsistent(
            "at least one investor category is required",
        ));
    }
    if requested.len() > INVESTOR_CATEGORIES.len() {
        return Err(FormError::inconsistent(format!(
            "{} investor categories supplied, at most {} exist",
            requested.len(),
            INVESTOR_CATEGORIES.len()
        )));
    }
    if let Some(unknown) = requested.iter().find(|value| {
        !INVESTOR_CATEGORIES
            .iter()
            .any(|category| category.eq_ignore_ascii_case(value.trim()))
    }) {
        return Err(FormError::inconsistent(format!(
            "unknown investor category '{}'",
            unknown.trim()
        )));
    }
    Ok(INVESTOR_CATEGORIES
        .iter()
        .copied()
        .filter(|category| {
            requested
                .iter()
                .any(|value| category.eq_ignore_ascii_case(value.trim()))
        })
        .collect())
}

fn require(value: &str, role: &str, field: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::inconsistent(format!("{role} {field} is blank")))
    } else {
        Ok(())
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_owned()
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn phone(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(format::normalize_phone)
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::{BondTerms, Classification, DistributionAgent, WitnessDetails};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    pub(crate) fn person(name: &str) -> PersonDetails {
        PersonDetails {
            title: Some("Mrs".into()),
            full_name: name.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            phone_number: Some("0803 123 4567".into()),
            email: Some("ada@example.com".into()),
            occupation: Some("Engineer".into()),
            address: Some("12 Marina Road, Lagos".into()),
            ..PersonDetails::default()
        }
    }

    pub(crate) fn individual() -> ApplicationData {
        ApplicationData {
            terms: BondTerms {
                tenor: Tenor::TwoYear,
                month_of_offer: "March".into(),
                amount: Decimal::from(5_000),
                amount_in_words: None,
            },
            applicant_type: ApplicantType::Individual,
            primary_applicant: Some(person("Ada Obi")),
            joint_applicant: None,
            corporate: None,
            bank: BankDetails {
                bank_name: "Zenith Bank".into(),
                branch: Some("Marina".into()),
                account_number: "0123456789".into(),
                sort_code: None,
                bvn: Some("22123456789".into()),
            },
            joint_bank: None,
            classification: Classification {
                resident: true,
                investor_categories: vec!["Individual".into()],
            },
            distribution_agent: Some(DistributionAgent {
                name: Some("Acme Securities".into()),
                stockbroker_code: None,
            }),
            needs_witness: false,
            witness: None,
            illiterate_applicant: false,
        }
    }

    pub(crate) fn joint() -> ApplicationData {
        let mut data = individual();
        data.applicant_type = ApplicantType::Joint;
        data.joint_applicant = Some(person("Chidi Obi"));
        data
    }

    pub(crate) fn corporate() -> ApplicationData {
        let mut data = individual();
        data.applicant_type = ApplicantType::Corporate;
        data.primary_applicant = None;
        data.corporate = Some(CorporateDetails {
            company_name: "Obi Holdings Ltd".into(),
            rc_number: "RC123456".into(),
            contact_person: "Ada Obi".into(),
            ..CorporateDetails::default()
        });
        data.classification.investor_categories = vec!["Corporate".into()];
        data
    }

    fn inconsistency(data: &ApplicationData) -> String {
        match bind(data) {
            Err(FormError::DataInconsistency(message)) => message,
            other => panic!("expected a data inconsistency, got {other:?}"),
        }
    }

    #[test]
    fn binds_individual_record() {
        let bound = bind(&individual()).expect("consistent record");
        assert_eq!(bound.applicant_type(), ApplicantType::Individual);
        assert_eq!(bound.terms.month_of_offer, "March");
        assert_eq!(bound.terms.amount_in_words, "Five Thousand Naira");
        let Applicant::Individual(person) = &bound.applicant else {
            panic!("expected an individual applicant");
        };
        assert_eq!(person.phone_number, "+2348031234567");
        assert_eq!(person.date_of_birth, "17/05/1990");
        assert_eq!(bound.agent.name, "Acme Securities");
        assert!(bound.witness.is_none());
    }

    #[test]
    fn supplied_amount_in_words_wins_unless_blank() {
        let mut data = individual();
        data.terms.amount_in_words = Some("Five Thousand Naira Only".into());
        assert_eq!(
            bind(&data).expect("consistent").terms.amount_in_words,
            "Five Thousand Naira Only"
        );
        data.terms.amount_in_words = Some("   ".into());
        assert_eq!(
            bind(&data).expect("consistent").terms.amount_in_words,
            "Five Thousand Naira"
        );
    }

    #[test]
    fn individual_with_joint_details_is_rejected() {
        let mut data = individual();
        data.joint_applicant = Some(person("Chidi Obi"));
        assert!(inconsistency(&data).contains("joint applicant"));
    }

    #[test]
    fn joint_without_secondary_is_rejected() {
        let mut data = joint();
        data.joint_applicant = None;
        assert!(inconsistency(&data).contains("missing joint applicant"));
    }

    #[test]
    fn corporate_rules() {
        assert!(matches!(
            bind(&corporate()).map(|b| b.applicant_type()),
            Ok(ApplicantType::Corporate)
        ));

        let mut with_person = corporate();
        with_person.primary_applicant = Some(person("Ada Obi"));
        assert!(inconsistency(&with_person).contains("primary applicant"));

        let mut with_joint_bank = corporate();
        with_joint_bank.joint_bank = Some(BankDetails::default());
        assert!(inconsistency(&with_joint_bank).contains("joint bank"));

        let mut blank_rc = corporate();
        if let Some(company) = blank_rc.corporate.as_mut() {
            company.rc_number = " ".into();
        }
        assert!(inconsistency(&blank_rc).contains("RC number"));
    }

    #[test]
    fn witness_must_match_flag() {
        let mut missing = individual();
        missing.needs_witness = true;
        assert!(inconsistency(&missing).contains("witness"));

        let mut unexpected = individual();
        unexpected.witness = Some(WitnessDetails::default());
        assert!(inconsistency(&unexpected).contains("witness"));

        let mut present = individual();
        present.needs_witness = true;
        present.witness = Some(WitnessDetails {
            name: "Musa Bello".into(),
            address: None,
            acknowledged: true,
        });
        let witness = bind(&present).expect("consistent").witness;
        assert_eq!(witness.map(|w| w.acknowledged), Some(true));
    }

    #[test]
    fn categories_are_checked_and_ordered() {
        let mut data = individual();
        data.classification.investor_categories =
            vec!["staff scheme".into(), "Insurance".into()];
        assert_eq!(
            bind(&data).expect("consistent").investor_categories,
            ["Insurance", "Staff Scheme"]
        );

        data.classification.investor_categories = vec![];
        assert!(inconsistency(&data).contains("at least one"));

        data.classification.investor_categories = vec!["Hedge Fund".into()];
        assert!(inconsistency(&data).contains("Hedge Fund"));
    }

    #[test]
    fn month_and_amount_are_checked() {
        let mut data = individual();
        data.terms.month_of_offer = "march".into();
        assert_eq!(bind(&data).expect("consistent").terms.month_of_offer, "March");

        data.terms.month_of_offer = "Smarch".into();
        assert!(inconsistency(&data).contains("month"));

        let mut negative = individual();
        negative.terms.amount = Decimal::from(-5);
        assert!(inconsistency(&negative).contains("amount"));
    }

    #[test]
    fn messages_do_not_leak_personal_values() {
        let mut data = individual();
        data.joint_applicant = Some(person("Secret Name"));
        assert!(!inconsistency(&data).contains("Secret Name"));
    }
}
