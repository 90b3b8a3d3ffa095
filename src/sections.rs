//! Builders turning a bound application into the sections of the form.
//!
//! Each builder is a pure function of the [`BoundApplication`]; none of them touches fonts,
//! pages or global state, so their output can be compared directly in tests.

use crate::application::{Tenor, INVESTOR_CATEGORIES, MONTHS};
use crate::binding::{Applicant, BoundApplication, BoundBank, BoundCompany, BoundPerson};
use crate::format::{format_naira, MAXIMUM_SUBSCRIPTION, MINIMUM_SUBSCRIPTION};
use crate::model::{
    CheckboxField, CheckboxGroup, FieldRow, FixedWidthField, Primitive, Section, SectionKind,
    SelectionMode, TextRole,
};
use rust_decimal::Decimal;

pub const PHONE_CELLS: usize = 14;
pub const CSCS_CELLS: usize = 10;
pub const CHN_CELLS: usize = 12;
pub const ACCOUNT_NUMBER_CELLS: usize = 10;
pub const BVN_CELLS: usize = 11;
pub const NAIRA_CELLS: usize = 8;
pub const KOBO_CELLS: usize = 2;

pub const WITNESS_ACKNOWLEDGMENT: &str =
    "I confirm that I have witnessed this application and the thumbprint belongs to the applicant";

const LABEL_WEIGHT: usize = 2;
const VALUE_WEIGHT: usize = 3;

fn two_pairs(left: (&str, &str), right: (&str, &str)) -> Primitive {
    Primitive::FieldRow(
        FieldRow::new()
            .pair(left.0, left.1, LABEL_WEIGHT, VALUE_WEIGHT)
            .pair(right.0, right.1, LABEL_WEIGHT, VALUE_WEIGHT),
    )
}

fn wide_pair(label: &str, value: &str) -> Primitive {
    Primitive::FieldRow(FieldRow::new().pair(
        label,
        value,
        LABEL_WEIGHT,
        2 * VALUE_WEIGHT + LABEL_WEIGHT,
    ))
}

fn naira(value: i64) -> String {
    format_naira(Decimal::from(value)).unwrap_or_default()
}

/// Section A: tenor, month of offer, amount applied for.
pub fn bond_terms(app: &BoundApplication) -> Section {
    let terms = &app.terms;
    Section::builder(SectionKind::BondTerms, "Guide to Applications")
        .push(Primitive::section_header(Some('A'), "Guide to Applications"))
        .push(Primitive::CheckboxGroup(
            CheckboxGroup::new(Tenor::ALL.map(Tenor::label), SelectionMode::Single)
                .with_label("Tenor of Bond:")
                .with_selected([terms.tenor.label()]),
        ))
        .push(Primitive::CheckboxGroup(
            CheckboxGroup::new(MONTHS, SelectionMode::Single)
                .with_label("Month of Offer:")
                .with_columns(6)
                .with_selected([terms.month_of_offer]),
        ))
        .push(two_pairs(
            ("Minimum Value:", &naira(MINIMUM_SUBSCRIPTION)),
            ("Maximum Value:", &naira(MAXIMUM_SUBSCRIPTION)),
        ))
        .push(wide_pair("Value of Bonds Applied for:", &terms.amount.display()))
        .push(Primitive::Columns(vec![
            Primitive::FixedWidth(FixedWidthField::exact(
                "Amount (Naira)",
                terms.amount.naira_digits(),
                NAIRA_CELLS,
            )),
            Primitive::FixedWidth(FixedWidthField::exact(
                "Kobo",
                terms.amount.kobo_digits(),
                KOBO_CELLS,
            )),
        ]))
        .push(wide_pair("Amount in Words:", &terms.amount_in_words))
        .build()
}

/// Section B, dispatched on the applicant variant.
pub fn applicant_identity(app: &BoundApplication) -> Section {
    match &app.applicant {
        Applicant::Individual(person) => individual_identity(person),
        Applicant::Joint { primary, secondary } => joint_identity(primary, secondary),
        Applicant::Corporate(company) => corporate_identity(company),
    }
}

fn person_rows(person: &BoundPerson) -> Vec<Primitive> {
    let mut rows = vec![
        two_pairs(("Title:", &person.title), ("Full Name:", &person.full_name)),
        two_pairs(
            ("Date of Birth:", &person.date_of_birth),
            ("Occupation:", &person.occupation),
        ),
        two_pairs(
            ("Passport No:", &person.passport_no),
            ("Next of Kin:", &person.next_of_kin),
        ),
        two_pairs(
            ("Mother's Maiden Name:", &person.mothers_maiden_name),
            ("Email:", &person.email),
        ),
        wide_pair("Address:", &person.address),
        Primitive::FixedWidth(FixedWidthField::new(
            "Phone Number",
            &person.phone_number,
            PHONE_CELLS,
        )),
    ];

    if person.cscs_number.is_some() || person.chn_number.is_some() {
        rows.push(Primitive::text("E-allotment Details", TextRole::Label));
    }
    if let Some(cscs) = &person.cscs_number {
        rows.push(Primitive::FixedWidth(FixedWidthField::new(
            "CSCS A/C No.",
            cscs,
            CSCS_CELLS,
        )));
    }
    if let Some(chn) = &person.chn_number {
        rows.push(Primitive::FixedWidth(FixedWidthField::new(
            "CHN No.", chn, CHN_CELLS,
        )));
    }
    rows
}

pub fn individual_identity(person: &BoundPerson) -> Section {
    Section::builder(SectionKind::ApplicantIdentity, "Individual Applicant Details")
        .push(Primitive::section_header(
            Some('B'),
            "1. Individual Applicant Details",
        ))
        .extend(person_rows(person))
        .build()
}

pub fn joint_identity(primary: &BoundPerson, secondary: &BoundPerson) -> Section {
    Section::builder(SectionKind::ApplicantIdentity, "Joint Applicant Details")
        .push(Primitive::section_header(
            Some('B'),
            "1. Primary Applicant Details",
        ))
        .extend(person_rows(primary))
        .push(Primitive::section_header(None, "2. Joint Applicant Details"))
        .extend(person_rows(secondary))
        .build()
}

pub fn corporate_identity(company: &BoundCompany) -> Section {
    Section::builder(SectionKind::ApplicantIdentity, "Corporate Applicant Details")
        .push(Primitive::section_header(
            Some('B'),
            "Corporate Applicant Details",
        ))
        .push(two_pairs(
            ("Company Name:", &company.company_name),
            ("R/C No:", &company.rc_number),
        ))
        .push(two_pairs(
            ("Type of Business:", &company.business_type),
            ("Passport No:", &company.passport_no),
        ))
        .push(two_pairs(
            ("Contact Person:", &company.contact_person),
            ("Email:", &company.email),
        ))
        .push(wide_pair("Address:", &company.address))
        .push(Primitive::FixedWidth(FixedWidthField::new(
            "Phone Number",
            &company.phone_number,
            PHONE_CELLS,
        )))
        .build()
}

fn bank_rows(bank: &BoundBank) -> Vec<Primitive> {
    vec![
        two_pairs(
            ("Bank Name:", &bank.bank_name),
            ("Bank Branch:", &bank.branch),
        ),
        wide_pair("Sort Code:", &bank.sort_code),
        Primitive::FixedWidth(FixedWidthField::new(
            "Account Number",
            &bank.account_number,
            ACCOUNT_NUMBER_CELLS,
        )),
        Primitive::FixedWidth(FixedWidthField::new("BVN", &bank.bvn, BVN_CELLS)),
    ]
}

/// Section C. Joint applications with a second account repeat the block for it.
pub fn bank_details(app: &BoundApplication) -> Section {
    let joint_bank = match app.applicant {
        Applicant::Joint { .. } => app.joint_bank.as_ref(),
        _ => None,
    };

    let mut builder = Section::builder(SectionKind::BankDetails, "Bank Details")
        .push(Primitive::section_header(Some('C'), "Bank Details"))
        .extend(bank_rows(&app.bank));
    if let Some(bank) = joint_bank {
        builder = builder
            .push(Primitive::section_header(None, "Joint Applicant Bank Details"))
            .extend(bank_rows(bank));
    }
    builder.build()
}

/// Residency and investor categories.
pub fn classification(app: &BoundApplication) -> Section {
    Section::builder(SectionKind::Classification, "Residency and Investor Category")
        .push(Primitive::section_header(
            None,
            "Residency and Investor Category",
        ))
        .push(Primitive::CheckboxGroup(
            CheckboxGroup::new(["Resident", "Non-Resident"], SelectionMode::Single)
                .with_label("Residency Classification of Applicant (tick the appropriate box):")
                .with_flags([app.resident, !app.resident]),
        ))
        .push(Primitive::CheckboxGroup(
            CheckboxGroup::new(INVESTOR_CATEGORIES, SelectionMode::Multi)
                .with_label("Investor Category (tick all that apply):")
                .with_columns(2)
                .with_selected(&app.investor_categories),
        ))
        .build()
}

/// Section D. Always present; missing agent details leave the cells blank.
pub fn distribution_agent(app: &BoundApplication) -> Section {
    Section::builder(SectionKind::DistributionAgent, "Distribution Agents")
        .push(Primitive::section_header(Some('D'), "Distribution Agents"))
        .push(wide_pair("Name of Distribution Agent:", &app.agent.name))
        .push(wide_pair("Stockbroker Code:", &app.agent.stockbroker_code))
        .build()
}

/// Witness attestation, built only for applications that need a witness.
pub fn witness(app: &BoundApplication) -> Option<Section> {
    let witness = app.witness.as_ref()?;
    Some(
        Section::builder(
            SectionKind::Witness,
            "Witness Section (for applicants who cannot sign)",
        )
        .push(Primitive::section_header(
            None,
            "Witness Section (for applicants who cannot sign)",
        ))
        .push(wide_pair("Witness Name:", &witness.name))
        .push(wide_pair("Witness Address:", &witness.address))
        .push(Primitive::Checkbox(CheckboxField::new(
            WITNESS_ACKNOWLEDGMENT,
            witness.acknowledged,
        )))
        .push(Primitive::signature_line("Witness Signature", true))
        .build(),
    )
}

/// Signature lines, the receiving agent's stamp and, when needed, the thumbprint box.
pub fn signatures(app: &BoundApplication) -> Section {
    let mut signing = vec![Primitive::signature_line("Usual Signature", true)];
    if let Applicant::Joint { .. } = app.applicant {
        signing.push(Primitive::signature_line(
            "Joint Applicant's Usual Signature",
            true,
        ));
    }

    let mut boxes = vec![Primitive::stamp_area("Stamp of Receiving Agent")];
    if app.illiterate_applicant {
        boxes.push(Primitive::thumbprint_area(
            "Thumb print of illiterate applicant",
        ));
    }

    Section::builder(SectionKind::Signatures, "Signatures")
        .push(Primitive::section_header(None, "Signatures"))
        .extend(signing)
        .push(Primitive::Columns(boxes))
        .build()
}

/// All sections after the header, in the order they are printed.
pub fn compose(app: &BoundApplication) -> Vec<Section> {
    let mut sections = vec![
        bond_terms(app),
        applicant_identity(app),
        bank_details(app),
        classification(app),
        distribution_agent(app),
    ];
    sections.extend(witness(app));
    sections.push(signatures(app));
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{BankDetails, WitnessDetails};
    use crate::binding::{bind, tests as fixtures};
    use crate::model::PlaceholderKind;

    fn kinds(sections: &[Section]) -> Vec<SectionKind> {
        sections.iter().map(Section::kind).collect()
    }

    #[test]
    fn individual_scenario() {
        let app = bind(&fixtures::individual()).expect("consistent");
        let sections = compose(&app);

        assert!(!kinds(&sections).contains(&SectionKind::Witness));

        let tenor = sections[0]
            .checkbox_group("Tenor of Bond:")
            .expect("tenor selector");
        assert_eq!(tenor.checked_labels(), ["2-Year"]);

        let account = sections[2]
            .fixed_width_field("Account Number")
            .expect("account field");
        assert_eq!(account.cell_count(), 10);
        assert_eq!(account.rendered_value(), "0123456789");
        assert_eq!(account.overflow(), 0);
    }

    #[test]
    fn sections_follow_the_form_order() {
        let mut data = fixtures::individual();
        data.needs_witness = true;
        data.witness = Some(WitnessDetails {
            name: "Musa Bello".into(),
            address: Some("Kano".into()),
            acknowledged: true,
        });
        let sections = compose(&bind(&data).expect("consistent"));
        assert_eq!(
            kinds(&sections),
            [
                SectionKind::BondTerms,
                SectionKind::ApplicantIdentity,
                SectionKind::BankDetails,
                SectionKind::Classification,
                SectionKind::DistributionAgent,
                SectionKind::Witness,
                SectionKind::Signatures,
            ]
        );
        assert!(sections[5].contains_text(WITNESS_ACKNOWLEDGMENT));
    }

    #[test]
    fn identity_branches_on_applicant_type() {
        let individual = applicant_identity(&bind(&fixtures::individual()).expect("consistent"));
        assert!(individual.contains_text("1. Individual Applicant Details"));
        assert!(!individual.contains_text("2. Joint Applicant Details"));

        let joint = applicant_identity(&bind(&fixtures::joint()).expect("consistent"));
        assert!(joint.contains_text("1. Primary Applicant Details"));
        assert!(joint.contains_text("2. Joint Applicant Details"));
        assert!(joint.contains_text("Chidi Obi"));

        let corporate = applicant_identity(&bind(&fixtures::corporate()).expect("consistent"));
        assert!(corporate.contains_text("R/C No:"));
        assert!(corporate.contains_text("RC123456"));
        assert!(!corporate.contains_text("Mother's Maiden Name:"));
        for label in ["Full Name:", "Date of Birth:", "Next of Kin:"] {
            assert!(!corporate.contains_text(label), "corporate shows {label}");
        }

        for section in [&individual, &joint] {
            assert!(section.contains_text("Full Name:"));
            for label in ["R/C No:", "Company Name:"] {
                assert!(!section.contains_text(label), "{} shows {label}", section.title());
            }
        }
    }

    #[test]
    fn phone_and_brokerage_fields_have_fixed_cell_counts() {
        let mut data = fixtures::individual();
        if let Some(person) = data.primary_applicant.as_mut() {
            person.cscs_number = Some("12345678".into());
        }
        let section = applicant_identity(&bind(&data).expect("consistent"));
        let phone = section.fixed_width_field("Phone Number").expect("phone");
        assert_eq!(phone.cell_count(), PHONE_CELLS);
        assert_eq!(phone.rendered_value(), "+2348031234567");
        assert_eq!(
            section.fixed_width_field("CSCS A/C No.").map(|f| f.cell_count()),
            Some(CSCS_CELLS)
        );
        assert!(section.fixed_width_field("CHN No.").is_none());
    }

    #[test]
    fn joint_bank_is_rendered_twice_only_for_joint() {
        let mut data = fixtures::joint();
        data.joint_bank = Some(BankDetails {
            bank_name: "Access Bank".into(),
            account_number: "9876543210".into(),
            ..BankDetails::default()
        });
        let section = bank_details(&bind(&data).expect("consistent"));
        let accounts = section
            .all_primitives()
            .into_iter()
            .filter(|p| matches!(p, Primitive::FixedWidth(f) if f.label() == "Account Number"))
            .count();
        assert_eq!(accounts, 2);

        let single = bank_details(&bind(&fixtures::joint()).expect("consistent"));
        assert!(!single.contains_text("Joint Applicant Bank Details"));
    }

    #[test]
    fn bond_terms_show_amount_cells_and_words() {
        let mut data = fixtures::individual();
        data.terms.amount = Decimal::new(5_000_025, 2);
        data.terms.tenor = Tenor::ThreeYear;
        let section = bond_terms(&bind(&data).expect("consistent"));

        let naira = section.fixed_width_field("Amount (Naira)").expect("naira");
        assert_eq!(naira.cell_count(), NAIRA_CELLS);
        assert_eq!(naira.rendered_value(), "50000");
        let kobo = section.fixed_width_field("Kobo").expect("kobo");
        assert_eq!(kobo.rendered_value(), "25");
        assert!(section.contains_text("Fifty Thousand Naira and Twenty Five Kobo"));
        assert!(section.contains_text("N5,000.00"));

        let month = section.checkbox_group("Month of Offer:").expect("months");
        assert_eq!(month.options().len(), 12);
        assert_eq!(month.checked_labels(), ["March"]);
        assert_eq!(
            section
                .checkbox_group("Tenor of Bond:")
                .map(|g| g.checked_labels()),
            Some(vec!["3-Year"])
        );
    }

    #[test]
    fn classification_marks_residency_and_categories() {
        let mut data = fixtures::individual();
        data.classification.resident = false;
        data.classification.investor_categories = vec!["Individual".into(), "Others".into()];
        let section = classification(&bind(&data).expect("consistent"));

        let residency = section
            .checkbox_group("Residency Classification of Applicant (tick the appropriate box):")
            .expect("residency");
        assert_eq!(residency.checked_labels(), ["Non-Resident"]);

        let categories = section
            .checkbox_group("Investor Category (tick all that apply):")
            .expect("categories");
        assert_eq!(categories.columns(), Some(2));
        assert_eq!(categories.checked_labels(), ["Individual", "Others"]);
    }

    #[test]
    fn signatures_vary_with_applicant() {
        let placeholders = |section: &Section| -> Vec<PlaceholderKind> {
            section
                .all_primitives()
                .into_iter()
                .filter_map(|p| match p {
                    Primitive::Placeholder { kind, .. } => Some(*kind),
                    _ => None,
                })
                .collect()
        };

        let plain = signatures(&bind(&fixtures::individual()).expect("consistent"));
        assert_eq!(placeholders(&plain), [PlaceholderKind::Stamp]);

        let mut illiterate = fixtures::individual();
        illiterate.illiterate_applicant = true;
        let with_thumb = signatures(&bind(&illiterate).expect("consistent"));
        assert_eq!(
            placeholders(&with_thumb),
            [PlaceholderKind::Stamp, PlaceholderKind::Thumbprint]
        );

        let joint = signatures(&bind(&fixtures::joint()).expect("consistent"));
        assert!(joint.contains_text("Joint Applicant's Usual Signature"));
        assert!(!plain.contains_text("Joint Applicant's Usual Signature"));
    }

    #[test]
    fn agent_section_is_always_present() {
        let mut data = fixtures::individual();
        data.distribution_agent = None;
        let sections = compose(&bind(&data).expect("consistent"));
        let agent = sections
            .iter()
            .find(|s| s.kind() == SectionKind::DistributionAgent)
            .expect("agent section");
        assert!(agent.contains_text("Stockbroker Code:"));
    }
}
