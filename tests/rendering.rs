use std::path::PathBuf;
use std::thread;

use chrono::NaiveDate;
use fgnsb_form::model::SectionKind;
use fgnsb_form::{fonts, ApplicationData, FormError, FormGenerator, GeneratedForm, TimestampSource};

fn demo(name: &str) -> ApplicationData {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(format!("{name}.json"));
    let json = std::fs::read_to_string(&path).expect("read demo record");
    serde_json::from_str(&json).expect("parse demo record")
}

fn fixed_generator() -> FormGenerator {
    let instant = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .expect("valid instant");
    FormGenerator::new().with_timestamp(TimestampSource::Fixed(instant))
}

fn render(data: &ApplicationData, test: &str) -> Option<GeneratedForm> {
    if !fonts::fonts_available() {
        eprintln!(
            "Skipping {test}: form fonts missing. Set FGNSB_FONTS_DIR or copy assets/fonts next to the binary."
        );
        return None;
    }
    Some(fixed_generator().generate_form(data).expect("render form"))
}

fn section_kinds(form: &GeneratedForm) -> Vec<SectionKind> {
    form.sections.iter().map(|section| section.kind).collect()
}

#[test]
fn individual_form_renders_every_section_but_the_witness() {
    let Some(form) = render(&demo("individual"), "individual_form") else {
        return;
    };
    assert!(form.bytes.starts_with(b"%PDF"));
    assert!(form.page_count >= 1);
    assert_eq!(
        section_kinds(&form),
        [
            SectionKind::BondTerms,
            SectionKind::ApplicantIdentity,
            SectionKind::BankDetails,
            SectionKind::Classification,
            SectionKind::DistributionAgent,
            SectionKind::Signatures,
        ]
    );
    assert!(form
        .sections
        .iter()
        .all(|section| (1..=form.page_count).contains(&section.first_page)));
}

#[test]
fn joint_form_with_witness_places_sections_in_page_order() {
    let Some(form) = render(&demo("joint"), "joint_form") else {
        return;
    };
    assert!(section_kinds(&form).contains(&SectionKind::Witness));
    let pages: Vec<_> = form.sections.iter().map(|section| section.first_page).collect();
    assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(pages.last().is_some_and(|&last| last <= form.page_count));
}

#[test]
fn corporate_form_renders() {
    let Some(form) = render(&demo("corporate"), "corporate_form") else {
        return;
    };
    assert!(!form.bytes.is_empty());
    assert!(!section_kinds(&form).contains(&SectionKind::Witness));
}

#[test]
fn identical_input_renders_identical_bytes() {
    let data = demo("joint");
    let Some(first) = render(&data, "identical_input_renders_identical_bytes") else {
        return;
    };
    let Some(second) = render(&data, "identical_input_renders_identical_bytes") else {
        return;
    };

    assert_eq!(first.bytes.len(), second.bytes.len(), "PDF sizes should match");
    assert!(first.bytes == second.bytes, "PDF renders must be byte-identical");
}

#[test]
fn metadata_dates_follow_the_fixed_timestamp() {
    let Some(form) = render(&demo("individual"), "metadata_dates_follow_the_fixed_timestamp") else {
        return;
    };
    let text = String::from_utf8_lossy(&form.bytes);
    assert!(text.contains("/CreationDate(D:20240301093000)"));
    assert!(text.contains("/ModDate(D:20240301093000)"));
    assert!(text.contains("<xmp:CreateDate>2024-03-01T09:30:00</xmp:CreateDate>"));
}

#[test]
fn different_records_get_different_document_ids() {
    let Some(individual) = render(&demo("individual"), "different_records_get_different_document_ids")
    else {
        return;
    };
    let Some(corporate) = render(&demo("corporate"), "different_records_get_different_document_ids")
    else {
        return;
    };
    let id = |bytes: &[u8]| {
        let text = String::from_utf8_lossy(bytes);
        text.rfind("/ID[")
            .map(|start| text[start..].chars().take(72).collect::<String>())
            .expect("trailer id")
    };
    assert_ne!(id(&individual.bytes), id(&corporate.bytes));
}

#[test]
fn concurrent_generation_matches_sequential_output() {
    if !fonts::fonts_available() {
        eprintln!("Skipping concurrent_generation: form fonts missing.");
        return;
    }
    let generator = fixed_generator();
    let records: Vec<_> = ["individual", "joint", "corporate"]
        .into_iter()
        .map(demo)
        .collect();

    let sequential: Vec<_> = records
        .iter()
        .map(|data| generator.generate(data).expect("render form"))
        .collect();

    let concurrent: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = records
            .iter()
            .map(|data| scope.spawn(|| generator.generate(data)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect("render form"))
            .collect()
    });

    assert!(sequential == concurrent);
}

#[test]
fn inconsistent_record_is_rejected_without_output() {
    let mut data = demo("individual");
    data.needs_witness = true;
    let err = FormGenerator::new().generate(&data).unwrap_err();
    assert!(matches!(err, FormError::DataInconsistency(_)));
}

#[test]
fn unsupported_fixed_width_character_is_a_render_error() {
    let mut data = demo("individual");
    data.bank.account_number = "01234\u{20A6}6789".into();
    let err = FormGenerator::new().generate(&data).unwrap_err();
    match err {
        FormError::Render(message) => assert!(message.contains("Account Number")),
        other => panic!("expected a render error, got {other:?}"),
    }
}
