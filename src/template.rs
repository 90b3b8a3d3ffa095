//! Assembly of the complete form.
//!
//! The assembler moves through a fixed sequence of states, each its own type:
//!
//! ```text
//! TemplateAssembler -> HeaderEmitted -> Composition -> PaginatedForm -> GeneratedForm
//! ```
//!
//! Sections are built before any layout happens. [`Composition`] is therefore a plain value
//! that can be inspected (the CLI's `inspect` command does) without fonts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::NaiveDateTime;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::Size;

use crate::application::ApplicantType;
use crate::binding::BoundApplication;
use crate::elements::{element_for, Flowable, FormElement, KeepTogether, LogoImage, RenderAssets};
use crate::error::FormError;
use crate::metadata::normalize_metadata;
use crate::model::{HorizontalAlignment, Primitive, Section, SectionKind, TextRole};
use crate::page::{FooterLine, FooterSpec, FormPageDecorator, PageMargins};
use crate::sections;
use crate::style::{mm, mm_value, StyleRegistry};

pub const FORM_TITLE: &str =
    "SUBSCRIPTION FORM FOR FEDERAL GOVERNMENT OF NIGERIA SAVINGS BOND (FGNSB)";
pub const LOGO_FALLBACK: &str = "DEBT MANAGEMENT OFFICE NIGERIA";

const ADDRESSEE: &str = "To: Director-General,\nDebt Management Office, Abuja";
const OFFICIAL_USE: &str = "No: ____________\nOfficial use only";
const INSTRUCTIONS: &str = "Applications must be made in accordance with the instructions set out on \
the back of this application form. Care must be taken to follow these instructions as applications \
that do not comply with the instructions may be rejected. If you are in any doubt, please consult \
your Stockbroker, Banker, Solicitor, or any professional adviser for guidance.";
const DECLARATION: &str = "In response to the advertisement in both print and electronic media, \
I/We hereby offer my/our subscription for FGNSB";

/// Current state of an assembly, for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblyStage {
    Init,
    HeaderEmitted,
    SectionsEmitted,
    Paginated,
    Finalized,
}

fn enter(stage: AssemblyStage, applicant_type: ApplicantType) {
    log::debug!("form assembly for {applicant_type} applicant entered {stage:?}");
}

/// Page geometry and footer content of one render.
#[derive(Clone, Debug)]
pub struct PageSettings {
    pub paper_size: Size,
    pub margins: PageMargins,
    pub title: String,
    pub timestamp: NaiveDateTime,
}

/// The header of the form: addressee, logo, official-use box, title, instructions, declaration.
pub fn header_section() -> Section {
    Section::builder(SectionKind::Header, "Subscription Form")
        .push(Primitive::Columns(vec![
            Primitive::text(ADDRESSEE, TextRole::Small),
            Primitive::Logo {
                fallback: LOGO_FALLBACK.to_owned(),
            },
            Primitive::aligned_text(OFFICIAL_USE, TextRole::Small, HorizontalAlignment::Right),
        ]))
        .push(Primitive::aligned_text(
            FORM_TITLE,
            TextRole::Title,
            HorizontalAlignment::Center,
        ))
        .push(Primitive::aligned_text(
            INSTRUCTIONS,
            TextRole::Instruction,
            HorizontalAlignment::Center,
        ))
        .push(Primitive::aligned_text(
            DECLARATION,
            TextRole::Declaration,
            HorizontalAlignment::Center,
        ))
        .build()
}

/// Initial state: a bound application and nothing emitted yet.
pub struct TemplateAssembler {
    application: BoundApplication,
}

impl TemplateAssembler {
    pub fn new(application: BoundApplication) -> Self {
        enter(AssemblyStage::Init, application.applicant_type());
        Self { application }
    }

    /// Emits the header. The header does not depend on the application.
    pub fn emit_header(self) -> HeaderEmitted {
        enter(
            AssemblyStage::HeaderEmitted,
            self.application.applicant_type(),
        );
        HeaderEmitted {
            application: self.application,
            header: header_section(),
        }
    }
}

pub struct HeaderEmitted {
    application: BoundApplication,
    header: Section,
}

impl HeaderEmitted {
    pub fn header(&self) -> &Section {
        &self.header
    }

    /// Runs the section builders in form order.
    pub fn emit_sections(self) -> Composition {
        let applicant_type = self.application.applicant_type();
        let sections = sections::compose(&self.application);
        enter(AssemblyStage::SectionsEmitted, applicant_type);
        log::debug!(
            "emitted sections: {:?}",
            sections.iter().map(Section::kind).collect::<Vec<_>>()
        );
        Composition {
            applicant_type,
            header: self.header,
            sections,
        }
    }
}

/// Header plus every emitted section, ready for layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    applicant_type: ApplicantType,
    header: Section,
    sections: Vec<Section>,
}

impl Composition {
    pub fn applicant_type(&self) -> ApplicantType {
        self.applicant_type
    }

    pub fn header(&self) -> &Section {
        &self.header
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Kinds of the emitted sections, header excluded.
    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(Section::kind).collect()
    }

    /// Fails when any primitive holds content that cannot be drawn.
    pub fn ensure_renderable(&self) -> Result<(), FormError> {
        std::iter::once(&self.header)
            .chain(&self.sections)
            .try_for_each(Section::ensure_renderable)
    }

    /// Lays the composition out on pages.
    ///
    /// Each primitive is an unbreakable unit and section headers travel with the primitive
    /// that follows them. Nothing is drawn yet; drawing happens in [`PaginatedForm::finalize`].
    pub fn paginate(
        self,
        fonts: FontFamily<FontData>,
        settings: &PageSettings,
        logo: Option<&LogoImage>,
    ) -> Result<PaginatedForm, FormError> {
        self.ensure_renderable()?;

        let registry = StyleRegistry::global();
        let footer_height = registry.dimensions().footer_height;
        let body_height = mm_value(settings.paper_size.height)
            - settings.margins.vertical()
            - footer_height;
        if body_height <= 0.0 {
            return Err(FormError::render("margins leave no room for content"));
        }

        let pages = Rc::new(Cell::new(0));
        let generated = settings.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let footer = FooterSpec::new(mm(footer_height), move |page| {
            FooterLine::new(generated.clone(), page)
        });

        let mut document = genpdf::Document::new(fonts);
        document.set_title(settings.title.clone());
        document.set_paper_size(settings.paper_size);
        document.set_page_decorator(FormPageDecorator::new(
            settings.margins,
            footer,
            Rc::clone(&pages),
        ));

        let assets = RenderAssets { logo };
        for unit in layout_units(&self.header, assets) {
            document.push(Flowable::new(self.header.title(), unit, body_height));
        }

        let first_pages = Rc::new(RefCell::new(vec![None; self.sections.len()]));
        for (index, section) in self.sections.iter().enumerate() {
            for (position, unit) in layout_units(section, assets).into_iter().enumerate() {
                let mut flowable = Flowable::new(section.title(), unit, body_height);
                if position == 0 {
                    let pages = Rc::clone(&pages);
                    let first_pages = Rc::clone(&first_pages);
                    flowable = flowable.with_placement_hook(move || {
                        if let Some(slot) = first_pages.borrow_mut().get_mut(index) {
                            slot.get_or_insert(pages.get());
                        }
                    });
                }
                document.push(flowable);
            }
        }

        enter(AssemblyStage::Paginated, self.applicant_type);
        Ok(PaginatedForm {
            applicant_type: self.applicant_type,
            document,
            timestamp: settings.timestamp,
            pages,
            first_pages,
            sections: self
                .sections
                .into_iter()
                .map(|section| (section.kind(), section.title().to_owned()))
                .collect(),
        })
    }
}

/// Splits a section into layout units, binding every section header to its successor.
fn layout_units(section: &Section, assets: RenderAssets<'_>) -> Vec<Box<dyn FormElement>> {
    let mut units: Vec<Box<dyn FormElement>> = Vec::new();
    let mut primitives = section.primitives().iter().peekable();
    while let Some(primitive) = primitives.next() {
        let element = element_for(primitive, assets);
        match (primitive, primitives.peek()) {
            (Primitive::SectionHeader { .. }, Some(next)) => {
                let follower = element_for(next, assets);
                primitives.next();
                units.push(Box::new(KeepTogether::new(vec![element, follower])));
            }
            _ => units.push(element),
        }
    }
    units
}

/// A laid-out document waiting to be rendered.
pub struct PaginatedForm {
    applicant_type: ApplicantType,
    document: genpdf::Document,
    timestamp: NaiveDateTime,
    pages: Rc<Cell<usize>>,
    first_pages: Rc<RefCell<Vec<Option<usize>>>>,
    sections: Vec<(SectionKind, String)>,
}

impl PaginatedForm {
    /// Renders the PDF. The document is consumed; on error no bytes are returned.
    ///
    /// Document dates are set to the generation timestamp and the document identifier is
    /// derived from the content, so equal input renders to equal bytes.
    pub fn finalize(self) -> Result<GeneratedForm, FormError> {
        let mut rendered = Vec::new();
        self.document.render(&mut rendered)?;
        let bytes = normalize_metadata(&rendered, self.timestamp)?;
        enter(AssemblyStage::Finalized, self.applicant_type);

        let first_pages = self.first_pages.borrow();
        let sections = self
            .sections
            .into_iter()
            .zip(first_pages.iter())
            .map(|((kind, title), page)| SectionPlacement {
                kind,
                title,
                first_page: page.unwrap_or(1),
            })
            .collect();

        Ok(GeneratedForm {
            bytes,
            page_count: self.pages.get(),
            sections,
        })
    }
}

/// Where a section starts in the rendered document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionPlacement {
    pub kind: SectionKind,
    pub title: String,
    /// One-based page number.
    pub first_page: usize,
}

/// A rendered form.
#[derive(Clone, Debug)]
pub struct GeneratedForm {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub sections: Vec<SectionPlacement>,
}
