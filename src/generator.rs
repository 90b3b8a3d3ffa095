//! Public entry point: application record in, PDF bytes out.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use genpdf::{PaperSize, Size};

use crate::application::ApplicationData;
use crate::binding::bind;
use crate::elements::{decode_logo, LogoImage};
use crate::error::FormError;
use crate::fonts;
use crate::page::PageMargins;
use crate::style::StyleRegistry;
use crate::template::{Composition, GeneratedForm, PageSettings, TemplateAssembler};

/// Title stored in the PDF metadata unless overridden.
pub const DEFAULT_DOCUMENT_TITLE: &str = "FGN Savings Bond Subscription Form";

/// Source of the "Generated on" timestamp printed in the footer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampSource {
    /// Local time at the start of each generation call.
    #[default]
    Now,
    /// A fixed instant, for reproducible output.
    Fixed(NaiveDateTime),
}

impl TimestampSource {
    fn resolve(self) -> NaiveDateTime {
        match self {
            TimestampSource::Now => Local::now().naive_local(),
            TimestampSource::Fixed(timestamp) => timestamp,
        }
    }
}

/// Renders subscription forms.
///
/// The generator holds configuration only. Each call builds its own document, so one generator
/// can be shared between threads.
#[derive(Clone, Debug)]
pub struct FormGenerator {
    paper_size: Size,
    margins: PageMargins,
    title: String,
    timestamp: TimestampSource,
    logo: Option<Arc<[u8]>>,
    #[cfg(feature = "bookmarks")]
    bookmarks: bool,
}

impl Default for FormGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormGenerator {
    /// A4 with the official margins, current time in the footer, text logo.
    pub fn new() -> Self {
        let margin = StyleRegistry::global().dimensions().page_margin;
        Self {
            paper_size: PaperSize::A4.into(),
            margins: PageMargins::all(margin),
            title: DEFAULT_DOCUMENT_TITLE.to_owned(),
            timestamp: TimestampSource::Now,
            logo: None,
            #[cfg(feature = "bookmarks")]
            bookmarks: false,
        }
    }

    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    /// Page margins in millimetres.
    pub fn with_margins(mut self, margins: impl Into<PageMargins>) -> Self {
        self.margins = margins.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: TimestampSource) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Uses the given image (PNG or JPEG bytes) as the header logo.
    pub fn with_logo_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        self.logo = Some(Arc::from(bytes));
        self
    }

    /// Adds a PDF outline entry for every emitted section.
    #[cfg(feature = "bookmarks")]
    pub fn with_bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }

    /// Binds `data` and composes its sections without laying anything out.
    pub fn compose(&self, data: &ApplicationData) -> Result<Composition, FormError> {
        let bound = bind(data)?;
        Ok(TemplateAssembler::new(bound).emit_header().emit_sections())
    }

    /// Renders the form and returns the PDF bytes.
    pub fn generate(&self, data: &ApplicationData) -> Result<Vec<u8>, FormError> {
        self.generate_form(data).map(|form| form.bytes)
    }

    /// Renders the form and returns the bytes with page and section metadata.
    pub fn generate_form(&self, data: &ApplicationData) -> Result<GeneratedForm, FormError> {
        log::info!(
            "generating subscription form for {} applicant",
            data.applicant_type
        );

        let composition = self.compose(data)?;
        composition.ensure_renderable()?;
        let logo = self.decode_logo()?;
        let fonts = fonts::font_family()?;
        let settings = PageSettings {
            paper_size: self.paper_size,
            margins: self.margins,
            title: self.title.clone(),
            timestamp: self.timestamp.resolve(),
        };

        let form = composition
            .paginate(fonts, &settings, logo.as_ref())?
            .finalize()?;
        let form = self.apply_bookmarks(form)?;

        log::info!(
            "generated subscription form: {} pages, {} sections, {} bytes",
            form.page_count,
            form.sections.len(),
            form.bytes.len()
        );
        Ok(form)
    }

    fn decode_logo(&self) -> Result<Option<LogoImage>, FormError> {
        self.logo
            .as_deref()
            .map(decode_logo)
            .transpose()
            .map_err(FormError::from)
    }

    #[cfg(feature = "bookmarks")]
    fn apply_bookmarks(&self, mut form: GeneratedForm) -> Result<GeneratedForm, FormError> {
        if self.bookmarks {
            form.bytes = crate::bookmarks::apply_section_bookmarks(&form.bytes, &form.sections)
                .map_err(|err| FormError::render(err.to_string()))?;
            log::debug!("added {} section bookmarks", form.sections.len());
        }
        Ok(form)
    }

    #[cfg(not(feature = "bookmarks"))]
    fn apply_bookmarks(&self, form: GeneratedForm) -> Result<GeneratedForm, FormError> {
        Ok(form)
    }
}
