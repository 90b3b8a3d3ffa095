//! Page decoration: margins, the every-page footer and page counting.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::error::{Error, ErrorKind};
use genpdf::{render, style, Alignment, Context, Element, Margins, Mm, PageDecorator, Position};
use genpdf::{RenderResult, Size};

use crate::elements::{horizontal_rule, print_lines};
use crate::style::{mm, mm_value, LineRole, StyleRegistry, TextRole};

type FooterFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Page margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl PageMargins {
    pub fn all(margin: f64) -> Self {
        Self::trbl(margin, margin, margin, margin)
    }

    pub fn trbl(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Total vertical margin.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    fn to_margins(self) -> Margins {
        Margins::trbl(mm(self.top), mm(self.right), mm(self.bottom), mm(self.left))
    }
}

impl From<f64> for PageMargins {
    fn from(margin: f64) -> Self {
        Self::all(margin)
    }
}

/// A footer of fixed height drawn at the bottom of every page.
pub struct FooterSpec {
    height: Mm,
    factory: Box<FooterFactory>,
}

impl FooterSpec {
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

/// Applies margins, draws the footer and publishes the number of the page being laid out.
pub struct FormPageDecorator {
    pages: Rc<Cell<usize>>,
    margins: PageMargins,
    footer: FooterSpec,
}

impl FormPageDecorator {
    pub fn new(margins: PageMargins, footer: FooterSpec, pages: Rc<Cell<usize>>) -> Self {
        Self {
            pages,
            margins,
            footer,
        }
    }
}

impl PageDecorator for FormPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: render::Area<'a>,
        style: style::Style,
    ) -> Result<render::Area<'a>, Error> {
        let page = self.pages.get() + 1;
        self.pages.set(page);

        area.add_margins(self.margins.to_margins());

        let available = area.size().height;
        if self.footer.height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - self.footer.height));
        footer_area.set_height(self.footer.height);
        let mut element = (self.footer.factory)(page);
        let result = element.render(context, footer_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Footer element does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - self.footer.height);
        Ok(area)
    }
}

/// Generation timestamp on the left, page number on the right, under a thin rule.
pub struct FooterLine {
    generated: String,
    page: usize,
}

impl FooterLine {
    pub fn new(generated: impl Into<String>, page: usize) -> Self {
        Self {
            generated: generated.into(),
            page,
        }
    }
}

impl Element for FooterLine {
    fn render(
        &mut self,
        context: &Context,
        area: render::Area<'_>,
        _style: style::Style,
    ) -> Result<RenderResult, Error> {
        let registry = StyleRegistry::global();
        let text = registry.text(TextRole::Footer);
        let width = mm_value(area.size().width);
        let top = registry.dimensions().cell_padding;

        horizontal_rule(&area, 0.0, top / 2.0, width, registry.line(LineRole::Rule));
        print_lines(
            context,
            &area,
            0.0,
            top,
            width,
            text,
            Alignment::Left,
            &[format!("Generated on: {}", self.generated)],
        )?;
        print_lines(
            context,
            &area,
            0.0,
            top,
            width,
            text,
            Alignment::Right,
            &[format!("Page {}", self.page)],
        )?;

        let height = top + mm_value(text.line_height(&context.font_cache));
        let mut result = RenderResult::default();
        result.size = Size::new(area.size().width, mm(height));
        Ok(result)
    }
}
