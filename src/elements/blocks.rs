//! Section bands, text, signature rules, placeholders, columns and the logo.

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Alignment, Context, Element, Scale};

use super::{
    fill_rect, horizontal_rule, line_height, print_lines, stroke_rect, sub_area, wrap_text,
    FormElement,
};
use crate::model::{PlaceholderKind, TextBlock};
use crate::style::{mm_value, LineRole, StyleRegistry, TextRole};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
/// Extra room below the logo so rounding never pushes the image past its area.
const LOGO_SLACK: f64 = 0.5;

/// A decoded logo and its natural size in millimetres at 300 dpi.
#[derive(Clone)]
pub struct LogoImage {
    image: image::DynamicImage,
    natural_width: f64,
    natural_height: f64,
}

impl std::fmt::Debug for LogoImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoImage")
            .field("natural_width", &self.natural_width)
            .field("natural_height", &self.natural_height)
            .finish()
    }
}

/// Decodes logo bytes (PNG, JPEG, ...) with the `image` crate.
pub fn decode_logo(bytes: impl AsRef<[u8]>) -> Result<LogoImage, Error> {
    let image = image::load_from_memory(bytes.as_ref()).context("Failed to decode logo image")?;
    let (px_width, px_height) = image.dimensions();
    Ok(LogoImage {
        image,
        natural_width: MM_PER_INCH * f64::from(px_width) / DEFAULT_IMAGE_DPI,
        natural_height: MM_PER_INCH * f64::from(px_height) / DEFAULT_IMAGE_DPI,
    })
}

/// Coloured band opening a section: dark letter cell, light title band.
pub struct SectionHeaderElement {
    letter: Option<char>,
    label: String,
}

impl SectionHeaderElement {
    pub fn new(letter: Option<char>, label: &str) -> Self {
        Self {
            letter,
            label: label.to_owned(),
        }
    }
}

impl FormElement for SectionHeaderElement {
    fn height(&self, context: &Context, _width: f64) -> f64 {
        let registry = StyleRegistry::global();
        let d = registry.dimensions();
        let text = line_height(context, registry.text(TextRole::SectionHeader));
        d.section_header_height.max(text + 2.0 * d.cell_padding)
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let d = registry.dimensions();
        let palette = registry.palette();
        let width = mm_value(area.size().width);
        let height = self.height(context, width);

        let letter_width = if self.letter.is_some() {
            d.section_letter_width
        } else {
            0.0
        };
        fill_rect(&area, letter_width, 0.0, width - letter_width, height, palette.dmo_green_light);

        if let Some(letter) = self.letter {
            fill_rect(&area, 0.0, 0.0, letter_width, height, palette.dmo_green);
            let style = registry.text(TextRole::HeaderLetter);
            print_lines(
                context,
                &area,
                0.0,
                (height - line_height(context, style)) / 2.0,
                letter_width,
                style,
                Alignment::Center,
                &[letter.to_string()],
            )?;
        }

        stroke_rect(&area, 0.0, 0.0, width, height, registry.line(LineRole::Border));

        let style = registry.text(TextRole::SectionHeader);
        print_lines(
            context,
            &area,
            letter_width + 2.0 * d.cell_padding,
            (height - line_height(context, style)) / 2.0,
            width - letter_width - 4.0 * d.cell_padding,
            style,
            Alignment::Left,
            &[self.label.clone()],
        )
    }
}

/// Wrapped paragraph in a text role.
pub struct TextElement {
    block: TextBlock,
}

impl TextElement {
    pub fn new(block: &TextBlock) -> Self {
        Self {
            block: block.clone(),
        }
    }

    fn style(&self) -> Style {
        StyleRegistry::global().text(self.block.role)
    }
}

impl FormElement for TextElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let lines = wrap_text(context, self.style(), &self.block.text, width);
        lines.len() as f64 * line_height(context, self.style())
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let width = mm_value(area.size().width);
        let lines = wrap_text(context, self.style(), &self.block.text, width);
        print_lines(
            context,
            &area,
            0.0,
            0.0,
            width,
            self.style(),
            self.block.alignment.into(),
            &lines,
        )
    }
}

/// Blank signing space above a rule, captioned underneath, with an optional date rule.
pub struct SignatureElement {
    label: String,
    include_date: bool,
}

impl SignatureElement {
    pub fn new(label: &str, include_date: bool) -> Self {
        Self {
            label: label.to_owned(),
            include_date,
        }
    }

    /// Lengths of the signature rule and the date rule.
    fn rules(&self, width: f64) -> (f64, f64) {
        let d = StyleRegistry::global().dimensions();
        if self.include_date {
            let date = d.signature_date_length.min(width * 0.3);
            let signature = d.signature_line_length.min(width - date - d.column_gap);
            (signature.max(0.0), date)
        } else {
            (d.signature_line_length.min(width), 0.0)
        }
    }
}

impl FormElement for SignatureElement {
    fn height(&self, context: &Context, _width: f64) -> f64 {
        let registry = StyleRegistry::global();
        let caption = line_height(context, registry.text(TextRole::Small));
        registry.dimensions().signature_height.max(caption * 3.0)
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let d = registry.dimensions();
        let width = mm_value(area.size().width);
        let style = registry.text(TextRole::Small);
        let caption = line_height(context, style);
        let rule_y = self.height(context, width) - caption - d.cell_padding;
        let (signature, date) = self.rules(width);

        horizontal_rule(&area, 0.0, rule_y, signature, registry.line(LineRole::Rule));
        print_lines(
            context,
            &area,
            0.0,
            rule_y + d.cell_padding / 2.0,
            signature,
            style,
            Alignment::Left,
            &[self.label.clone()],
        )?;

        if self.include_date {
            let x = signature + d.column_gap;
            horizontal_rule(&area, x, rule_y, date, registry.line(LineRole::Rule));
            print_lines(
                context,
                &area,
                x,
                rule_y + d.cell_padding / 2.0,
                date,
                style,
                Alignment::Left,
                &["Date".to_owned()],
            )?;
        }
        Ok(())
    }
}

/// Bordered box of fixed size with a caption underneath.
pub struct PlaceholderElement {
    kind: PlaceholderKind,
    label: String,
}

impl PlaceholderElement {
    pub fn new(kind: PlaceholderKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_owned(),
        }
    }

    fn box_size(&self, width: f64) -> (f64, f64) {
        let d = StyleRegistry::global().dimensions();
        let (w, h) = match self.kind {
            PlaceholderKind::Stamp => (d.stamp_width, d.stamp_height),
            PlaceholderKind::Thumbprint => (d.thumbprint_width, d.thumbprint_height),
        };
        (w.min(width), h)
    }

    fn caption(&self, context: &Context, width: f64) -> Vec<String> {
        let (box_width, _) = self.box_size(width);
        wrap_text(
            context,
            StyleRegistry::global().text(TextRole::Small),
            &self.label,
            box_width,
        )
    }
}

impl FormElement for PlaceholderElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let registry = StyleRegistry::global();
        let (_, box_height) = self.box_size(width);
        let caption = self.caption(context, width).len() as f64
            * line_height(context, registry.text(TextRole::Small));
        box_height + registry.dimensions().checkbox_gap + caption
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let width = mm_value(area.size().width);
        let (box_width, box_height) = self.box_size(width);
        stroke_rect(&area, 0.0, 0.0, box_width, box_height, registry.line(LineRole::Border));
        let lines = self.caption(context, width);
        print_lines(
            context,
            &area,
            0.0,
            box_height + registry.dimensions().checkbox_gap,
            box_width,
            registry.text(TextRole::Small),
            Alignment::Center,
            &lines,
        )
    }
}

/// Children side by side in equally wide columns; as tall as the tallest child.
pub struct ColumnsElement {
    children: Vec<Box<dyn FormElement>>,
}

impl ColumnsElement {
    pub fn new(children: Vec<Box<dyn FormElement>>) -> Self {
        Self { children }
    }

    fn column_width(&self, width: f64) -> f64 {
        let gap = StyleRegistry::global().dimensions().column_gap;
        match self.children.len() {
            0 => width,
            n => (width - gap * (n - 1) as f64) / n as f64,
        }
    }
}

impl FormElement for ColumnsElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let column = self.column_width(width);
        self.children
            .iter()
            .map(|child| child.height(context, column))
            .fold(0.0, f64::max)
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let gap = StyleRegistry::global().dimensions().column_gap;
        let width = mm_value(area.size().width);
        let column = self.column_width(width);
        for (index, child) in self.children.iter_mut().enumerate() {
            let height = child.height(context, column);
            let x = (column + gap) * index as f64;
            child.draw(context, sub_area(&area, x, 0.0, column, height))?;
        }
        Ok(())
    }
}

/// The configured logo scaled to the logo width, or a bold text mark.
pub struct LogoElement {
    logo: Option<LogoImage>,
    fallback: String,
}

impl LogoElement {
    pub fn new(logo: Option<&LogoImage>, fallback: &str) -> Self {
        Self {
            logo: logo.cloned(),
            fallback: fallback.to_owned(),
        }
    }

    fn scale(&self, logo: &LogoImage, width: f64) -> f64 {
        let target = StyleRegistry::global().dimensions().logo_width.min(width);
        if logo.natural_width > f64::EPSILON {
            target / logo.natural_width
        } else {
            1.0
        }
    }

    fn fallback_style(&self) -> Style {
        let registry = StyleRegistry::global();
        registry
            .text(TextRole::Label)
            .with_color(registry.palette().dmo_green)
    }
}

impl FormElement for LogoElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        match &self.logo {
            Some(logo) => logo.natural_height * self.scale(logo, width) + LOGO_SLACK,
            None => {
                let style = self.fallback_style();
                wrap_text(context, style, &self.fallback, width).len() as f64
                    * line_height(context, style)
            }
        }
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let width = mm_value(area.size().width);
        match &self.logo {
            Some(logo) => {
                let scale = self.scale(logo, width);
                let mut image = Image::from_dynamic_image(logo.image.clone())?;
                image.set_scale(Scale::new(scale, scale));
                image.set_alignment(Alignment::Center);
                image.render(context, area, Style::new())?;
                Ok(())
            }
            None => {
                let style = self.fallback_style();
                let lines = wrap_text(context, style, &self.fallback, width);
                print_lines(context, &area, 0.0, 0.0, width, style, Alignment::Center, &lines)
            }
        }
    }
}

/// Vertical whitespace.
pub struct SpacerElement(pub f64);

impl FormElement for SpacerElement {
    fn height(&self, _context: &Context, _width: f64) -> f64 {
        self.0
    }

    fn draw(&mut self, _context: &Context, _area: render::Area<'_>) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::tests::with_render_context;
    use crate::elements::{fill_rows, HAIRLINES};
    use crate::style::HAIRLINE_WIDTH;

    #[test]
    fn header_band_is_filled_with_adjacent_hairlines() {
        let counted = with_render_context(|context, area| {
            let mut header = SectionHeaderElement::new(Some('B'), "Applicant Details");
            let height = header.height(context, mm_value(area.size().width));
            let band = sub_area(&area, 0.0, 0.0, 120.0, height);
            HAIRLINES.with(|count| count.set(0));
            header.draw(context, band).expect("draw header");
            (height, HAIRLINES.with(|count| count.get()))
        });
        let Some((height, strokes)) = counted else {
            eprintln!("Skipping header_band_is_filled_with_adjacent_hairlines: form fonts missing.");
            return;
        };

        let rows = fill_rows(0.0, height).len();
        assert!(rows as f64 >= height / HAIRLINE_WIDTH);
        // light band, letter cell, four border sides
        assert_eq!(strokes, 2 * rows + 4);
    }
}
