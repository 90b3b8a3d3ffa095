//! `genpdf` rendering of the form primitives.
//!
//! Every primitive is turned into a [`FormElement`]: something that knows how tall it is for a
//! given width and how to draw itself into an area of exactly that size. The [`Flowable`]
//! adapter plugs form elements into `genpdf`'s layout and keeps each of them in one piece:
//! an element that does not fit into the rest of the page moves to the next page as a whole.

mod blocks;
mod checkbox;
mod fields;

use genpdf::error::{Error, ErrorKind};
use genpdf::style::{Color, Style};
use genpdf::{render, Alignment, Context, Element, Position, RenderResult, Size};

use crate::model::Primitive;
use crate::style::{mm, mm_value, Stroke, StyleRegistry, HAIRLINE_WIDTH};

pub use blocks::{decode_logo, LogoImage};

/// A drawable unit with a width-dependent height. Lengths are in millimetres.
pub trait FormElement {
    /// Height needed to draw the element at the given width.
    fn height(&self, context: &Context, width: f64) -> f64;

    /// Draws the element into `area`, whose height is at least [`FormElement::height`].
    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error>;
}

/// Resources shared by the elements of one render call.
#[derive(Clone, Copy, Default)]
pub struct RenderAssets<'a> {
    pub logo: Option<&'a LogoImage>,
}

/// Builds the form element drawing `primitive`.
pub fn element_for(primitive: &Primitive, assets: RenderAssets<'_>) -> Box<dyn FormElement> {
    match primitive {
        Primitive::SectionHeader { letter, label } => {
            Box::new(blocks::SectionHeaderElement::new(*letter, label))
        }
        Primitive::FixedWidth(field) => Box::new(fields::FixedWidthElement::new(field)),
        Primitive::Checkbox(field) => Box::new(checkbox::CheckboxElement::new(field)),
        Primitive::CheckboxGroup(group) => Box::new(checkbox::CheckboxGroupElement::new(group)),
        Primitive::FieldRow(row) => Box::new(fields::FieldRowElement::new(row)),
        Primitive::Text(block) => Box::new(blocks::TextElement::new(block)),
        Primitive::SignatureLine {
            label,
            include_date,
        } => Box::new(blocks::SignatureElement::new(label, *include_date)),
        Primitive::Placeholder { kind, label } => {
            Box::new(blocks::PlaceholderElement::new(*kind, label))
        }
        Primitive::Columns(children) => Box::new(blocks::ColumnsElement::new(
            children
                .iter()
                .map(|child| element_for(child, assets))
                .collect(),
        )),
        Primitive::Logo { fallback } => Box::new(blocks::LogoElement::new(assets.logo, fallback)),
        Primitive::Spacer(height) => Box::new(blocks::SpacerElement(*height)),
    }
}

/// Several elements that always land on the same page, stacked top to bottom.
pub struct KeepTogether {
    parts: Vec<Box<dyn FormElement>>,
    spacing: f64,
}

impl KeepTogether {
    pub fn new(parts: Vec<Box<dyn FormElement>>) -> Self {
        Self {
            parts,
            spacing: StyleRegistry::global().dimensions().block_spacing,
        }
    }
}

impl FormElement for KeepTogether {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let content: f64 = self
            .parts
            .iter()
            .map(|part| part.height(context, width))
            .sum();
        content + self.spacing * self.parts.len().saturating_sub(1) as f64
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let width = mm_value(area.size().width);
        let mut offset = 0.0;
        for part in &mut self.parts {
            let height = part.height(context, width);
            part.draw(context, sub_area(&area, 0.0, offset, width, height))?;
            offset += height + self.spacing;
        }
        Ok(())
    }
}

/// `genpdf` element laying out a [`FormElement`] as one unbreakable unit.
pub struct Flowable {
    name: String,
    inner: Box<dyn FormElement>,
    spacing_after: f64,
    max_height: f64,
    on_placed: Option<Box<dyn FnMut()>>,
}

impl Flowable {
    /// Wraps `inner`. `max_height` is the body height of an empty page.
    pub fn new(name: impl Into<String>, inner: Box<dyn FormElement>, max_height: f64) -> Self {
        Self {
            name: name.into(),
            inner,
            spacing_after: StyleRegistry::global().dimensions().block_spacing,
            max_height,
            on_placed: None,
        }
    }

    /// Registers a callback run once the element has been drawn on a page.
    pub fn with_placement_hook(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_placed = Some(Box::new(hook));
        self
    }
}

impl Element for Flowable {
    fn render(
        &mut self,
        context: &Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let width = mm_value(area.size().width);
        let available = mm_value(area.size().height);
        let height = self.inner.height(context, width);

        let mut result = RenderResult::default();
        if height > self.max_height {
            return Err(Error::new(
                format!(
                    "{} needs {:.1} mm but a page only holds {:.1} mm",
                    self.name, height, self.max_height
                ),
                ErrorKind::PageSizeExceeded,
            ));
        }
        if height > available {
            result.has_more = true;
            return Ok(result);
        }

        self.inner
            .draw(context, sub_area(&area, 0.0, 0.0, width, height))?;
        if let Some(hook) = self.on_placed.as_mut() {
            hook();
        }
        let consumed = (height + self.spacing_after).min(available);
        result.size = Size::new(area.size().width, mm(consumed));
        Ok(result)
    }
}

/// Returns the part of `area` starting at (`x`, `y`) with the given size.
pub(crate) fn sub_area<'p>(
    area: &render::Area<'p>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> render::Area<'p> {
    let mut area = area.clone();
    area.add_offset(Position::new(mm(x), mm(y)));
    area.set_width(mm(width));
    area.set_height(mm(height));
    area
}

pub(crate) fn line_height(context: &Context, style: Style) -> f64 {
    mm_value(style.line_height(&context.font_cache))
}

pub(crate) fn text_width(context: &Context, style: Style, text: &str) -> f64 {
    mm_value(style.str_width(&context.font_cache, text))
}

const WRAP_TOLERANCE: f64 = 0.01;

/// Greedy word wrap. Words longer than a line are split between characters.
///
/// Always returns at least one line so that empty values still reserve their row.
pub(crate) fn wrap_text(context: &Context, style: Style, text: &str, width: f64) -> Vec<String> {
    let width = width + WRAP_TOLERANCE;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if text_width(context, style, &candidate) <= width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(context, style, word) <= width {
                current = word.to_owned();
            } else {
                for ch in word.chars() {
                    let mut extended = current.clone();
                    extended.push(ch);
                    if !current.is_empty() && text_width(context, style, &extended) > width {
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    } else {
                        current = extended;
                    }
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Prints one line of text with its top edge at (`x`, `y`).
///
/// Fails when the line does not fit below `y` in `area`.
pub(crate) fn print_line(
    context: &Context,
    area: &render::Area<'_>,
    x: f64,
    y: f64,
    style: Style,
    text: &str,
) -> Result<(), Error> {
    if text.is_empty() {
        return Ok(());
    }
    match area.text_section(&context.font_cache, Position::new(mm(x), mm(y)), style) {
        Some(mut section) => section.print_str(text, style),
        None => Err(Error::new(
            format!(
                "text line at {:.1} mm does not fit into an area {:.1} mm high",
                y,
                mm_value(area.size().height)
            ),
            ErrorKind::PageSizeExceeded,
        )),
    }
}

/// Prints pre-wrapped lines, aligned within `width`, starting at (`x`, `y`).
#[allow(clippy::too_many_arguments)]
pub(crate) fn print_lines(
    context: &Context,
    area: &render::Area<'_>,
    x: f64,
    y: f64,
    width: f64,
    style: Style,
    alignment: Alignment,
    lines: &[String],
) -> Result<(), Error> {
    let step = line_height(context, style);
    for (index, line) in lines.iter().enumerate() {
        let slack = (width - text_width(context, style, line)).max(0.0);
        let offset = match alignment {
            Alignment::Left => 0.0,
            Alignment::Center => slack / 2.0,
            Alignment::Right => slack,
        };
        print_line(
            context,
            area,
            x + offset,
            y + step * index as f64,
            style,
            line,
        )?;
    }
    Ok(())
}

/// Perpendicular offsets of the hairlines that together draw a stroke `width` wide.
pub(crate) fn stroke_offsets(width: f64) -> Vec<f64> {
    let passes = (width / HAIRLINE_WIDTH).ceil().max(1.0) as usize;
    if passes == 1 {
        return vec![0.0];
    }
    let span = width - HAIRLINE_WIDTH;
    let step = span / (passes - 1) as f64;
    (0..passes)
        .map(|index| -span / 2.0 + step * index as f64)
        .collect()
}

/// Vertical centres of the hairlines that cover a band from `y` to `y + height` without gaps.
pub(crate) fn fill_rows(y: f64, height: f64) -> Vec<f64> {
    if height <= HAIRLINE_WIDTH {
        return vec![y + height / 2.0];
    }
    let first = y + HAIRLINE_WIDTH / 2.0;
    let span = height - HAIRLINE_WIDTH;
    let gaps = (span / (HAIRLINE_WIDTH * 0.9)).ceil().max(1.0) as usize;
    let step = span / gaps as f64;
    (0..=gaps).map(|index| first + step * index as f64).collect()
}

/// Draws a straight segment from (`x1`, `y1`) to (`x2`, `y2`).
pub(crate) fn draw_segment(
    area: &render::Area<'_>,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
    stroke: Stroke,
) {
    let length = (x2 - x1).hypot(y2 - y1);
    if length <= f64::EPSILON {
        return;
    }
    let (nx, ny) = (-(y2 - y1) / length, (x2 - x1) / length);
    for offset in stroke_offsets(stroke.width) {
        let (dx, dy) = (nx * offset, ny * offset);
        hairline(area, (x1 + dx, y1 + dy), (x2 + dx, y2 + dy), stroke.style());
    }
}

#[cfg(test)]
thread_local! {
    pub(crate) static HAIRLINES: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

/// Draws one line at the default width.
fn hairline(area: &render::Area<'_>, (x1, y1): (f64, f64), (x2, y2): (f64, f64), style: Style) {
    #[cfg(test)]
    HAIRLINES.with(|count| count.set(count.get() + 1));
    area.draw_line(
        vec![Position::new(mm(x1), mm(y1)), Position::new(mm(x2), mm(y2))],
        style,
    );
}

pub(crate) fn stroke_rect(
    area: &render::Area<'_>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stroke: Stroke,
) {
    let corners = [
        (x, y),
        (x + width, y),
        (x + width, y + height),
        (x, y + height),
    ];
    for index in 0..corners.len() {
        draw_segment(area, corners[index], corners[(index + 1) % corners.len()], stroke);
    }
}

/// Paints a solid rectangle with adjacent horizontal hairlines.
pub(crate) fn fill_rect(
    area: &render::Area<'_>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: Color,
) {
    let style = Style::new().with_color(color);
    for row in fill_rows(y, height) {
        hairline(area, (x, row), (x + width, row), style);
    }
}

pub(crate) fn horizontal_rule(
    area: &render::Area<'_>,
    x: f64,
    y: f64,
    length: f64,
    stroke: Stroke,
) {
    draw_segment(area, (x, y), (x + length, y), stroke);
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::fonts;

    /// Element that hands its render context and area to a callback.
    struct WithContext<F> {
        run: Option<F>,
    }

    impl<F> Element for WithContext<F>
    where
        F: FnOnce(&Context, render::Area<'_>),
    {
        fn render(
            &mut self,
            context: &Context,
            area: render::Area<'_>,
            _style: Style,
        ) -> Result<RenderResult, Error> {
            if let Some(run) = self.run.take() {
                run(context, area);
            }
            Ok(RenderResult::default())
        }
    }

    /// Runs `f` inside a real `genpdf` render with the form fonts, or returns `None` when the
    /// fonts are not installed.
    pub(crate) fn with_render_context<T: 'static>(
        f: impl FnOnce(&Context, render::Area<'_>) -> T + 'static,
    ) -> Option<T> {
        if !fonts::fonts_available() {
            return None;
        }
        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        let mut document = genpdf::Document::new(fonts::font_family().expect("fonts"));
        document.push(WithContext {
            run: Some(move |context: &Context, area: render::Area<'_>| {
                *slot.borrow_mut() = Some(f(context, area));
            }),
        });
        document.render(&mut Vec::new()).expect("render");
        let value = result.borrow_mut().take();
        value
    }

    #[test]
    fn fill_rows_cover_the_band_without_gaps() {
        let rows = fill_rows(2.0, 7.0);
        assert!(rows.len() as f64 >= 7.0 / HAIRLINE_WIDTH);
        assert!((rows[0] - (2.0 + HAIRLINE_WIDTH / 2.0)).abs() < 1e-9);
        let last = rows[rows.len() - 1];
        assert!((last - (9.0 - HAIRLINE_WIDTH / 2.0)).abs() < 1e-9);
        assert!(rows
            .windows(2)
            .all(|pair| pair[1] - pair[0] <= HAIRLINE_WIDTH + 1e-9));
    }

    #[test]
    fn thin_band_is_a_single_row() {
        let rows = fill_rows(1.0, 0.2);
        assert_eq!(rows.len(), 1);
        assert!((rows[0] - 1.1).abs() < 1e-9);
    }

    #[test]
    fn wide_strokes_use_several_hairlines() {
        assert_eq!(stroke_offsets(0.25), [0.0]);
        let offsets = stroke_offsets(1.0);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0] + offsets[2]).abs() < 1e-9);
        assert!((offsets[2] - offsets[0] + HAIRLINE_WIDTH - 1.0).abs() < 1e-9);
    }

    #[test]
    fn text_below_the_area_is_an_error() {
        let outcome = with_render_context(|context, area| {
            let style = StyleRegistry::global().text(crate::style::TextRole::Body);
            let tiny = sub_area(&area, 0.0, 0.0, 50.0, 0.5);
            print_line(context, &tiny, 0.0, 0.0, style, "Account Number")
                .map_err(|err| err.to_string())
        });
        if let Some(outcome) = outcome {
            let message = outcome.unwrap_err();
            assert!(message.contains("does not fit"), "{message}");
        }
    }
}
