//! Process-wide style registry for the subscription form.
//!
//! The registry holds the palette, the typography scale, the geometric constants of every
//! primitive and the grid (table) style of the official Debt Management Office form. It is
//! created once per process through [`StyleRegistry::global`] and only ever handed out by
//! reference; render calls derive `genpdf` styles from it on demand instead of rebuilding or
//! mutating style definitions.

use std::sync::OnceLock;

use genpdf::style::{Color, Style};
use genpdf::Mm;

static REGISTRY: OnceLock<StyleRegistry> = OnceLock::new();

/// Width of one stroke as `genpdf` draws it: the PDF default line width of 1 pt.
pub const HAIRLINE_WIDTH: f64 = 25.4 / 72.0;

/// Colour and nominal width (mm) of a drawn line.
///
/// `genpdf` strokes every line at [`HAIRLINE_WIDTH`]; wider strokes are built from several
/// parallel hairlines by the drawing helpers in [`crate::elements`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    /// The `genpdf` style carrying the stroke colour.
    pub fn style(self) -> Style {
        Style::new().with_color(self.color)
    }
}

/// Colours of the official form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Primary DMO green used for borders, letter cells and check marks.
    pub dmo_green: Color,
    /// Light green background of section title bands.
    pub dmo_green_light: Color,
    pub black: Color,
    pub white: Color,
    /// Secondary text (instructions, footer).
    pub gray: Color,
    /// Background of label cells.
    pub light_gray: Color,
}

/// Font sizes in points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Typography {
    pub title: u8,
    pub section_header: u8,
    pub body: u8,
    pub small: u8,
    pub tiny: u8,
}

/// Geometric constants in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub page_margin: f64,
    pub footer_height: f64,
    pub block_spacing: f64,
    pub column_gap: f64,
    pub cell_padding: f64,
    pub section_header_height: f64,
    pub section_letter_width: f64,
    pub checkbox_size: f64,
    pub checkbox_gap: f64,
    pub checkbox_option_spacing: f64,
    pub char_cell_width: f64,
    pub char_cell_height: f64,
    pub fixed_label_width: f64,
    pub signature_line_length: f64,
    pub signature_date_length: f64,
    pub signature_height: f64,
    pub stamp_width: f64,
    pub stamp_height: f64,
    pub thumbprint_width: f64,
    pub thumbprint_height: f64,
    pub logo_width: f64,
    pub border_thickness: f64,
    pub thin_thickness: f64,
    pub mark_thickness: f64,
}

/// Grid style applied to label/value rows, the equivalent of the form's table style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStyle {
    pub border: Color,
    pub label_background: Color,
    pub label_bold: bool,
}

/// Named text roles used by the primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextRole {
    Title,
    SectionHeader,
    Label,
    Body,
    Small,
    Instruction,
    Declaration,
    Footer,
    /// Bold white text on the dark green letter cell.
    HeaderLetter,
    /// Character drawn inside a fixed-width cell.
    Cell,
}

/// Named stroke roles used by the primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineRole {
    /// Borders of boxes, grids and checkboxes.
    Border,
    /// Character cell borders.
    Cell,
    /// The "X" inside a checked box.
    Mark,
    /// Signature and date rules.
    Rule,
}

/// Immutable style definitions shared by every render call.
#[derive(Debug)]
pub struct StyleRegistry {
    palette: Palette,
    typography: Typography,
    dimensions: Dimensions,
    grid: GridStyle,
}

impl StyleRegistry {
    /// Returns the process-wide registry, constructing it on first access.
    pub fn global() -> &'static StyleRegistry {
        REGISTRY.get_or_init(|| {
            log::debug!("initialising subscription form style registry");
            StyleRegistry::official()
        })
    }

    fn official() -> Self {
        let palette = Palette {
            dmo_green: Color::Rgb(0x00, 0x64, 0x00),
            dmo_green_light: Color::Rgb(0xE8, 0xF5, 0xE9),
            black: Color::Rgb(0x00, 0x00, 0x00),
            white: Color::Rgb(0xFF, 0xFF, 0xFF),
            gray: Color::Rgb(0x66, 0x66, 0x66),
            light_gray: Color::Rgb(0xF5, 0xF5, 0xF5),
        };

        Self {
            palette,
            typography: Typography {
                title: 11,
                section_header: 10,
                body: 9,
                small: 8,
                tiny: 7,
            },
            dimensions: Dimensions {
                page_margin: 15.0,
                footer_height: 8.0,
                block_spacing: 2.8,
                column_gap: 5.0,
                cell_padding: 1.2,
                section_header_height: 7.0,
                section_letter_width: 7.0,
                checkbox_size: 3.5,
                checkbox_gap: 1.2,
                checkbox_option_spacing: 6.0,
                char_cell_width: 4.5,
                char_cell_height: 5.5,
                fixed_label_width: 38.0,
                signature_line_length: 60.0,
                signature_date_length: 25.0,
                signature_height: 14.0,
                stamp_width: 40.0,
                stamp_height: 25.0,
                thumbprint_width: 30.0,
                thumbprint_height: 25.0,
                logo_width: 22.0,
                border_thickness: 0.35,
                thin_thickness: 0.25,
                mark_thickness: 0.45,
            },
            grid: GridStyle {
                border: palette.dmo_green,
                label_background: palette.light_gray,
                label_bold: true,
            },
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn grid(&self) -> &GridStyle {
        &self.grid
    }

    /// Builds the `genpdf` text style for a role.
    pub fn text(&self, role: TextRole) -> Style {
        let p = &self.palette;
        let t = &self.typography;
        match role {
            TextRole::Title => Style::new().bold().with_font_size(t.title).with_color(p.black),
            TextRole::SectionHeader => Style::new()
                .bold()
                .with_font_size(t.section_header)
                .with_color(p.black),
            TextRole::HeaderLetter => Style::new()
                .bold()
                .with_font_size(t.section_header)
                .with_color(p.white),
            TextRole::Label => {
                let style = Style::new().with_font_size(t.body).with_color(p.black);
                if self.grid.label_bold {
                    style.bold()
                } else {
                    style
                }
            }
            TextRole::Body | TextRole::Cell => {
                Style::new().with_font_size(t.body).with_color(p.black)
            }
            TextRole::Small => Style::new().with_font_size(t.small).with_color(p.black),
            TextRole::Instruction => Style::new().with_font_size(t.tiny).with_color(p.gray),
            TextRole::Declaration => Style::new()
                .italic()
                .with_font_size(t.small)
                .with_color(p.black),
            TextRole::Footer => Style::new().with_font_size(t.tiny).with_color(p.gray),
        }
    }

    /// Stroke used for a role.
    pub fn line(&self, role: LineRole) -> Stroke {
        let d = &self.dimensions;
        let p = &self.palette;
        let (width, color) = match role {
            LineRole::Border => (d.border_thickness, self.grid.border),
            LineRole::Cell => (d.thin_thickness, self.grid.border),
            LineRole::Mark => (d.mark_thickness, p.dmo_green),
            LineRole::Rule => (d.thin_thickness, p.black),
        };
        Stroke { color, width }
    }
}

/// Converts a millimetre value into a `genpdf` length.
pub fn mm(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Converts a `genpdf` length into millimetres.
pub fn mm_value(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_constructed_once() {
        let first = StyleRegistry::global();
        let second = StyleRegistry::global();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn registry_is_shared_across_threads() {
        let local = StyleRegistry::global() as *const StyleRegistry as usize;
        let remote = std::thread::spawn(|| StyleRegistry::global() as *const StyleRegistry as usize)
            .join()
            .expect("registry thread panicked");
        assert_eq!(local, remote);
    }

    #[test]
    fn header_letter_is_white_on_green() {
        let registry = StyleRegistry::global();
        let style = registry.text(TextRole::HeaderLetter);
        assert!(style.is_bold());
        assert_eq!(style.color(), Some(registry.palette().white));
        assert_eq!(registry.grid().border, registry.palette().dmo_green);
    }

    #[test]
    fn check_marks_are_heavier_than_borders() {
        let registry = StyleRegistry::global();
        let mark = registry.line(LineRole::Mark);
        assert!(mark.width > HAIRLINE_WIDTH);
        assert!(mark.width > registry.line(LineRole::Border).width);
        assert_eq!(mark.style().color(), Some(registry.palette().dmo_green));
    }

    #[test]
    fn millimetre_conversion_round_trips() {
        assert!((mm_value(mm(12.5)) - 12.5).abs() < f64::EPSILON);
    }
}
