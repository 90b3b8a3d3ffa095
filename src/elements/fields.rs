//! Character-cell fields and bordered label/value rows.

use genpdf::error::Error;
use genpdf::{render, Alignment, Context};

use super::{fill_rect, line_height, print_line, print_lines, stroke_rect, text_width, wrap_text};
use super::FormElement;
use crate::model::{FieldCell, FixedWidthField, FieldRow};
use crate::style::{mm_value, LineRole, StyleRegistry, TextRole};

/// Label on the left, then one bordered box per character.
pub struct FixedWidthElement {
    label: String,
    cells: Vec<Option<char>>,
}

impl FixedWidthElement {
    pub fn new(field: &FixedWidthField) -> Self {
        if field.overflow() > 0 {
            log::debug!(
                "field '{}' truncated to {} cells, {} characters dropped",
                field.label(),
                field.cell_count(),
                field.overflow()
            );
        }
        Self {
            label: field.label().to_owned(),
            cells: field.cells(),
        }
    }

    fn label_width(&self, width: f64) -> f64 {
        if self.label.is_empty() {
            return 0.0;
        }
        let d = StyleRegistry::global().dimensions();
        d.fixed_label_width.min(width * 0.4)
    }

    fn cell_width(&self, width: f64) -> f64 {
        let d = StyleRegistry::global().dimensions();
        let room = (width - self.label_width(width)).max(0.0);
        match self.cells.len() {
            0 => 0.0,
            count => d.char_cell_width.min(room / count as f64),
        }
    }

    fn label_lines(&self, context: &Context, width: f64) -> Vec<String> {
        if self.label.is_empty() {
            return Vec::new();
        }
        let style = StyleRegistry::global().text(TextRole::Label);
        let d = StyleRegistry::global().dimensions();
        wrap_text(
            context,
            style,
            &self.label,
            (self.label_width(width) - d.cell_padding).max(1.0),
        )
    }
}

impl FormElement for FixedWidthElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let registry = StyleRegistry::global();
        let label = self.label_lines(context, width).len() as f64
            * line_height(context, registry.text(TextRole::Label));
        registry.dimensions().char_cell_height.max(label)
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let width = mm_value(area.size().width);
        let label_width = self.label_width(width);
        let label_style = registry.text(TextRole::Label);
        let cell_style = registry.text(TextRole::Cell);
        let cell_height = registry.dimensions().char_cell_height;

        let lines = self.label_lines(context, width);
        print_lines(
            context,
            &area,
            0.0,
            0.0,
            label_width,
            label_style,
            Alignment::Left,
            &lines,
        )?;

        let cell_width = self.cell_width(width);
        let glyph_height = line_height(context, cell_style);
        for (index, cell) in self.cells.iter().enumerate() {
            let x = label_width + cell_width * index as f64;
            stroke_rect(&area, x, 0.0, cell_width, cell_height, registry.line(LineRole::Cell));
            if let Some(ch) = cell {
                let text = ch.to_string();
                let glyph_width = text_width(context, cell_style, &text);
                print_line(
                    context,
                    &area,
                    x + (cell_width - glyph_width) / 2.0,
                    ((cell_height - glyph_height) / 2.0).max(0.0),
                    cell_style,
                    &text,
                )?;
            }
        }
        Ok(())
    }
}

/// A grid row: cells share the row height, labels sit on a shaded background.
pub struct FieldRowElement {
    cells: Vec<FieldCell>,
}

impl FieldRowElement {
    pub fn new(row: &FieldRow) -> Self {
        Self {
            cells: row.cells().to_vec(),
        }
    }

    fn widths(&self, width: f64) -> Vec<f64> {
        let total: usize = self.cells.iter().map(|cell| cell.weight.max(1)).sum();
        self.cells
            .iter()
            .map(|cell| width * cell.weight.max(1) as f64 / total.max(1) as f64)
            .collect()
    }

    fn wrapped(&self, context: &Context, width: f64) -> Vec<Vec<String>> {
        let registry = StyleRegistry::global();
        let padding = registry.dimensions().cell_padding;
        self.cells
            .iter()
            .zip(self.widths(width))
            .map(|(cell, cell_width)| {
                wrap_text(
                    context,
                    registry.text(role(cell)),
                    &cell.text,
                    (cell_width - 2.0 * padding).max(1.0),
                )
            })
            .collect()
    }
}

fn role(cell: &FieldCell) -> TextRole {
    if cell.is_label {
        TextRole::Label
    } else {
        TextRole::Body
    }
}

impl FormElement for FieldRowElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let registry = StyleRegistry::global();
        let padding = registry.dimensions().cell_padding;
        let content = self
            .cells
            .iter()
            .zip(self.wrapped(context, width))
            .map(|(cell, lines)| {
                lines.len() as f64 * line_height(context, registry.text(role(cell)))
            })
            .fold(0.0, f64::max);
        content + 2.0 * padding
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let padding = registry.dimensions().cell_padding;
        let width = mm_value(area.size().width);
        let height = self.height(context, width);
        let wrapped = self.wrapped(context, width);

        let mut x = 0.0;
        for ((cell, cell_width), lines) in self.cells.iter().zip(self.widths(width)).zip(wrapped) {
            if cell.is_label {
                fill_rect(
                    &area,
                    x,
                    0.0,
                    cell_width,
                    height,
                    registry.grid().label_background,
                );
            }
            stroke_rect(&area, x, 0.0, cell_width, height, registry.line(LineRole::Border));
            print_lines(
                context,
                &area,
                x + padding,
                padding,
                cell_width - 2.0 * padding,
                registry.text(role(cell)),
                Alignment::Left,
                &lines,
            )?;
            x += cell_width;
        }
        Ok(())
    }
}
