//! Checkboxes and checkbox groups.

use genpdf::error::Error;
use genpdf::{render, Alignment, Context};

use super::{
    draw_segment, line_height, print_lines, stroke_rect, sub_area, text_width, wrap_text,
    FormElement,
};
use crate::model::{CheckboxField, CheckboxGroup};
use crate::style::{mm_value, LineRole, StyleRegistry, TextRole};

/// Draws a bordered box at (`x`, `y`), crossed when `checked`.
fn draw_box(area: &render::Area<'_>, x: f64, y: f64, checked: bool) {
    let registry = StyleRegistry::global();
    let size = registry.dimensions().checkbox_size;
    stroke_rect(area, x, y, size, size, registry.line(LineRole::Border));
    if checked {
        let inset = size * 0.2;
        let (left, right) = (x + inset, x + size - inset);
        let (top, bottom) = (y + inset, y + size - inset);
        let mark = registry.line(LineRole::Mark);
        draw_segment(area, (left, top), (right, bottom), mark);
        draw_segment(area, (left, bottom), (right, top), mark);
    }
}

/// One checkbox with its label wrapped to the right.
pub struct CheckboxElement {
    field: CheckboxField,
}

impl CheckboxElement {
    pub fn new(field: &CheckboxField) -> Self {
        Self {
            field: field.clone(),
        }
    }

    fn label_lines(&self, context: &Context, width: f64) -> Vec<String> {
        let registry = StyleRegistry::global();
        let d = registry.dimensions();
        wrap_text(
            context,
            registry.text(TextRole::Body),
            &self.field.label,
            (width - d.checkbox_size - d.checkbox_gap).max(1.0),
        )
    }
}

impl FormElement for CheckboxElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        let registry = StyleRegistry::global();
        let text = self.label_lines(context, width).len() as f64
            * line_height(context, registry.text(TextRole::Body));
        registry.dimensions().checkbox_size.max(text)
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let d = registry.dimensions();
        let width = mm_value(area.size().width);
        draw_box(&area, 0.0, 0.0, self.field.checked);
        let lines = self.label_lines(context, width);
        print_lines(
            context,
            &area,
            d.checkbox_size + d.checkbox_gap,
            0.0,
            width - d.checkbox_size - d.checkbox_gap,
            registry.text(TextRole::Body),
            Alignment::Left,
            &lines,
        )
    }
}

/// Placement of one option inside a group.
#[derive(Debug)]
struct Slot {
    x: f64,
    y: f64,
    width: f64,
}

/// Caption lines, the width they are wrapped to, option slots and the total height.
#[derive(Debug)]
struct GroupLayout {
    caption: Vec<String>,
    caption_width: f64,
    slots: Vec<Slot>,
    height: f64,
}

/// A labelled set of checkboxes, flowing inline or arranged in columns.
///
/// Inline groups keep the caption in a left column of its own and flow the options to its
/// right. The whole group is laid out as one unit and never splits across pages.
pub struct CheckboxGroupElement {
    group: CheckboxGroup,
}

impl CheckboxGroupElement {
    pub fn new(group: &CheckboxGroup) -> Self {
        Self {
            group: group.clone(),
        }
    }

    fn caption_lines(&self, context: &Context, width: f64) -> Vec<String> {
        let label_style = StyleRegistry::global().text(TextRole::Label);
        self.group
            .label()
            .map(|label| wrap_text(context, label_style, label, width.max(1.0)))
            .unwrap_or_default()
    }

    /// Computes caption lines and option slots. Option heights come from
    /// [`CheckboxElement::height`] at the slot width.
    fn layout(&self, context: &Context, width: f64) -> GroupLayout {
        let registry = StyleRegistry::global();
        let d = registry.dimensions();
        let body = registry.text(TextRole::Body);
        let label_height = line_height(context, registry.text(TextRole::Label));
        let row_height = d.checkbox_size.max(line_height(context, body));
        let options = self.group.options();
        let mut slots = Vec::with_capacity(options.len());

        match self.group.columns() {
            Some(columns) => {
                let caption = self.caption_lines(context, width);
                let caption_height = if caption.is_empty() {
                    0.0
                } else {
                    caption.len() as f64 * label_height + d.checkbox_gap
                };
                let column_width = width / columns as f64;
                let mut y = caption_height;
                for row in options.chunks(columns) {
                    let mut tallest: f64 = 0.0;
                    for (index, option) in row.iter().enumerate() {
                        let element = CheckboxElement::new(option);
                        tallest = tallest.max(element.height(context, column_width));
                        slots.push(Slot {
                            x: column_width * index as f64,
                            y,
                            width: column_width,
                        });
                    }
                    y += tallest + d.checkbox_gap;
                }
                GroupLayout {
                    caption,
                    caption_width: width,
                    slots,
                    height: (y - d.checkbox_gap).max(caption_height),
                }
            }
            None => {
                let column = self
                    .group
                    .label()
                    .map(|label| {
                        (text_width(context, registry.text(TextRole::Label), label)
                            + d.checkbox_option_spacing)
                            .min(width * 0.5)
                    })
                    .unwrap_or(0.0);
                let caption_width = (column - d.checkbox_option_spacing).max(0.0);
                let caption = self.caption_lines(context, caption_width);
                let available = (width - column).max(1.0);

                let mut x = column;
                let mut y = 0.0;
                let mut tallest = row_height;
                for option in options {
                    let natural = d.checkbox_size
                        + d.checkbox_gap
                        + text_width(context, body, &option.label);
                    let slot_width = natural.min(available);
                    if x > column && x + slot_width > width {
                        x = column;
                        y += tallest + d.checkbox_gap;
                        tallest = row_height;
                    }
                    let element = CheckboxElement::new(option);
                    tallest = tallest.max(element.height(context, slot_width));
                    slots.push(Slot {
                        x,
                        y,
                        width: slot_width,
                    });
                    x += slot_width + d.checkbox_option_spacing;
                }
                GroupLayout {
                    height: (y + tallest).max(caption.len() as f64 * label_height),
                    caption,
                    caption_width,
                    slots,
                }
            }
        }
    }
}

impl FormElement for CheckboxGroupElement {
    fn height(&self, context: &Context, width: f64) -> f64 {
        self.layout(context, width).height
    }

    fn draw(&mut self, context: &Context, area: render::Area<'_>) -> Result<(), Error> {
        let registry = StyleRegistry::global();
        let width = mm_value(area.size().width);
        let layout = self.layout(context, width);

        print_lines(
            context,
            &area,
            0.0,
            0.0,
            layout.caption_width,
            registry.text(TextRole::Label),
            Alignment::Left,
            &layout.caption,
        )?;

        for (option, slot) in self.group.options().iter().zip(layout.slots) {
            let mut element = CheckboxElement::new(option);
            let height = element.height(context, slot.width);
            element.draw(
                context,
                sub_area(&area, slot.x, slot.y, slot.width, height),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{bind, tests as fixtures};
    use crate::elements::tests::with_render_context;
    use crate::sections::classification;

    const RESIDENCY: &str = "Residency Classification of Applicant (tick the appropriate box):";

    fn residency_group() -> CheckboxGroup {
        let section = classification(&bind(&fixtures::individual()).expect("consistent"));
        section.checkbox_group(RESIDENCY).expect("residency").clone()
    }

    #[test]
    fn inline_caption_stays_left_of_the_options() {
        let group = residency_group();
        let checked = with_render_context(move |context, area| {
            let width = mm_value(area.size().width);
            let element = CheckboxGroupElement::new(&group);
            let layout = element.layout(context, width);
            let label_style = StyleRegistry::global().text(TextRole::Label);

            assert!(!layout.caption.is_empty());
            for line in &layout.caption {
                assert!(text_width(context, label_style, line) <= layout.caption_width + 1e-6);
            }
            for slot in &layout.slots {
                assert!(slot.x >= layout.caption_width);
                assert!(slot.x + slot.width <= width + 1e-6);
            }
            let label_height = line_height(context, label_style);
            assert!(layout.height >= layout.caption.len() as f64 * label_height);
        });
        if checked.is_none() {
            eprintln!("Skipping inline_caption_stays_left_of_the_options: form fonts missing.");
        }
    }

    #[test]
    fn columned_caption_sits_above_the_options() {
        let group = residency_group().with_columns(2);
        let checked = with_render_context(move |context, area| {
            let width = mm_value(area.size().width);
            let layout = CheckboxGroupElement::new(&group).layout(context, width);
            assert_eq!(layout.caption_width, width);
            let first_row = layout.slots.first().map(|slot| slot.y).unwrap_or_default();
            assert!(first_row > 0.0);
            assert_eq!(layout.slots[1].x, width / 2.0);
        });
        if checked.is_none() {
            eprintln!("Skipping columned_caption_sits_above_the_options: form fonts missing.");
        }
    }
}
