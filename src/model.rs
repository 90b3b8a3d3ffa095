//! Value objects describing the logical content of a subscription form.
//!
//! Section builders produce these types and the template assembler turns them into `genpdf`
//! elements (see [`crate::elements`]). Nothing here references a font or a page, so sections
//! can be built, compared and inspected without rendering anything.

use crate::error::FormError;

/// Horizontal alignment of text primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<HorizontalAlignment> for genpdf::Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => genpdf::Alignment::Left,
            HorizontalAlignment::Center => genpdf::Alignment::Center,
            HorizontalAlignment::Right => genpdf::Alignment::Right,
        }
    }
}

pub use crate::style::TextRole;

/// A row of identically sized character boxes used for identifiers with a mandated length.
///
/// The value is upper-cased on construction. Exactly `cell_count` cells are exposed: extra
/// characters are dropped and missing ones leave empty cells, unless the field was built with
/// [`FixedWidthField::exact`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedWidthField {
    label: String,
    value: String,
    cell_count: usize,
    exact: bool,
}

impl FixedWidthField {
    pub fn new(label: impl Into<String>, value: impl AsRef<str>, cell_count: usize) -> Self {
        Self {
            label: label.into(),
            value: value.as_ref().to_uppercase(),
            cell_count,
            exact: false,
        }
    }

    /// A field whose value must fit its cells; overflow fails the renderability check.
    pub fn exact(label: impl Into<String>, value: impl AsRef<str>, cell_count: usize) -> Self {
        Self {
            exact: true,
            ..Self::new(label, value, cell_count)
        }
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// The content of every cell, left to right.
    pub fn cells(&self) -> Vec<Option<char>> {
        self.value
            .chars()
            .map(Some)
            .chain(std::iter::repeat(None))
            .take(self.cell_count)
            .collect()
    }

    /// The characters that are actually drawn.
    pub fn rendered_value(&self) -> String {
        self.value.chars().take(self.cell_count).collect()
    }

    /// Number of characters that did not fit into the cells.
    pub fn overflow(&self) -> usize {
        self.value.chars().count().saturating_sub(self.cell_count)
    }

    /// Position of the first drawn character that cannot be printed in a cell.
    ///
    /// Cells accept printable ASCII only.
    pub fn unsupported_position(&self) -> Option<usize> {
        self.value
            .chars()
            .take(self.cell_count)
            .position(|c| !(c.is_ascii_graphic() || c == ' '))
    }
}

/// A single bordered checkbox with a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckboxField {
    pub label: String,
    pub checked: bool,
}

impl CheckboxField {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
        }
    }
}

/// Selection semantics of a [`CheckboxGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    /// At most one box is checked; the first selected option in declared order wins.
    Single,
    /// Every selected option is checked.
    Multi,
}

/// A set of checkboxes laid out inline or in columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckboxGroup {
    label: Option<String>,
    options: Vec<CheckboxField>,
    mode: SelectionMode,
    columns: Option<usize>,
}

impl CheckboxGroup {
    /// Creates a group with every option unchecked.
    pub fn new<I, S>(options: I, mode: SelectionMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: None,
            options: options
                .into_iter()
                .map(|label| CheckboxField::new(label, false))
                .collect(),
            mode,
            columns: None,
        }
    }

    /// Applies per-option selection flags in option order.
    ///
    /// Missing flags count as unselected. In [`SelectionMode::Single`] only the first `true`
    /// flag is honoured.
    pub fn with_flags<I>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut flags = flags.into_iter();
        let mut seen_selection = false;
        for option in &mut self.options {
            let selected = flags.next().unwrap_or(false);
            option.checked = match self.mode {
                SelectionMode::Multi => selected,
                SelectionMode::Single => selected && !seen_selection,
            };
            seen_selection |= selected;
        }
        self
    }

    /// Marks the options whose labels appear in `selected` (case-insensitive).
    pub fn with_selected<I, S>(self, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected: Vec<String> = selected
            .into_iter()
            .map(|value| value.as_ref().trim().to_lowercase())
            .collect();
        let flags: Vec<bool> = self
            .options
            .iter()
            .map(|option| selected.contains(&option.label.to_lowercase()))
            .collect();
        self.with_flags(flags)
    }

    /// Sets a caption drawn before the options.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Arranges the options in a fixed number of columns instead of flowing them inline.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns.max(1));
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn options(&self) -> &[CheckboxField] {
        &self.options
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn columns(&self) -> Option<usize> {
        self.columns
    }

    /// Labels of the checked options, in option order.
    pub fn checked_labels(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|option| option.checked)
            .map(|option| option.label.as_str())
            .collect()
    }
}

/// One cell of a [`FieldRow`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldCell {
    pub text: String,
    pub is_label: bool,
    /// Relative width of the cell within its row.
    pub weight: usize,
}

/// A bordered row of label and value cells, the building block of the form's grids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldRow {
    cells: Vec<FieldCell>,
}

impl FieldRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label cell followed by its value cell.
    pub fn pair(
        mut self,
        label: impl Into<String>,
        value: impl Into<String>,
        label_weight: usize,
        value_weight: usize,
    ) -> Self {
        self.cells.push(FieldCell {
            text: label.into(),
            is_label: true,
            weight: label_weight,
        });
        self.cells.push(FieldCell {
            text: value.into(),
            is_label: false,
            weight: value_weight,
        });
        self
    }

    /// Appends a single cell.
    pub fn cell(mut self, text: impl Into<String>, is_label: bool, weight: usize) -> Self {
        self.cells.push(FieldCell {
            text: text.into(),
            is_label,
            weight,
        });
        self
    }

    pub fn cells(&self) -> &[FieldCell] {
        &self.cells
    }
}

/// A wrapped paragraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
    pub role: TextRole,
    pub alignment: HorizontalAlignment,
}

/// Kind of bordered placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderKind {
    Stamp,
    Thumbprint,
}

/// Atomic drawable units of the form.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Coloured band opening a section, with an optional section letter.
    SectionHeader {
        letter: Option<char>,
        label: String,
    },
    FixedWidth(FixedWidthField),
    Checkbox(CheckboxField),
    CheckboxGroup(CheckboxGroup),
    FieldRow(FieldRow),
    Text(TextBlock),
    SignatureLine {
        label: String,
        include_date: bool,
    },
    /// Bordered placeholder for a stamp or a thumbprint.
    Placeholder {
        kind: PlaceholderKind,
        label: String,
    },
    /// Children laid side by side in equally wide columns.
    Columns(Vec<Primitive>),
    /// The configured logo, or the fallback text when no logo is configured.
    Logo {
        fallback: String,
    },
    /// Vertical whitespace in millimetres.
    Spacer(f64),
}

impl Primitive {
    pub fn section_header(letter: Option<char>, label: impl Into<String>) -> Self {
        Self::SectionHeader {
            letter,
            label: label.into(),
        }
    }

    pub fn text(text: impl Into<String>, role: TextRole) -> Self {
        Self::Text(TextBlock {
            text: text.into(),
            role,
            alignment: HorizontalAlignment::Left,
        })
    }

    pub fn aligned_text(
        text: impl Into<String>,
        role: TextRole,
        alignment: HorizontalAlignment,
    ) -> Self {
        Self::Text(TextBlock {
            text: text.into(),
            role,
            alignment,
        })
    }

    pub fn signature_line(label: impl Into<String>, include_date: bool) -> Self {
        Self::SignatureLine {
            label: label.into(),
            include_date,
        }
    }

    pub fn stamp_area(label: impl Into<String>) -> Self {
        Self::Placeholder {
            kind: PlaceholderKind::Stamp,
            label: label.into(),
        }
    }

    pub fn thumbprint_area(label: impl Into<String>) -> Self {
        Self::Placeholder {
            kind: PlaceholderKind::Thumbprint,
            label: label.into(),
        }
    }

    /// Visits this primitive and, for [`Primitive::Columns`], every nested one.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Primitive)) {
        visit(self);
        if let Primitive::Columns(children) = self {
            for child in children {
                child.walk(visit);
            }
        }
    }

    /// Every caption and value printed by the primitive, nested ones included.
    pub fn texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        self.walk(&mut |primitive| match primitive {
            Primitive::SectionHeader { label, .. }
            | Primitive::SignatureLine { label, .. }
            | Primitive::Placeholder { label, .. } => texts.push(label.as_str()),
            Primitive::FixedWidth(field) => texts.push(field.label()),
            Primitive::Checkbox(field) => texts.push(field.label.as_str()),
            Primitive::CheckboxGroup(group) => {
                texts.extend(group.label());
                texts.extend(group.options().iter().map(|o| o.label.as_str()));
            }
            Primitive::FieldRow(row) => texts.extend(row.cells().iter().map(|c| c.text.as_str())),
            Primitive::Text(block) => texts.push(block.text.as_str()),
            Primitive::Logo { fallback } => texts.push(fallback.as_str()),
            Primitive::Columns(_) | Primitive::Spacer(_) => {}
        });
        texts
    }
}

/// Logical parts of the form, in the order the assembler emits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Header,
    BondTerms,
    ApplicantIdentity,
    BankDetails,
    Classification,
    DistributionAgent,
    Witness,
    Signatures,
}

/// A named, ordered block of primitives. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    kind: SectionKind,
    title: String,
    primitives: Vec<Primitive>,
}

impl Section {
    /// Starts a builder for a section of the given kind.
    pub fn builder(kind: SectionKind, title: impl Into<String>) -> SectionBuilder {
        SectionBuilder {
            kind,
            title: title.into(),
            primitives: Vec::new(),
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Iterates over every primitive, descending into columns.
    pub fn all_primitives(&self) -> Vec<&Primitive> {
        let mut all = Vec::new();
        for primitive in &self.primitives {
            primitive.walk(&mut |p| all.push(p));
        }
        all
    }

    /// Whether any primitive prints exactly `text` as a caption or value.
    pub fn contains_text(&self, text: &str) -> bool {
        self.primitives
            .iter()
            .any(|primitive| primitive.texts().contains(&text))
    }

    /// The fixed-width field with the given label.
    pub fn fixed_width_field(&self, label: &str) -> Option<&FixedWidthField> {
        self.all_primitives().into_iter().find_map(|p| match p {
            Primitive::FixedWidth(field) if field.label() == label => Some(field),
            _ => None,
        })
    }

    /// The checkbox group with the given caption.
    pub fn checkbox_group(&self, label: &str) -> Option<&CheckboxGroup> {
        self.all_primitives().into_iter().find_map(|p| match p {
            Primitive::CheckboxGroup(group) if group.label() == Some(label) => Some(group),
            _ => None,
        })
    }

    /// Verifies that every primitive can be drawn, before any page is laid out.
    pub fn ensure_renderable(&self) -> Result<(), FormError> {
        for primitive in self.all_primitives() {
            if let Primitive::FixedWidth(field) = primitive {
                if field.is_exact() && field.overflow() > 0 {
                    return Err(FormError::render(format!(
                        "field '{}' in section '{}' needs {} cells but has {}",
                        field.label(),
                        self.title,
                        field.cell_count() + field.overflow(),
                        field.cell_count()
                    )));
                }
                if let Some(position) = field.unsupported_position() {
                    return Err(FormError::render(format!(
                        "field '{}' in section '{}' has an unsupported character in cell {}",
                        field.label(),
                        self.title,
                        position + 1
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`Section`] values.
#[derive(Clone, Debug)]
pub struct SectionBuilder {
    kind: SectionKind,
    title: String,
    primitives: Vec<Primitive>,
}

impl SectionBuilder {
    /// Appends a primitive.
    pub fn push(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    /// Appends several primitives.
    pub fn extend<I>(mut self, primitives: I) -> Self
    where
        I: IntoIterator<Item = Primitive>,
    {
        self.primitives.extend(primitives);
        self
    }

    /// Appends a primitive when `condition` holds.
    pub fn push_if(self, condition: bool, primitive: impl FnOnce() -> Primitive) -> Self {
        if condition {
            self.push(primitive())
        } else {
            self
        }
    }

    pub fn build(self) -> Section {
        Section {
            kind: self.kind,
            title: self.title,
            primitives: self.primitives,
        }
    }
}
