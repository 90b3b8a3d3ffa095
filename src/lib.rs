//! PDF subscription forms for the Federal Government of Nigeria Savings Bond.
//!
//! A validated [`ApplicationData`] record goes in, the bytes of a filled-in paper form come out.
//! Rendering is done with `genpdf`; the form layout lives in [`sections`] and [`template`], the
//! drawing primitives in [`elements`].
//!
//! ```no_run
//! use fgnsb_form::{ApplicationData, FormGenerator};
//!
//! # fn run(data: ApplicationData) -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = FormGenerator::new().generate(&data)?;
//! std::fs::write("subscription.pdf", bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod binding;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod format;
pub mod generator;
pub mod metadata;
pub mod model;
pub mod page;
pub mod sections;
pub mod style;
pub mod template;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use application::{ApplicantType, ApplicationData};
pub use error::FormError;
pub use generator::{FormGenerator, TimestampSource};
pub use page::PageMargins;
pub use template::{GeneratedForm, SectionPlacement};
