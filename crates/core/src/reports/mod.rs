//! PDF report generation through an external renderer.
//!
//! The renderer is a collaborator behind the [`ReportRenderer`] trait; the
//! default implementation runs a JasperStarter-compatible binary.

pub mod error;
pub mod renderer;
pub mod types;


pub use error::ReportError;
pub use renderer::{CommandRenderer, ReportRenderer};
pub use types::*;
