//! Outbound message templates for Study With Pride.
//!
//! Two pieces:
//!
//! - [`TemplateCatalog`]: the fixed, validated set of WhatsApp templates,
//!   looked up by id.
//! - [`expand`]: sequential `{{n}}` placeholder substitution.
//!
//! ```
//! use pride_template::TemplateCatalog;
//!
//! let catalog = TemplateCatalog::builtin()?;
//! let template = catalog.get("document_request").expect("built in");
//! let body = template.render(&["Maria", "passport copy"])?;
//! assert!(body.starts_with("Hi Maria, to continue your application we still need your passport copy."));
//! # Ok::<(), pride_template::TemplateError>(())
//! ```

mod builtin;
mod catalog;
mod error;
mod expand;

pub use catalog::{Category, Template, TemplateCatalog};
pub use error::TemplateError;
pub use expand::{expand, placeholder, placeholders};
