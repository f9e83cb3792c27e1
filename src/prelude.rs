//! Imports for syntax extensions.

pub use crate::error::Error as _;
pub use crate::http::{HttpClient as _, HttpResponse as _};
pub use crate::schema::Schema as _;
