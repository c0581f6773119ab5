//! Guide JSON import and export.
//!
//! Three layers, composed by [`file_io::import_guide_from_file`]:
//! file preconditions ([`file_check`]), structural validation with
//! position-qualified findings ([`validator`]), and serialization.

pub mod file_check;
pub mod file_io;
pub mod validator;

pub use file_check::{validate_file, FileCheck, FileMeta, MAX_IMPORT_FILE_BYTES};
pub use file_io::{export_guide_to_file, guide_to_json, import_guide_from_file};
pub use validator::{parse_and_validate_guide, ValidationReport};
