//! Cross-component scenarios.

mod end_to_end;
