//! EEPROM device profiles

use crate::error::Result;
use crate::protocol::ProtocolKind;

/// Immutable description of one selected EEPROM model
///
/// Constructed once per selection and never mutated; the size and page
/// geometry come from the fixed model tables of the protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Protocol family of the chip
    pub kind: ProtocolKind,
    /// Ordinal into the family's ascending model table
    pub model_index: usize,
    /// Total chip size in bytes
    pub total_size: usize,
    /// Physical write-page size in bytes
    pub page_size: usize,
}

impl DeviceProfile {
    /// Build a profile for a model, validating the index against the
    /// family's model table
    pub fn new(kind: ProtocolKind, model_index: usize) -> Result<Self> {
        let protocol = kind.variant();
        let total_size = protocol.total_size(model_index)?;
        let page_size = protocol.page_size(model_index);
        Ok(Self {
            kind,
            model_index,
            total_size,
            page_size,
        })
    }

    /// Display name of the selected model
    pub fn model_name(&self) -> &'static str {
        self.kind
            .variant()
            .model_names()
            .get(self.model_index)
            .copied()
            .unwrap_or("?")
    }
}

/// Look up a model index by display name, case-insensitive
pub fn find_model(kind: ProtocolKind, name: &str) -> Option<usize> {
    kind.variant()
        .model_names()
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
}
