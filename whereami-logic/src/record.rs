use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::location::Coordinate;

/// Token used to route a geocoding result back to the record that asked for it
pub type RecordId = Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    id: RecordId,
    coordinate: Coordinate,
    address: Option<String>,
}

impl AddressRecord {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            id: Uuid::new_v4(),
            coordinate,
            address: None,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Set the resolved address, returns `false` if one was already set
    fn set_address(&mut self, address: String) -> bool {
        if self.address.is_some() {
            false
        } else {
            self.address = Some(address);
            true
        }
    }

    pub fn row_text(&self) -> RowText {
        RowText {
            coordinate: self.coordinate.to_string(),
            address: self.address.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// What a single row of the list shows
pub struct RowText {
    /// `"<lat>; <long>"`
    pub coordinate: String,
    /// Resolved address, empty until geocoding finishes
    pub address: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordListError {
    #[error("Index {index} is out of range for a list of {len} records")]
    OutOfRange { index: usize, len: usize },
}

/// Recorded locations, newest first
#[derive(Debug, Clone, Default)]
pub struct RecordList {
    records: Vec<AddressRecord>,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn record_at(&self, index: usize) -> Option<&AddressRecord> {
        self.records.get(index)
    }

    /// Add a record to the front of the list
    pub fn push_front(&mut self, record: AddressRecord) {
        self.records.insert(0, record);
    }

    pub fn delete_at(&mut self, index: usize) -> Result<AddressRecord, RecordListError> {
        if index < self.records.len() {
            Ok(self.records.remove(index))
        } else {
            Err(RecordListError::OutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }

    pub fn row_text(&self, index: usize) -> Result<RowText, RecordListError> {
        self.records
            .get(index)
            .map(AddressRecord::row_text)
            .ok_or(RecordListError::OutOfRange {
                index,
                len: self.records.len(),
            })
    }

    pub fn rows(&self) -> Vec<RowText> {
        self.records.iter().map(AddressRecord::row_text).collect()
    }

    /// Set the address of the record with the given id, wherever it is in the list now.
    /// Returns `false` if that record is gone or already has an address.
    pub fn resolve_address(&mut self, id: RecordId, address: String) -> bool {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .is_some_and(|r| r.set_address(address))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressRecord> {
        self.records.iter()
    }
}
