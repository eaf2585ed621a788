//! Descriptors pointing at externally stored localized content.
//!
//! A descriptor never carries the content itself, only where to find it
//! ([`DataAccessDescriptor`]) and what it is ([`LocElementMetadata`]).

use serde::{Deserialize, Serialize};

/// Kind of content a localized element holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocDataElementType {
    Text,
    Binary,
}

/// Where a piece of content lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataAccessDescriptor {
    /// Identifies which external storage source holds the content.
    pub data_access_source_id: String,
    /// Path of the content within that source.
    pub relative_access_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocElementMetadata {
    pub group_id: String,
    pub id: String,
    pub original_file_name: String,
    pub original_relative_path: String,
    pub loc_data_element_type: LocDataElementType,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocElementDataReferenceDescriptor {
    pub data_access: DataAccessDescriptor,
    pub metadata: LocElementMetadata,
}

/// Identity of a data reference for comparison purposes.
///
/// Two descriptors refer to the same content when source, path, element id,
/// and original file name/path agree. `group_id` and the element type are
/// not part of the identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataReferenceKey {
    pub data_access_source_id: String,
    pub relative_access_path: String,
    pub id: String,
    pub original_file_name: String,
    pub original_relative_path: String,
}

impl LocElementDataReferenceDescriptor {
    pub fn key(&self) -> DataReferenceKey {
        DataReferenceKey {
            data_access_source_id: self.data_access.data_access_source_id.clone(),
            relative_access_path: self.data_access.relative_access_path.clone(),
            id: self.metadata.id.clone(),
            original_file_name: self.metadata.original_file_name.clone(),
            original_relative_path: self.metadata.original_relative_path.clone(),
        }
    }

    pub fn same_reference(&self, other: &Self) -> bool {
        self.data_access == other.data_access
            && self.metadata.id == other.metadata.id
            && self.metadata.original_file_name == other.metadata.original_file_name
            && self.metadata.original_relative_path == other.metadata.original_relative_path
    }
}
