//! Storage-provider data model and wire codec for ncfs.
//!
//! This crate is the leaf of the workspace: references, resource metadata,
//! grants, revisions, recycle items, storage spaces, and the JSON codec that
//! turns driver arguments into request bodies. It has **no I/O**; the driver
//! and the conformance simulator both build on it.
//!
//! # Wire contract
//!
//! Request bodies are compact JSON with fields in struct-declaration order.
//! Maps are `BTreeMap`, so their keys serialize sorted. The conformance
//! simulator matches requests on their exact content, so any change to field
//! order, naming, or omission rules in this crate is a protocol change.
//!
//! |------------------------|------------------------------------------------|
//! | Type                   | Purpose                                        |
//! |------------------------|------------------------------------------------|
//! | [`Reference`]          | Target of an operation (resource id and/or path) |
//! | [`ResourceInfo`]       | Metadata returned by GetMD / ListFolder        |
//! | [`ResourcePermissions`]| The 19-capability permission bundle            |
//! | [`Grant`]              | Grantee + permissions attached to a reference  |
//! | [`FileVersion`]        | One entry of a file's revision history         |
//! | [`RecycleItem`]        | One entry of the trash                         |
//! | [`StorageSpace`]       | A discoverable storage space                   |
//! |------------------------|------------------------------------------------|

/// Declares a protobuf-style enum that travels as a bare integer on the wire.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $T:ident {
            $( $(#[$vmeta:meta])* $V:ident = $n:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(into = "i32", from = "i32")]
        $vis enum $T {
            $( $(#[$vmeta])* $V = $n ),+
        }

        impl From<$T> for i32 {
            fn from(v: $T) -> i32 {
                v as i32
            }
        }

        /// Numbers this build does not know decode as the default variant.
        impl From<i32> for $T {
            fn from(n: i32) -> Self {
                match n {
                    $( $n => $T::$V, )+
                    _ => $T::default(),
                }
            }
        }
    };
}

pub mod codec;
pub mod grant;
pub mod history;
pub mod ids;
pub mod permissions;
pub mod reference;
pub mod requests;
pub mod resource;
pub mod space;

pub use codec::{CodecError, CodecResult, decode, decode_text, encode};
pub use grant::{Grant, Grantee, GranteeId, GranteeType};
pub use history::{FileVersion, RecycleItem};
pub use ids::{GroupId, ResourceId, StorageSpaceId, User, UserId, UserType};
pub use permissions::ResourcePermissions;
pub use reference::Reference;
pub use resource::{
    ArbitraryMetadata, CanonicalMetadata, ChecksumType, Opaque, OpaqueEntry, ResourceChecksum,
    ResourceInfo, ResourceType, Timestamp,
};
pub use space::{
    CreateStorageSpaceRequest, FilterTerm, FilterType, ListStorageSpacesFilter, Quota, SpaceQuota,
    StorageSpace,
};
