pub use common::{
    extractor_error::{ErrorKind, ExtractorError, ExtractorResult},
    media_descriptor::{ImageItem, MediaAuthor, MediaDescriptor},
    platform::{Platform, UnknownPlatform},
};
pub use extractors::{Adapter, Extractor};
pub use registry::{AdapterFactory, Registry, RegistryEntry, DEFAULT_ENTRIES};
pub use resolver::Resolver;

pub mod common;
pub mod extractors;
pub mod registry;
pub mod resolver;
