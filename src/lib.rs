pub mod error;
pub mod mapper;
pub mod models;
pub mod parser;
pub mod tree;
pub mod validate;

pub use error::{Error, ParseFailure, ParsingError, Result, UsageError, ValidationError, Violation};
pub use models::vast::VastDocument;
pub use models::vmap::VmapDocument;
pub use parser::{
    parse_document, parse_vast, parse_vmap, ParseOptions, Parser, Schema, Vast, VastParser, Vmap,
    VmapParser,
};

pub mod async_api {
    use crate::error::Result;
    use crate::models::vast::VastDocument;
    use crate::models::vmap::VmapDocument;
    use crate::parser::{parse_document, ParseOptions, Schema, Vast, Vmap};

    pub async fn parse_vast(xml: impl Into<String>, options: ParseOptions) -> Result<VastDocument> {
        parse_blocking::<Vast>(xml.into(), options).await
    }

    pub async fn parse_vmap(xml: impl Into<String>, options: ParseOptions) -> Result<VmapDocument> {
        parse_blocking::<Vmap>(xml.into(), options).await
    }

    // Parsing is CPU-bound, so it runs on the blocking pool
    async fn parse_blocking<S: Schema + 'static>(xml: String, options: ParseOptions) -> Result<S::Document> {
        match tokio::task::spawn_blocking(move || parse_document::<S>(xml, options)).await {
            Ok(result) => result,
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }
}
