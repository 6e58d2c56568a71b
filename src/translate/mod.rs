pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod interface;

pub use dispatcher::TranslationDispatcher;
pub use endpoint::Endpoint;
pub use error::{AttemptError, DispatchError};
pub use interface::{Direction, EndpointHealth, LanguagePair, TranslationRequest, TranslationResponse, Translator};
