pub mod assistant;
pub mod dictionary;
pub mod medline;
pub mod pubmed;
pub mod video;
pub mod web_search;

pub use assistant::AssistantProvider;
pub use dictionary::DictionaryProvider;
pub use medline::MedlineProvider;
pub use pubmed::PubMedProvider;
pub use video::VideoProvider;
pub use web_search::WebSearchProvider;
