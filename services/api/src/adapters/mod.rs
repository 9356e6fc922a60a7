pub mod chat_llm;
pub mod corrector;
pub mod extractor;
pub mod prompt_files;
pub mod retriever;

pub use chat_llm::OpenAiChatAdapter;
pub use corrector::LlmCommandCorrector;
pub use extractor::CodeBlockExtractor;
pub use prompt_files::load_baseline_prompts;
pub use retriever::CommandCatalogRetriever;
