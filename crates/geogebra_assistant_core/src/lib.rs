pub mod domain;
pub mod ports;
pub mod prompt;
pub mod regeneration;

pub use domain::{CommandMatch, CommandRecord, Message, RegenerationResult, Role};
pub use ports::{
    ChatCompletionService, CommandCorrector, CommandExtractor, CommandRetriever, PortError,
    PortResult,
};
pub use prompt::{assemble_regeneration_prompt, BaselinePrompts, RELATED_COMMANDS_TOP_K};
pub use regeneration::{RegenerationOutcome, RegenerationService, REGENERATION_TEMPERATURE};
