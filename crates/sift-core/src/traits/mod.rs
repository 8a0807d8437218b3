mod embedding;
mod generation;
mod storage;
mod ticket_source;

pub use embedding::IEmbeddingProvider;
pub use generation::IGenerationService;
pub use storage::{
    IEmbeddingStore, IFeedbackStore, IIntentStore, IPromptTemplateStore, ISiftStorage,
    ISnapshotStore, ISuggestionStore,
};
pub use ticket_source::ITicketSource;
