pub mod blocks;
pub mod comparison;
pub mod documents;
pub mod product;
pub mod question;
pub mod stage;

pub use blocks::{ContentBlocks, ContentBlocksDraft, Currency, PriceBlock, PriceBlockDraft};
pub use comparison::{
    ComparisonAnalysis, ComparisonResult, ConcentrationWinner, IngredientOverlap, PriceRange,
};
pub use documents::{ComparisonDocument, FaqDocument, ProductPageDocument};
pub use product::{ProductDraft, ProductRecord};
pub use question::{FaqBatch, QuestionCategory, QuestionDraft, QuestionRecord, FAQ_BATCH_SIZE};
pub use stage::Stage;
