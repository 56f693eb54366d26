pub mod context;
pub mod library;
pub mod lint;
pub mod phrasebook;
pub mod pipeline;
pub mod variety;
