pub mod assembler;
pub mod classifier;
pub mod forced;
pub mod grouping;
pub mod matcher;
pub mod money;
pub mod normalizer;
pub mod pairing;
pub mod status;

pub use assembler::{DefaultNameNormalizer, EntityNameNormalizer};
pub use classifier::{ClassifierRule, ClassifierRules, DocumentTag};
pub use normalizer::{equivalent, normalize};
pub use pairing::PairingEngine;
