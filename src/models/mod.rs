pub mod batch;
pub mod document;
pub mod group;
pub mod pair;

pub use batch::BatchContext;
pub use document::{
    DocumentFields, InvoiceDocument, OtherDocument, PaymentSlipDocument, RawDocument,
};
pub use group::{DocumentGroup, GroupKey};
pub use pair::{ConciliationStatus, DocumentCounts, DocumentPair, PairSummary};
