//! Order lifecycle mirroring and reconciliation against an external ledger.
//!
//! Consistency model: eventual consistency, local-write-wins. The
//! simulation never blocks on the ledger; mirrored writes happen after the
//! local commit and confirmations flow back asynchronously. Divergence is
//! detected by the reconciliation pass, not prevented.

pub mod client;
pub mod reconcile;
pub mod sync;

pub use client::{
    LedgerAction, LedgerClient, LedgerError, LedgerEvent, LedgerEventKind, LedgerOrderStatus,
    LedgerOrderView, LedgerReceipt, RecordingLedger,
};
pub use reconcile::{ReconcilePolicy, ReconcileReport, ReconcileSchedule};
pub use sync::LedgerSync;
